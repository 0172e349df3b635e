//! Raster source path: decode, fit within the desired size, resample.

use image::imageops::FilterType;
use image::{GenericImageView, RgbaImage};
use tracing::debug;

use crate::error::{IconError, Result};
use crate::imaging::{geometry, DesiredSize};

/// Decodes a raster source of any supported format and resizes it to fit
/// within `desired`, keeping its aspect ratio.
pub fn resize_raster(raw: &[u8], desired: DesiredSize) -> Result<RgbaImage> {
    let source = image::load_from_memory(raw)?;
    let (sw, sh) = source.dimensions();
    if sw == 0 || sh == 0 {
        return Err(IconError::Decode(format!(
            "Raster source has empty dimensions {}x{}",
            sw, sh
        )));
    }

    let (w, h) = geometry::raster_target((sw, sh), desired);
    debug!(source_width = sw, source_height = sh, width = w, height = h, "resizing raster icon");

    if (w, h) == (sw, sh) {
        return Ok(source.into_rgba8());
    }
    Ok(source.resize_exact(w, h, FilterType::Lanczos3).into_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::codec::encode_png;
    use image::codecs::jpeg::JpegEncoder;
    use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage, Rgba};

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        encode_png(&RgbaImage::from_pixel(w, h, Rgba([200, 40, 40, 255]))).unwrap()
    }

    #[test]
    fn test_downscale_preserves_aspect() {
        let out = resize_raster(&png_bytes(200, 100), DesiredSize::new(64, 64).unwrap()).unwrap();
        assert_eq!(out.dimensions(), (64, 32));
    }

    #[test]
    fn test_upscale_small_source() {
        let out = resize_raster(&png_bytes(16, 16), DesiredSize::new(48, 48).unwrap()).unwrap();
        assert_eq!(out.dimensions(), (48, 48));
    }

    #[test]
    fn test_same_size_is_untouched() {
        let out = resize_raster(&png_bytes(32, 32), DesiredSize::new(32, 32).unwrap()).unwrap();
        assert_eq!(out.dimensions(), (32, 32));
        assert_eq!(out.get_pixel(0, 0), &Rgba([200, 40, 40, 255]));
    }

    #[test]
    fn test_jpeg_source() {
        let mut jpeg = Vec::new();
        let image = RgbImage::from_pixel(120, 60, Rgb([0, 128, 255]));
        JpegEncoder::new(&mut jpeg)
            .write_image(image.as_raw(), 120, 60, ExtendedColorType::Rgb8)
            .unwrap();

        let out = resize_raster(&jpeg, DesiredSize::new(60, 60).unwrap()).unwrap();
        assert_eq!(out.dimensions(), (60, 30));
    }

    #[test]
    fn test_undecodable_bytes() {
        let result = resize_raster(b"definitely not an image", DesiredSize::new(64, 64).unwrap());
        assert!(matches!(result, Err(IconError::Decode(_))));
    }
}
