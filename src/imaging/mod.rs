//! Imaging Module
//!
//! Turns downloaded icon bytes into canonical PNG bytes of the requested size,
//! and canonical bytes back into pixels.
//!
//! # Paths
//! - Vector (`.svg`/`.svgz`): rasterized onto a canvas of exactly the desired
//!   size, each axis scaled independently
//! - Raster (everything else): decoded, then resized to fit within the
//!   desired size keeping the source aspect ratio

mod codec;
mod geometry;
mod raster;
mod vector;


use std::fmt;
use std::path::Path;

use image::RgbaImage;
use url::Url;

use crate::error::{IconError, Result};

pub use codec::{decode_png, encode_png};
pub use geometry::{raster_target, vector_scale};
pub(crate) use vector::{pixmap_to_rgba, rasterize_svg};

// == Public Constants ==
/// Largest accepted edge length of a desired size, in pixels
pub const MAX_ICON_DIMENSION: u32 = 4096;

// == Desired Size ==
/// Requested output size. Both edges are within `1..=MAX_ICON_DIMENSION`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DesiredSize {
    width: u32,
    height: u32,
}

impl DesiredSize {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        for (name, value) in [("width", width), ("height", height)] {
            if value == 0 || value > MAX_ICON_DIMENSION {
                return Err(IconError::InvalidRequest(format!(
                    "{} must be between 1 and {} pixels, got {}",
                    name, MAX_ICON_DIMENSION, value
                )));
            }
        }
        Ok(Self { width, height })
    }

    pub fn square(edge: u32) -> Result<Self> {
        Self::new(edge, edge)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

// == Source Kind ==
/// How downloaded bytes are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Raster,
    Vector,
}

impl SourceKind {
    /// Guesses the source kind from the extension of the URL path.
    ///
    /// This is a naming heuristic, not content sniffing: an SVG served from
    /// `/icon` is treated as raster and fails to decode.
    pub fn from_url(url: &str) -> Self {
        let path = Url::parse(url)
            .map(|parsed| parsed.path().to_string())
            .unwrap_or_else(|_| url.to_string());

        let extension = Path::new(&path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("svg") | Some("svgz") => SourceKind::Vector,
            _ => SourceKind::Raster,
        }
    }
}

// == Decoded Image ==
/// Decoded straight-alpha RGBA pixels, ready for presentation.
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pixels: RgbaImage,
}

impl DecodedImage {
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_rgba(self) -> RgbaImage {
        self.pixels
    }

    /// Encodes the pixels as canonical PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        encode_png(&self.pixels)
    }
}

impl fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

// == Transformed ==
/// Output of [`transform_to_image`]: the bytes to cache and the pixels they encode.
#[derive(Debug, Clone)]
pub struct Transformed {
    pub canonical: Vec<u8>,
    pub image: DecodedImage,
}

// == Operations ==
/// Produces canonical PNG bytes for `raw` at `desired`.
pub fn transform(raw: &[u8], hint: SourceKind, desired: DesiredSize) -> Result<Vec<u8>> {
    transform_to_image(raw, hint, desired).map(|transformed| transformed.canonical)
}

/// Like [`transform`], also returning the decoded pixels so callers do not
/// have to decode the bytes they just produced.
pub fn transform_to_image(
    raw: &[u8],
    hint: SourceKind,
    desired: DesiredSize,
) -> Result<Transformed> {
    let pixels = match hint {
        SourceKind::Vector => rasterize_svg(raw, desired)?,
        SourceKind::Raster => raster::resize_raster(raw, desired)?,
    };
    let canonical = encode_png(&pixels)?;
    Ok(Transformed {
        canonical,
        image: DecodedImage::new(pixels),
    })
}

/// Decodes canonical bytes from the cache. No resizing is applied.
pub fn decode(canonical: &[u8]) -> Result<DecodedImage> {
    decode_png(canonical).map(DecodedImage::new)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_desired_size_bounds() {
        assert!(DesiredSize::new(1, 1).is_ok());
        assert!(DesiredSize::new(MAX_ICON_DIMENSION, MAX_ICON_DIMENSION).is_ok());
        assert!(matches!(
            DesiredSize::new(0, 64),
            Err(IconError::InvalidRequest(_))
        ));
        assert!(DesiredSize::new(64, 0).is_err());
        assert!(DesiredSize::new(MAX_ICON_DIMENSION + 1, 64).is_err());
    }

    #[test]
    fn test_source_kind_from_extension() {
        assert_eq!(SourceKind::from_url("https://x.org/icon.svg"), SourceKind::Vector);
        assert_eq!(SourceKind::from_url("https://x.org/icon.SVGZ"), SourceKind::Vector);
        assert_eq!(SourceKind::from_url("https://x.org/icon.png"), SourceKind::Raster);
        assert_eq!(SourceKind::from_url("https://x.org/icon"), SourceKind::Raster);
    }

    #[test]
    fn test_source_kind_ignores_query() {
        assert_eq!(
            SourceKind::from_url("https://x.org/icon.svg?v=3#frag"),
            SourceKind::Vector
        );
        assert_eq!(
            SourceKind::from_url("https://x.org/download?file=icon.svg"),
            SourceKind::Raster
        );
    }

    #[test]
    fn test_transform_outputs_png() {
        let source = encode_png(&RgbaImage::from_pixel(100, 50, Rgba([1, 2, 3, 255]))).unwrap();
        let desired = DesiredSize::square(40).unwrap();

        let bytes = transform(&source, SourceKind::Raster, desired).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (40, 20));
    }

    #[test]
    fn test_transform_to_image_matches_canonical() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="8"><circle cx="4" cy="4" r="3"/></svg>"#;
        let transformed =
            transform_to_image(svg, SourceKind::Vector, DesiredSize::new(24, 12).unwrap()).unwrap();

        assert_eq!(transformed.image.dimensions(), (24, 12));
        assert_eq!(decode(&transformed.canonical).unwrap(), transformed.image);
    }

    #[test]
    fn test_wrong_hint_is_decode_error() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="8"/>"#;
        let result = transform(svg, SourceKind::Raster, DesiredSize::square(8).unwrap());
        assert!(matches!(result, Err(IconError::Decode(_))));
    }

    #[test]
    fn test_decoded_image_debug_is_compact() {
        let image = DecodedImage::new(RgbaImage::new(3, 2));
        assert_eq!(format!("{:?}", image), "DecodedImage { width: 3, height: 2 }");
    }
}
