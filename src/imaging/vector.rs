//! Vector source path: parse SVG (or gzip-compressed SVGZ) and rasterize it
//! onto a canvas of exactly the desired size.

use image::{Rgba, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg;
use tracing::debug;

use crate::error::{IconError, Result};
use crate::imaging::{geometry, DesiredSize};

/// Rasterizes an SVG document to `desired`, stretching each axis
/// independently.
///
/// A document that fails to parse is an explicit [`IconError::Decode`]; no
/// partial output is produced.
pub fn rasterize_svg(raw: &[u8], desired: DesiredSize) -> Result<RgbaImage> {
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_data(raw, &options)?;

    let size = tree.size();
    let (source_width, source_height) = (size.width(), size.height());
    if !(source_width > 0.0 && source_height > 0.0) {
        return Err(IconError::Decode(format!(
            "SVG has empty bounds {}x{}",
            source_width, source_height
        )));
    }

    let mut pixmap = Pixmap::new(desired.width(), desired.height()).ok_or_else(|| {
        IconError::Unexpected(format!(
            "Failed to allocate {}x{} canvas",
            desired.width(),
            desired.height()
        ))
    })?;

    let (scale_x, scale_y) = geometry::vector_scale((source_width, source_height), desired);
    debug!(source_width, source_height, scale_x, scale_y, "rasterizing vector icon");
    resvg::render(&tree, Transform::from_scale(scale_x, scale_y), &mut pixmap.as_mut());

    Ok(pixmap_to_rgba(&pixmap))
}

/// Converts premultiplied pixmap pixels to straight-alpha RGBA.
pub(crate) fn pixmap_to_rgba(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let color = src.demultiply();
        *dst = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
    }
    image
}
