//! Fallback Icons
//!
//! Two static images that never touch the store or the network: an empty-state
//! icon for requests without a URL, and an error icon substituted for any
//! failed request.

use image::RgbaImage;
use resvg::tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Transform};
use tracing::warn;

use crate::imaging::{pixmap_to_rgba, rasterize_svg, DecodedImage, DesiredSize};

/// Bundled empty-state artwork
const EMPTY_ICON_SVG: &[u8] = include_bytes!("../assets/empty-icon.svg");

/// Edge length the empty icon is rendered at
pub const EMPTY_ICON_SIZE: u32 = 128;

/// Error glyph design grid edge length
const ERROR_GLYPH_GRID: f32 = 20.0;

/// Scale applied to the error glyph
pub const ERROR_ICON_SCALE: f32 = 3.5;

/// Error glyph tint (orange red)
pub const ERROR_ICON_COLOR: [u8; 4] = [0xff, 0x45, 0x00, 0xff];

/// Cross cut out of the error glyph disc, in grid units
const CROSS_OUTLINE: [(f32, f32); 12] = [
    (14.789, 13.061),
    (13.061, 14.789),
    (10.0, 11.729),
    (6.939, 14.789),
    (5.211, 13.061),
    (8.271, 10.0),
    (5.211, 6.939),
    (6.939, 5.211),
    (10.0, 8.271),
    (13.061, 5.211),
    (14.789, 6.939),
    (11.729, 10.0),
];

// == Empty Icon ==
/// Returns the empty-state icon rendered from the bundled artwork.
pub fn empty_icon() -> DecodedImage {
    let rendered = DesiredSize::square(EMPTY_ICON_SIZE)
        .and_then(|size| rasterize_svg(EMPTY_ICON_SVG, size));

    match rendered {
        Ok(pixels) => DecodedImage::new(pixels),
        Err(err) => {
            warn!(error = %err, "bundled empty icon failed to render");
            DecodedImage::new(RgbaImage::new(EMPTY_ICON_SIZE, EMPTY_ICON_SIZE))
        }
    }
}

// == Error Icon ==
/// Returns the error icon: a disc with a cross cut out, tinted and scaled,
/// drawn fresh on every call.
pub fn error_icon() -> DecodedImage {
    let edge = (ERROR_GLYPH_GRID * ERROR_ICON_SCALE).round() as u32;

    match draw_error_glyph(edge) {
        Some(pixmap) => DecodedImage::new(pixmap_to_rgba(&pixmap)),
        None => {
            warn!("error icon failed to draw");
            DecodedImage::new(RgbaImage::new(edge, edge))
        }
    }
}

fn draw_error_glyph(edge: u32) -> Option<Pixmap> {
    let mut pb = PathBuilder::new();
    pb.push_circle(10.0, 10.0, 8.4);

    let (first, rest) = CROSS_OUTLINE.split_first()?;
    pb.move_to(first.0, first.1);
    for &(x, y) in rest {
        pb.line_to(x, y);
    }
    pb.close();
    let glyph = pb.finish()?;

    let [r, g, b, a] = ERROR_ICON_COLOR;
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;

    let mut pixmap = Pixmap::new(edge, edge)?;
    pixmap.fill_path(
        &glyph,
        &paint,
        FillRule::EvenOdd,
        Transform::from_scale(ERROR_ICON_SCALE, ERROR_ICON_SCALE),
        None,
    );
    Some(pixmap)
}
