//! Target canvas computation for raster and vector sources.

use crate::imaging::DesiredSize;

/// Output dimensions for a raster source of `source` pixels.
///
/// Keeps the source aspect ratio and fits within `desired`. The axis with
/// more absolute slack (`|source - desired|`) is pinned to the desired edge
/// and the other edge is scaled by the same ratio, floored. If pinning that
/// axis would overflow the other edge, the other axis is pinned instead.
/// Both edges are at least one pixel.
pub fn raster_target(source: (u32, u32), desired: DesiredSize) -> (u32, u32) {
    let (sw, sh) = (u64::from(source.0.max(1)), u64::from(source.1.max(1)));
    let (dw, dh) = (u64::from(desired.width()), u64::from(desired.height()));

    // Integer division floors exactly; float ratios can land one pixel short
    let pin_width = (dw, (sh * dw / sw).max(1));
    let pin_height = ((sw * dh / sh).max(1), dh);

    let (preferred, other) = if sw.abs_diff(dw) > sh.abs_diff(dh) {
        (pin_width, pin_height)
    } else {
        (pin_height, pin_width)
    };

    let (w, h) = if preferred.0 <= dw && preferred.1 <= dh {
        preferred
    } else {
        other
    };

    // Both edges are bounded by the desired size, which is a u32
    (w as u32, h as u32)
}

/// Independent horizontal and vertical scale factors mapping a vector
/// document of `source` user units onto exactly `desired` pixels.
///
/// The aspect ratio is not preserved.
pub fn vector_scale(source: (f32, f32), desired: DesiredSize) -> (f32, f32) {
    (
        desired.width() as f32 / source.0,
        desired.height() as f32 / source.1,
    )
}
