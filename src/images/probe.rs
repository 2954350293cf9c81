//! Selection probe for rendered option buttons.
//!
//! The legacy image conversion renders an option button as a small bitmap
//! whose filled dot, when selected, covers a pixel seven units from the left
//! edge on the vertical center line. The probe reads that one pixel and
//! compares it against opaque black; no tolerance, no neighborhood.

use super::RasterError;
use image::{DynamicImage, GenericImageView, Rgba};

/// Horizontal offset of the probe pixel, calibrated to the legacy renderer.
pub const SELECTION_PROBE_X: u32 = 7;

/// Color of a filled selection dot.
pub const SELECTED_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Probe coordinate for an image of the given height.
#[inline]
pub fn probe_point(height: u32) -> (u32, u32) {
    (SELECTION_PROBE_X, height / 2)
}

/// Whether the option button rendered in `image` is selected.
///
/// # Errors
/// Returns [`RasterError::ProbeOutOfBounds`] when the image is too small to
/// contain the probe pixel.
pub fn is_selection_marker_filled(image: &DynamicImage) -> Result<bool, RasterError> {
    let (width, height) = image.dimensions();
    let (x, y) = probe_point(height);
    if x >= width || y >= height {
        return Err(RasterError::ProbeOutOfBounds {
            x,
            y,
            width,
            height,
        });
    }

    Ok(image.get_pixel(x, y) == SELECTED_COLOR)
}
