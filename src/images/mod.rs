// Raster loading for rendered form controls.
//
// Radio buttons are stored as small pictures under `xl/media/`. Excel writes
// them as EMF with an embedded bitmap; PNG, BMP and the other formats the
// `image` crate understands are decoded directly.
//
// - `emf`: embedded bitmap extraction from Enhanced Metafiles
// - `probe`: the selection-pixel test

#[cfg(feature = "emf")]
pub mod emf;
pub mod probe;

use image::DynamicImage;
use thiserror::Error;

pub use probe::{SELECTION_PROBE_X, is_selection_marker_filled};

/// Raster decoding failures.
#[derive(Error, Debug)]
pub enum RasterError {
    #[error("Image decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Invalid EMF: {0}")]
    InvalidEmf(String),

    #[error("EMF contains no embedded bitmap")]
    NoEmbeddedBitmap,

    #[error("Probe pixel ({x}, {y}) lies outside the {width}x{height} image")]
    ProbeOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}

/// Decode an image file held in memory.
///
/// The format is sniffed from content, not from the file extension.
pub fn load_raster(data: &[u8]) -> Result<DynamicImage, RasterError> {
    #[cfg(feature = "emf")]
    if emf::is_emf(data) {
        return emf::decode_embedded_bitmap(data);
    }

    Ok(image::load_from_memory(data)?)
}
