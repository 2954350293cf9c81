//! Unified error type for form-control queries.
//!
//! Package-level failures (ZIP, IO, XML) arrive wrapped in [`OpcError`];
//! raster failures are reported together with the media path they concern.
use crate::ooxml::opc::OpcError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for formctl operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No drawing node (checkbox) or VML shape (radio button) matches the name
    #[error("Not existing control name: {0}")]
    ControlNotFound(String),

    /// A radio button's image reference does not lead to a media file
    #[error("Unresolved relationship: {0}")]
    UnresolvedRelationship(String),

    /// The package could not be opened, extracted, parsed or removed
    #[error("Archive error: {0}")]
    Archive(#[from] OpcError),

    /// The radio button's raster could not be read, decoded or probed
    #[error("Failed to load image {}: {reason}", .path.display())]
    ImageLoad { path: PathBuf, reason: String },
}

/// Result type for formctl operations.
pub type Result<T> = std::result::Result<T, Error>;
