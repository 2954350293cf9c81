//! State decoding for resolved controls.

use super::index::DocumentIndex;
use crate::common::error::{Error, Result};
use crate::images::{self, RasterError};
use crate::ooxml::opc::PackURI;
use crate::ooxml::opc::WorkingCopy;
use crate::ooxml::opc::constants::{part, relationship_type};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Whether the VML shape `spid` carries an `x:Checked` marker.
///
/// An unknown shape reads as unchecked.
pub fn is_checked(index: &DocumentIndex, spid: &str) -> bool {
    match index.vml().shape(spid) {
        Some(shape) => shape.is_checked(),
        None => {
            trace!(spid, "no VML shape for checkbox, treating as unchecked");
            false
        },
    }
}

/// File name of the media a relationship points at.
///
/// A relationship of a type other than image is still followed, with a
/// warning; the rendered picture is what gets probed either way.
///
/// # Errors
/// [`Error::UnresolvedRelationship`] when the id is unknown or its target is
/// external or names no file.
pub fn relationship_target<'a>(index: &'a DocumentIndex, relation_id: &str) -> Result<&'a str> {
    let rel = index.relationships().get(relation_id).ok_or_else(|| {
        Error::UnresolvedRelationship(format!("no relationship with id '{}'", relation_id))
    })?;

    if rel.reltype() != relationship_type::IMAGE {
        warn!(
            r_id = relation_id,
            reltype = rel.reltype(),
            "radio button relationship is not an image relationship"
        );
    }

    rel.target_file_name().ok_or_else(|| {
        Error::UnresolvedRelationship(format!(
            "relationship '{}' targets '{}', which is not a media file in the package",
            relation_id,
            rel.target_ref()
        ))
    })
}

/// Location of a media file inside the working copy.
pub fn media_path(working_copy: &WorkingCopy, file_name: &str) -> Result<PathBuf> {
    let uri = PackURI::in_dir(part::MEDIA_DIR, file_name).map_err(Error::UnresolvedRelationship)?;
    Ok(working_copy.part_path(&uri))
}

/// Whether the option button rendered at `path` is drawn selected.
///
/// The file is read asynchronously; decoding and the pixel probe run on the
/// blocking pool.
///
/// # Errors
/// [`Error::ImageLoad`] when the file is missing, cannot be decoded, or is
/// too small to probe.
pub async fn is_selected(path: &Path) -> Result<bool> {
    let image_load = |reason: String| Error::ImageLoad {
        path: path.to_path_buf(),
        reason,
    };

    let data = tokio::fs::read(path).await.map_err(|e| image_load(e.to_string()))?;
    debug!(media = %path.display(), bytes = data.len(), "decoding radio button image");

    let probed = tokio::task::spawn_blocking(move || -> std::result::Result<bool, RasterError> {
        let image = images::load_raster(&data)?;
        images::is_selection_marker_filled(&image)
    })
    .await
    .map_err(|e| image_load(e.to_string()))?;

    probed.map_err(|e| image_load(e.to_string()))
}
