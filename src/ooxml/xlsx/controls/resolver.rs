//! Control name resolution.
//!
//! Checkboxes are looked up by a fragment of their drawing name and resolved
//! to the legacy shape id. Radio buttons are looked up by their exact VML id
//! and resolved to the relationship id of their rendered image.

use super::index::DocumentIndex;
use crate::common::error::{Error, Result};
use tracing::trace;

/// Resolve a checkbox name to the id of its legacy VML shape.
///
/// The first drawing node in document order whose name contains `name` is
/// used, and its first `compatExt` supplies the id.
///
/// # Errors
/// [`Error::ControlNotFound`] when no node matches or the matching node has
/// no legacy shape id.
pub fn resolve_checkbox_identifier<'a>(index: &'a DocumentIndex, name: &str) -> Result<&'a str> {
    let spid = index
        .drawing()
        .find_by_name_fragment(name)
        .and_then(|shape| shape.spid())
        .ok_or_else(|| Error::ControlNotFound(name.to_string()))?;

    trace!(control = name, spid, "checkbox resolved");
    Ok(spid)
}

/// Resolve a radio button's VML id to the relationship id of its image.
///
/// Returns the value of the first attribute on the shape's first nested
/// element, or `None` when there is no such shape or attribute.
pub fn resolve_radio_relation_id<'a>(index: &'a DocumentIndex, name: &str) -> Option<&'a str> {
    let relation_id = index.vml().shape(name)?.first_nested_attribute()?;
    trace!(control = name, relation_id, "radio button resolved");
    Some(relation_id)
}
