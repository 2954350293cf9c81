//! Drawing parts that describe legacy form controls.
//!
//! A sheet with form controls carries two descriptions of every control:
//!
//! - the DrawingML part (`xl/drawings/drawing1.xml`), which knows the
//!   human-readable control name and links it to a legacy shape id through a
//!   `a14:compatExt` extension;
//! - the legacy VML part (`xl/drawings/vmlDrawing1.vml`), which holds the
//!   shape itself, its `x:Checked` marker and the relationship id of its
//!   rendered image.
//!
//! Both parts are read once into typed indices.

use crate::ooxml::opc::error::{OpcError, Result};
use quick_xml::events::BytesStart;
use quick_xml::name::{Namespace, ResolveResult};

pub mod shape;
pub mod vml;

pub use shape::{DrawingIndex, DrawingShape};
pub use vml::{VmlIndex, VmlShape};

/// Open-element stack used to recover from end tags that do not match.
///
/// Legacy VML is not always well-formed (HTML-style `<br>` without a closing
/// tag is common), so the VML parser runs with end-name checks disabled and
/// closes elements by name instead of by count. The DrawingML parser keeps
/// the checks on and uses the stack only to track nesting.
#[derive(Debug, Default)]
pub(crate) struct ElementStack {
    names: Vec<Vec<u8>>,
}

impl ElementStack {
    /// Number of currently open elements.
    #[inline]
    pub(crate) fn depth(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub(crate) fn push(&mut self, name: &[u8]) {
        self.names.push(name.to_vec());
    }

    /// Close the innermost open element called `name` together with every
    /// element still open inside it.
    ///
    /// Returns the depth the closed element was opened at, or `None` for a
    /// stray end tag.
    pub(crate) fn close(&mut self, name: &[u8]) -> Option<usize> {
        let pos = self.names.iter().rposition(|open| open.as_slice() == name)?;
        self.names.truncate(pos);
        Some(pos)
    }
}

/// Fail a part that had no root element or ended with elements still open.
pub(crate) fn check_complete(part: &str, root_seen: bool, stack: &ElementStack) -> Result<()> {
    if !root_seen {
        return Err(OpcError::XmlError(format!("{} part has no root element", part)));
    }
    if stack.depth() != 0 {
        return Err(OpcError::XmlError(format!(
            "{} part ends with {} unclosed element(s)",
            part,
            stack.depth()
        )));
    }
    Ok(())
}

/// Whether a resolved element name is bound to the namespace `uri`.
#[inline]
pub(crate) fn bound_to(ns: &ResolveResult<'_>, uri: &[u8]) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(bound)) if *bound == uri)
}

/// Value of the unprefixed attribute `key`, if present.
pub(crate) fn attribute_value(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Value of the first attribute in document order, whatever its name.
pub(crate) fn first_attribute_value(e: &BytesStart<'_>) -> Result<Option<String>> {
    match e.attributes().next() {
        Some(attr) => Ok(Some(attr?.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_recovers_unclosed_children() {
        let mut stack = ElementStack::default();
        stack.push(b"v:shape");
        stack.push(b"div");
        stack.push(b"br");
        assert_eq!(stack.depth(), 3);

        assert_eq!(stack.close(b"div"), Some(1));
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.close(b"font"), None);
        assert_eq!(stack.close(b"v:shape"), Some(0));
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_check_complete() {
        let mut stack = ElementStack::default();
        assert!(matches!(check_complete("VML", false, &stack), Err(OpcError::XmlError(_))));
        assert!(check_complete("VML", true, &stack).is_ok());

        stack.push(b"xml");
        let err = check_complete("VML", true, &stack).unwrap_err();
        assert!(err.to_string().contains("1 unclosed"));
    }
}
