use crate::ooxml::opc::constants::target_mode;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::file_name_of;
/// Relationship parsing for OPC `.rels` parts.
///
/// The VML drawing of a sheet links each rendered control image through a
/// relationship id (`rId1`, `rId2`, ...). This module reads those links into
/// a map keyed by id.
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::warn;

/// A single relationship from a source part to a target.
#[derive(Debug, Clone)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1", "rId2")
    r_id: String,

    /// Relationship type URI
    reltype: String,

    /// Target reference - either a part reference or external URL
    target_ref: String,

    /// Whether this is an external relationship
    is_external: bool,
}

impl Relationship {
    pub fn new(r_id: String, reltype: String, target_ref: String, is_external: bool) -> Self {
        Self {
            r_id,
            reltype,
            target_ref,
            is_external,
        }
    }

    /// Get the relationship ID.
    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    /// Get the relationship type.
    #[inline]
    pub fn reltype(&self) -> &str {
        &self.reltype
    }

    /// Get the target reference as written in the `.rels` part.
    #[inline]
    pub fn target_ref(&self) -> &str {
        &self.target_ref
    }

    /// Check if this is an external relationship.
    #[inline]
    pub fn is_external(&self) -> bool {
        self.is_external
    }

    /// File name of an internal target ("../media/image1.emf" -> "image1.emf").
    ///
    /// Returns `None` for external relationships and for targets that end in
    /// a directory.
    pub fn target_file_name(&self) -> Option<&str> {
        if self.is_external() {
            return None;
        }
        file_name_of(&self.target_ref)
    }
}

/// Collection of relationships from a single source part.
///
/// Uses a HashMap for O(1) lookup by relationship ID. When a part declares
/// the same ID twice, the first declaration wins.
#[derive(Debug, Default)]
pub struct Relationships {
    rels: HashMap<String, Relationship>,
}

impl Relationships {
    /// Create a new empty relationships collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `.rels` part.
    ///
    /// The root element must be `Relationships` and the part well-formed.
    /// Elements missing an `Id` or `Target` attribute are skipped; they can
    /// never satisfy a lookup.
    pub fn from_xml(rels_xml: &[u8]) -> Result<Self> {
        let mut rels = Self::new();
        let mut reader = Reader::from_reader(rels_xml);
        reader.config_mut().trim_text(true);

        let mut depth = 0usize;
        let mut root_seen = false;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    if depth == 0 {
                        Self::check_root(e.local_name().as_ref())?;
                        root_seen = true;
                    } else {
                        rels.read_relationship(e)?;
                    }
                    depth += 1;
                },
                Ok(Event::Empty(ref e)) => {
                    if depth == 0 {
                        Self::check_root(e.local_name().as_ref())?;
                        root_seen = true;
                    } else {
                        rels.read_relationship(e)?;
                    }
                },
                Ok(Event::End(_)) => depth = depth.saturating_sub(1),
                Ok(Event::Eof) => {
                    if !root_seen {
                        return Err(OpcError::XmlError("Rels part has no root element".to_string()));
                    }
                    if depth != 0 {
                        return Err(OpcError::XmlError(format!(
                            "Rels part ends with {} unclosed element(s)",
                            depth
                        )));
                    }
                    break;
                },
                Err(e) => return Err(OpcError::XmlError(format!("Rels parse error: {}", e))),
                _ => {},
            }
            buf.clear();
        }

        Ok(rels)
    }

    fn check_root(local_name: &[u8]) -> Result<()> {
        if local_name == b"Relationships" {
            return Ok(());
        }
        Err(OpcError::XmlError(format!(
            "Rels root element is <{}>, expected <Relationships>",
            String::from_utf8_lossy(local_name)
        )))
    }

    fn read_relationship(&mut self, e: &BytesStart<'_>) -> Result<()> {
        if e.local_name().as_ref() != b"Relationship" {
            return Ok(());
        }

        let mut r_id = None;
        let mut reltype = String::new();
        let mut target_ref = None;
        let mut is_external = false;

        for attr in e.attributes() {
            let attr = attr?;
            match attr.key.as_ref() {
                b"Id" => r_id = Some(attr.unescape_value()?.to_string()),
                b"Type" => reltype = attr.unescape_value()?.to_string(),
                b"Target" => target_ref = Some(attr.unescape_value()?.to_string()),
                b"TargetMode" => is_external = attr.unescape_value()? == target_mode::EXTERNAL,
                _ => {},
            }
        }

        if let (Some(id), Some(target)) = (r_id, target_ref) {
            self.insert(Relationship::new(id, reltype, target, is_external));
        }
        Ok(())
    }

    fn insert(&mut self, rel: Relationship) {
        match self.rels.entry(rel.r_id().to_string()) {
            Entry::Occupied(_) => warn!(r_id = rel.r_id(), "duplicate relationship id ignored"),
            Entry::Vacant(slot) => {
                slot.insert(rel);
            },
        }
    }

    /// Get a relationship by its ID.
    #[inline]
    pub fn get(&self, r_id: &str) -> Option<&Relationship> {
        self.rels.get(r_id)
    }

    /// Get the number of relationships in the collection.
    #[inline]
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    /// Check if the collection is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VML_RELS: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image2.emf"/>
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image1.emf"/>
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/shadowed.emf"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/logo.png" TargetMode="External"/>
  <Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image"/>
</Relationships>"#;

    #[test]
    fn test_parse_relationships() {
        let rels = Relationships::from_xml(VML_RELS).unwrap();

        assert_eq!(rels.len(), 3);
        let rel = rels.get("rId2").unwrap();
        assert_eq!(rel.target_ref(), "../media/image2.emf");
        assert_eq!(rel.target_file_name(), Some("image2.emf"));
        assert!(rel.reltype().ends_with("/image"));
        assert!(rels.get("rId4").is_none());
    }

    #[test]
    fn test_first_declaration_wins() {
        let rels = Relationships::from_xml(VML_RELS).unwrap();
        assert_eq!(rels.get("rId1").unwrap().target_file_name(), Some("image1.emf"));
    }

    #[test]
    fn test_external_target_has_no_file_name() {
        let rels = Relationships::from_xml(VML_RELS).unwrap();
        let rel = rels.get("rId3").unwrap();
        assert!(rel.is_external());
        assert_eq!(rel.target_file_name(), None);
    }

    #[test]
    fn test_malformed_rels_is_an_error() {
        let cases: [&[u8]; 6] = [
            b"<Relationships><Relationship Id=\"rId1\"",
            b"",
            b"garbage",
            b"<Relationships><Relationship Id=\"rId1\" Target=\"a.png\"></Relationships>",
            b"<Relationships>",
            b"<Types><Relationship Id=\"rId1\" Target=\"../media/image1.png\"/></Types>",
        ];
        for xml in cases {
            let err = Relationships::from_xml(xml).unwrap_err();
            assert!(
                matches!(err, OpcError::XmlError(_)),
                "{:?}: {:?}",
                String::from_utf8_lossy(xml),
                err
            );
        }
    }

    #[test]
    fn test_empty_relationships_root() {
        let rels = Relationships::from_xml(
            br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"/>"#,
        )
        .unwrap();
        assert!(rels.is_empty());
    }
}
