//! Legacy VML shape index.
//!
//! Form controls keep their runtime state in the VML drawing part. A checked
//! checkbox carries an `x:Checked` marker in its client data; a radio button
//! rendered as a picture links its image through the first attribute of its
//! first nested element (an `o:relid` on `v:imagedata` in the files Excel
//! writes).
//!
//! ```xml
//! <v:shape id="_x0000_s1025" type="#_x0000_t201">
//!   <x:ClientData ObjectType="Checkbox">
//!     <x:Checked>1</x:Checked>
//!   </x:ClientData>
//! </v:shape>
//! ```

use super::{ElementStack, attribute_value, bound_to, check_complete, first_attribute_value};
use crate::ooxml::opc::constants::namespace;
use crate::ooxml::opc::error::{OpcError, Result};
use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::warn;

/// A `v:shape` element reduced to the evidence the decoders need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmlShape {
    checked: bool,
    first_nested_attribute: Option<String>,
}

impl VmlShape {
    /// Whether an `x:Checked` element is nested anywhere inside the shape.
    #[inline]
    pub fn is_checked(&self) -> bool {
        self.checked
    }

    /// Value of the first attribute of the shape's first nested element.
    #[inline]
    pub fn first_nested_attribute(&self) -> Option<&str> {
        self.first_nested_attribute.as_deref()
    }
}

/// A shape element that is still open while parsing.
struct OpenShape {
    index: usize,
    depth: usize,
    descendant_seen: bool,
}

/// VML shapes keyed by their `id` attribute.
#[derive(Debug, Default)]
pub struct VmlIndex {
    shapes: Vec<VmlShape>,
    by_id: HashMap<String, usize>,
}

impl VmlIndex {
    /// Parse a VML drawing part.
    ///
    /// Shapes without an `id` are skipped. When two shapes share an id, the
    /// first one in document order is the one looked up.
    ///
    /// End-name checks are off so HTML-style `<br>` inside text boxes does not
    /// fail the parse, but the part still needs a root element and every
    /// element must be closed by the end of input.
    pub fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut reader = NsReader::from_reader(xml);
        reader.config_mut().trim_text(true);
        reader.config_mut().check_end_names = false;

        let mut index = Self::default();
        let mut open: Vec<OpenShape> = Vec::new();
        let mut stack = ElementStack::default();
        let mut root_seen = false;
        let mut buf = Vec::new();

        loop {
            match reader.read_resolved_event_into(&mut buf) {
                Ok((ns, Event::Start(e))) => {
                    root_seen = true;
                    index.visit(&ns, &e, stack.depth(), &mut open)?;
                    stack.push(e.name().as_ref());
                },
                Ok((ns, Event::Empty(e))) => {
                    root_seen = true;
                    let depth = stack.depth();
                    index.visit(&ns, &e, depth, &mut open)?;
                    open.retain(|shape| shape.depth < depth);
                },
                Ok((_, Event::End(e))) => {
                    if let Some(depth) = stack.close(e.name().as_ref()) {
                        open.retain(|shape| shape.depth < depth);
                    }
                },
                Ok((_, Event::Eof)) => {
                    check_complete("VML", root_seen, &stack)?;
                    break;
                },
                Err(e) => return Err(OpcError::XmlError(format!("VML parse error: {}", e))),
                _ => {},
            }
            buf.clear();
        }

        Ok(index)
    }

    /// Apply one element to the shapes it is nested in, then open it if it
    /// is a shape itself.
    fn visit(
        &mut self,
        ns: &ResolveResult<'_>,
        e: &BytesStart<'_>,
        depth: usize,
        open: &mut Vec<OpenShape>,
    ) -> Result<()> {
        let local_name = e.local_name();
        let is_checked_marker =
            bound_to(ns, namespace::OFFICE_EXCEL) && local_name.as_ref() == b"Checked";

        for shape in open.iter_mut() {
            let record = &mut self.shapes[shape.index];
            if !shape.descendant_seen {
                shape.descendant_seen = true;
                record.first_nested_attribute = first_attribute_value(e)?;
            }
            if is_checked_marker {
                record.checked = true;
            }
        }

        if bound_to(ns, namespace::VML) && local_name.as_ref() == b"shape" {
            let Some(id) = attribute_value(e, b"id")? else {
                return Ok(());
            };
            let index = self.shapes.len();
            match self.by_id.entry(id.clone()) {
                Entry::Occupied(_) => warn!(id = %id, "duplicate VML shape id ignored"),
                Entry::Vacant(slot) => {
                    slot.insert(index);
                },
            }
            self.shapes.push(VmlShape {
                checked: false,
                first_nested_attribute: None,
            });
            open.push(OpenShape {
                index,
                depth,
                descendant_seen: false,
            });
        }

        Ok(())
    }

    /// Shape whose `id` equals `id` exactly.
    #[inline]
    pub fn shape(&self, id: &str) -> Option<&VmlShape> {
        self.by_id.get(id).map(|&index| &self.shapes[index])
    }

    /// Number of shapes with an id, duplicates included.
    #[inline]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VML: &[u8] = br##"<xml xmlns:v="urn:schemas-microsoft-com:vml"
 xmlns:o="urn:schemas-microsoft-com:office:office"
 xmlns:x="urn:schemas-microsoft-com:office:excel">
 <o:shapelayout v:ext="edit">
  <o:idmap v:ext="edit" data="1"/>
 </o:shapelayout>
 <v:shapetype id="_x0000_t201" coordsize="21600,21600" o:spt="201" path="m,l,21600r21600,l21600,xe">
  <v:stroke joinstyle="miter"/>
 </v:shapetype>
 <v:shape id="_x0000_s1025" type="#_x0000_t201" style="position:absolute">
  <v:textbox style="mso-direction-alt:auto">
   <div style="text-align:left"><font face="Tahoma">Check<br>Box 1</font></div>
  </v:textbox>
  <x:ClientData ObjectType="Checkbox">
   <x:Anchor>1, 15, 1, 2, 2, 47, 2, 2</x:Anchor>
   <x:Checked>1</x:Checked>
  </x:ClientData>
 </v:shape>
 <v:shape id="_x0000_s1026" type="#_x0000_t201">
  <x:ClientData ObjectType="Checkbox">
   <x:Anchor>1, 15, 3, 2, 2, 47, 4, 2</x:Anchor>
  </x:ClientData>
 </v:shape>
 <v:shape id="Opt1" o:spid="_x0000_s1027" type="#_x0000_t75">
  <v:imagedata o:relid="rId1" o:title=""/>
  <x:ClientData ObjectType="Pict"/>
 </v:shape>
 <v:shape id="Opt1" type="#_x0000_t75">
  <v:imagedata o:relid="rId9" o:title=""/>
 </v:shape>
 <v:shape id="Bare" type="#_x0000_t75"/>
 <v:shape id="NoAttrs"><x:ClientData><v:imagedata o:relid="rId7"/></x:ClientData></v:shape>
</xml>"##;

    #[test]
    fn test_checked_marker() {
        let index = VmlIndex::from_xml(VML).unwrap();
        assert!(index.shape("_x0000_s1025").unwrap().is_checked());
        assert!(!index.shape("_x0000_s1026").unwrap().is_checked());
    }

    #[test]
    fn test_unclosed_br_does_not_leak_into_next_shape() {
        let index = VmlIndex::from_xml(VML).unwrap();
        // The first shape's first descendant is the textbox.
        assert_eq!(
            index.shape("_x0000_s1025").unwrap().first_nested_attribute(),
            Some("mso-direction-alt:auto")
        );
        assert_eq!(
            index.shape("_x0000_s1026").unwrap().first_nested_attribute(),
            Some("Checkbox")
        );
    }

    #[test]
    fn test_first_attribute_of_first_descendant() {
        let index = VmlIndex::from_xml(VML).unwrap();
        let shape = index.shape("Opt1").unwrap();
        assert_eq!(shape.first_nested_attribute(), Some("rId1"));
        assert!(!shape.is_checked());

        // The first descendant carries no attribute, so nothing is recorded.
        assert_eq!(index.shape("NoAttrs").unwrap().first_nested_attribute(), None);
        assert_eq!(index.shape("Bare").unwrap().first_nested_attribute(), None);
    }

    #[test]
    fn test_id_lookup_is_exact() {
        let index = VmlIndex::from_xml(VML).unwrap();
        assert!(index.shape("Opt").is_none());
        assert!(index.shape("opt1").is_none());
        assert!(index.shape("_x0000_s1027").is_none());
        // shapetype is not a shape
        assert!(index.shape("_x0000_t201").is_none());
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let index = VmlIndex::from_xml(VML).unwrap();
        assert_eq!(index.len(), 6);
        assert_eq!(index.shape("Opt1").unwrap().first_nested_attribute(), Some("rId1"));
    }

    #[test]
    fn test_checked_outside_excel_namespace_is_ignored() {
        let xml = br#"<xml xmlns:v="urn:schemas-microsoft-com:vml" xmlns:y="urn:example:other">
 <v:shape id="s1"><y:Checked/></v:shape>
</xml>"#;
        let index = VmlIndex::from_xml(xml).unwrap();
        assert!(!index.shape("s1").unwrap().is_checked());
    }

    #[test]
    fn test_malformed_vml_is_an_error() {
        let cases: [&[u8]; 4] = [
            b"",
            b"garbage",
            b"<xml><v:shape id=\"s1\">",
            b"<xml><v:shape id=\"s1\"",
        ];
        for xml in cases {
            let err = VmlIndex::from_xml(xml).unwrap_err();
            assert!(
                matches!(err, OpcError::XmlError(_)),
                "{:?}: {:?}",
                String::from_utf8_lossy(xml),
                err
            );
        }
    }

    #[test]
    fn test_stray_html_end_tags_are_tolerated() {
        let xml = br#"<xml xmlns:v="urn:schemas-microsoft-com:vml"><v:shape id="s1"><div>a<br>b</p></div></v:shape></xml>"#;
        let index = VmlIndex::from_xml(xml).unwrap();
        assert!(index.shape("s1").is_some());
    }
}
