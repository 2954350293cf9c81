//! DrawingML shape index.
//!
//! Every form control in the drawing part has a non-visual properties element
//! (`xdr:cNvPr`) naming the control. Its extension list carries an
//! `a14:compatExt` element whose `spid` points at the legacy VML shape:
//!
//! ```xml
//! <xdr:cNvPr id="1025" name="Check Box 1" hidden="1">
//!   <a:extLst>
//!     <a:ext uri="{63B3BB69-23CF-44E3-9099-C40C66FF867C}">
//!       <a14:compatExt spid="_x0000_s1025"/>
//!     </a:ext>
//!   </a:extLst>
//! </xdr:cNvPr>
//! ```

use super::{ElementStack, attribute_value, bound_to, check_complete};
use crate::ooxml::opc::constants::namespace;
use crate::ooxml::opc::error::{OpcError, Result};
use memchr::memmem;
use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;

/// Tag-name fragment identifying non-visual properties elements.
const NON_VISUAL_PROPS: &[u8] = b"cNvPr";

/// A named drawing node and the legacy shape id it links to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawingShape {
    name: String,
    spid: Option<String>,
}

impl DrawingShape {
    /// Human-readable control name (the `name` attribute).
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `spid` of the first nested `compatExt`, if the node has one.
    #[inline]
    pub fn spid(&self) -> Option<&str> {
        self.spid.as_deref()
    }
}

/// A properties element that is still open while parsing.
struct OpenProps {
    index: usize,
    depth: usize,
    spid_seen: bool,
}

/// Drawing nodes in document order.
#[derive(Debug, Default)]
pub struct DrawingIndex {
    shapes: Vec<DrawingShape>,
}

impl DrawingIndex {
    /// Parse a DrawingML part.
    ///
    /// Nodes whose local name contains `cNvPr` but which carry no `name`
    /// attribute are skipped. The part must be well-formed: an empty part,
    /// mismatched end tags and elements left open at the end are errors.
    pub fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut reader = NsReader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut shapes = Vec::new();
        let mut open: Vec<OpenProps> = Vec::new();
        let mut stack = ElementStack::default();
        let mut root_seen = false;
        let mut buf = Vec::new();

        loop {
            match reader.read_resolved_event_into(&mut buf) {
                Ok((ns, Event::Start(e))) => {
                    root_seen = true;
                    Self::visit(&ns, &e, stack.depth(), &mut shapes, &mut open)?;
                    stack.push(e.name().as_ref());
                },
                Ok((ns, Event::Empty(e))) => {
                    root_seen = true;
                    let depth = stack.depth();
                    Self::visit(&ns, &e, depth, &mut shapes, &mut open)?;
                    open.retain(|props| props.depth < depth);
                },
                Ok((_, Event::End(e))) => {
                    if let Some(depth) = stack.close(e.name().as_ref()) {
                        open.retain(|props| props.depth < depth);
                    }
                },
                Ok((_, Event::Eof)) => {
                    check_complete("Drawing", root_seen, &stack)?;
                    break;
                },
                Err(e) => return Err(OpcError::XmlError(format!("Drawing parse error: {}", e))),
                _ => {},
            }
            buf.clear();
        }

        Ok(Self { shapes })
    }

    /// Apply one element to the properties nodes it is nested in, then open
    /// it if it is a properties node itself.
    fn visit(
        ns: &ResolveResult<'_>,
        e: &BytesStart<'_>,
        depth: usize,
        shapes: &mut Vec<DrawingShape>,
        open: &mut Vec<OpenProps>,
    ) -> Result<()> {
        if bound_to(ns, namespace::DRAWING_2010_MAIN) && e.local_name().as_ref() == b"compatExt" {
            let spid = attribute_value(e, b"spid")?;
            for props in open.iter_mut().filter(|props| !props.spid_seen) {
                props.spid_seen = true;
                shapes[props.index].spid = spid.clone();
            }
        }

        if memmem::find(e.local_name().as_ref(), NON_VISUAL_PROPS).is_some() {
            if let Some(name) = attribute_value(e, b"name")? {
                open.push(OpenProps {
                    index: shapes.len(),
                    depth,
                    spid_seen: false,
                });
                shapes.push(DrawingShape { name, spid: None });
            }
        }

        Ok(())
    }

    /// First node, in document order, whose name contains `fragment`.
    pub fn find_by_name_fragment(&self, fragment: &str) -> Option<&DrawingShape> {
        self.shapes.iter().find(|shape| shape.name.contains(fragment))
    }

    /// All named nodes in document order.
    #[inline]
    pub fn shapes(&self) -> &[DrawingShape] {
        &self.shapes
    }

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

    const DRAWING: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<xdr:wsDr xmlns:xdr="http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">
  <mc:AlternateContent xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006">
    <mc:Choice xmlns:a14="http://schemas.microsoft.com/office/drawing/2010/main" Requires="a14">
      <xdr:twoCellAnchor>
        <xdr:sp>
          <xdr:nvSpPr>
            <xdr:cNvPr id="1025" name="Check Box 1" hidden="1">
              <a:extLst>
                <a:ext uri="{63B3BB69-23CF-44E3-9099-C40C66FF867C}">
                  <a14:compatExt spid="_x0000_s1025"/>
                </a:ext>
              </a:extLst>
            </xdr:cNvPr>
            <xdr:cNvSpPr/>
          </xdr:nvSpPr>
        </xdr:sp>
      </xdr:twoCellAnchor>
      <xdr:twoCellAnchor>
        <xdr:sp>
          <xdr:nvSpPr>
            <xdr:cNvPr id="1026" name="Group_Opt1_Label">
              <a:extLst>
                <a:ext uri="{63B3BB69-23CF-44E3-9099-C40C66FF867C}">
                  <a14:compatExt spid="_x0000_s1026"/>
                  <a14:compatExt spid="_x0000_s9999"/>
                </a:ext>
              </a:extLst>
            </xdr:cNvPr>
          </xdr:nvSpPr>
        </xdr:sp>
      </xdr:twoCellAnchor>
      <xdr:twoCellAnchor>
        <xdr:pic>
          <xdr:nvPicPr>
            <xdr:cNvPr id="3" name="Picture 3"/>
            <xdr:cNvPicPr/>
          </xdr:nvPicPr>
        </xdr:pic>
        <compatExt spid="_x0000_s0000"/>
      </xdr:twoCellAnchor>
    </mc:Choice>
  </mc:AlternateContent>
</xdr:wsDr>"#;

    #[test]
    fn test_parse_named_nodes_in_order() {
        let index = DrawingIndex::from_xml(DRAWING).unwrap();
        let names: Vec<&str> = index.shapes().iter().map(DrawingShape::name).collect();
        assert_eq!(names, ["Check Box 1", "Group_Opt1_Label", "Picture 3"]);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_first_compat_ext_wins() {
        let index = DrawingIndex::from_xml(DRAWING).unwrap();
        let shape = index.find_by_name_fragment("Group_Opt1_Label").unwrap();
        assert_eq!(shape.spid(), Some("_x0000_s1026"));
    }

    #[test]
    fn test_substring_match() {
        let index = DrawingIndex::from_xml(DRAWING).unwrap();
        assert_eq!(
            index.find_by_name_fragment("Opt1").map(DrawingShape::name),
            Some("Group_Opt1_Label")
        );
        assert_eq!(
            index.find_by_name_fragment("Box").and_then(DrawingShape::spid),
            Some("_x0000_s1025")
        );
        assert!(index.find_by_name_fragment("Option Button 9").is_none());
    }

    #[test]
    fn test_compat_ext_outside_properties_is_ignored() {
        let index = DrawingIndex::from_xml(DRAWING).unwrap();
        let picture = index.find_by_name_fragment("Picture").unwrap();
        assert_eq!(picture.spid(), None);
    }

    #[test]
    fn test_malformed_drawing_is_an_error() {
        let cases: [&[u8]; 6] = [
            b"<xdr:wsDr><xdr:cNvPr name=\"x\"",
            b"",
            b"this is not xml at all",
            b"<xdr:wsDr><a></b></xdr:wsDr>",
            b"<xdr:wsDr><xdr:sp>",
            b"<xdr:wsDr/></xdr:sp>",
        ];
        for xml in cases {
            let err = DrawingIndex::from_xml(xml).unwrap_err();
            assert!(
                matches!(err, OpcError::XmlError(_)),
                "{:?}: {:?}",
                String::from_utf8_lossy(xml),
                err
            );
        }
    }

    #[test]
    fn test_empty_root_is_accepted() {
        let index = DrawingIndex::from_xml(b"<?xml version=\"1.0\"?><xdr:wsDr/>").unwrap();
        assert!(index.is_empty());
    }
}
