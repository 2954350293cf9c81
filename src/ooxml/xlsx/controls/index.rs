//! Parse-once index over the three parts that describe form controls.

use crate::ooxml::drawings::{DrawingIndex, VmlIndex};
use crate::ooxml::opc::constants::part;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::{PackURI, Relationships, WorkingCopy};
use tracing::debug;

/// Typed lookup structures for the drawing, VML and VML relationship parts.
///
/// Read-only once built; queries never touch the XML again.
#[derive(Debug)]
pub struct DocumentIndex {
    drawing: DrawingIndex,
    vml: VmlIndex,
    relationships: Relationships,
}

impl DocumentIndex {
    /// Build the index from the raw bytes of the three parts.
    pub fn parse(drawing_xml: &[u8], vml_xml: &[u8], rels_xml: &[u8]) -> Result<Self> {
        let drawing = DrawingIndex::from_xml(drawing_xml)?;
        let vml = VmlIndex::from_xml(vml_xml)?;
        let relationships = Relationships::from_xml(rels_xml)?;

        debug!(
            drawing_nodes = drawing.len(),
            vml_shapes = vml.len(),
            relationships = relationships.len(),
            "control index built"
        );

        Ok(Self {
            drawing,
            vml,
            relationships,
        })
    }

    /// Read and parse the three parts from an extracted package.
    ///
    /// A missing part fails with [`OpcError::PartNotFound`].
    pub fn load(working_copy: &WorkingCopy) -> Result<Self> {
        let drawing_uri = PackURI::new(part::DRAWING).map_err(OpcError::InvalidPackUri)?;
        let vml_uri = PackURI::new(part::VML_DRAWING).map_err(OpcError::InvalidPackUri)?;
        let rels_uri = vml_uri.rels_uri().map_err(OpcError::InvalidPackUri)?;

        let drawing_xml = working_copy.read_part(&drawing_uri)?;
        let vml_xml = working_copy.read_part(&vml_uri)?;
        let rels_xml = working_copy.read_part(&rels_uri)?;

        Self::parse(&drawing_xml, &vml_xml, &rels_xml)
    }

    #[inline]
    pub fn drawing(&self) -> &DrawingIndex {
        &self.drawing
    }

    #[inline]
    pub fn vml(&self) -> &VmlIndex {
        &self.vml
    }

    /// Relationships of the VML part.
    #[inline]
    pub fn relationships(&self) -> &Relationships {
        &self.relationships
    }
}
