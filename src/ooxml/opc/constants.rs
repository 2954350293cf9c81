/// Constant values for the parts of an XLSX package that carry legacy form controls.
///
/// The part locations are fixed: the reader never discovers them through the
/// workbook relationship graph.

/// Part names (absolute pack URIs) of the governing parts.
pub mod part {
    /// DrawingML shape descriptor of the first sheet drawing
    pub const DRAWING: &str = "/xl/drawings/drawing1.xml";
    /// Legacy VML shape descriptor paired with the drawing
    pub const VML_DRAWING: &str = "/xl/drawings/vmlDrawing1.vml";
    /// Directory holding the raster images referenced by VML relationships
    pub const MEDIA_DIR: &str = "/xl/media";
}

/// XML namespaces matched by the indices.
pub mod namespace {
    pub const VML: &[u8] = b"urn:schemas-microsoft-com:vml";
    pub const OFFICE_EXCEL: &[u8] = b"urn:schemas-microsoft-com:office:excel";
    /// DrawingML 2010 extensions (`a14:`), home of `compatExt`
    pub const DRAWING_2010_MAIN: &[u8] = b"http://schemas.microsoft.com/office/drawing/2010/main";
}

/// Open XML relationship target modes
pub mod target_mode {
    pub const EXTERNAL: &str = "External";
}

/// Relationship type URIs
pub mod relationship_type {
    /// Picture linked from a VML `v:imagedata`
    pub const IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
}
