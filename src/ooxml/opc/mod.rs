/// Open Packaging Conventions (OPC) support.
///
/// This module covers the part of OPC (ECMA-376 Part 2) needed to read legacy
/// form controls out of an XLSX package:
///
/// - Extracting the ZIP-based physical package into a working copy
/// - Addressing parts by pack URI
/// - Reading the relationships of the VML drawing part
///
/// # Performance Features
///
/// - Uses `quick-xml` for streaming XML parsing with minimal allocation
/// - Uses hash maps for O(1) relationship lookups
pub mod constants;
pub mod error;
pub mod packuri;
pub mod phys_pkg;
pub mod rel;

// Re-export commonly used types
pub use error::OpcError;
pub use packuri::PackURI;
pub use phys_pkg::WorkingCopy;
pub use rel::{Relationship, Relationships};
