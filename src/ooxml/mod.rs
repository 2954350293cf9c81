//! Office Open XML (OOXML) package access.
//!
//! The module is organized into layers:
//!
//! 1. **OPC Layer** (`opc`): working copy of the ZIP package, pack URIs and
//!    relationships
//! 2. **Drawings** (`drawings`): DrawingML and VML shape indices
//! 3. **Format-Specific Modules**:
//!    - `xlsx`: Excel workbooks (form controls)
pub mod drawings;
pub mod opc;
pub mod xlsx;

pub use opc::PackURI;
