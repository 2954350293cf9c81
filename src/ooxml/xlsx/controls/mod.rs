//! Legacy form-control state for Excel workbooks.
//!
//! Checkbox and option-button state is not stored in any cell. It lives in
//! the sheet's drawing parts:
//!
//! - a checkbox is found by its drawing name, linked to a VML shape, and is
//!   checked when that shape carries an `x:Checked` marker;
//! - an option button is found by its VML id and is selected when the image
//!   it renders to shows a filled dot.
//!
//! [`ControlSession`] extracts the workbook, indexes the drawing, VML and VML
//! relationship parts once, and answers queries against that index.

pub mod decoder;
pub mod index;
pub mod options;
pub mod resolver;
mod session;

pub use index::DocumentIndex;
pub use options::SessionOptions;
pub use session::ControlSession;
