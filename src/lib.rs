//! formctl - Read the state of legacy form controls in Excel workbooks
//!
//! Checkboxes and option buttons placed on a sheet with the legacy Forms
//! toolbar keep their state outside the cell grid. This library opens the
//! workbook package, indexes the drawing and VML parts that describe the
//! controls, and answers "is this checked?" and "is this selected?".
//!
//! # Features
//!
//! - **Checkboxes**: looked up by (a fragment of) their drawing name, read
//!   from the `x:Checked` marker of the linked VML shape
//! - **Option buttons**: looked up by VML id, read from the rendered image of
//!   the button
//! - **EMF media** (feature `emf`, on by default): decode the bitmap embedded
//!   in the metafiles Excel writes for option buttons
//!
//! # Example
//!
//! ```no_run
//! use formctl::{ControlSession, SessionOptions};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let session = ControlSession::open_with_options(
//!     "survey.xlsx",
//!     SessionOptions::new().with_temp_root("/var/tmp"),
//! )?;
//!
//! for name in session.control_names() {
//!     println!("control: {}", name);
//! }
//!
//! if session.checkbox_state("Check Box 1")? {
//!     println!("terms accepted");
//! }
//! let selected = session.radio_button_state("Opt1").await?;
//! println!("Opt1 selected: {}", selected);
//!
//! session.close()?;
//! # Ok(())
//! # }
//! ```

/// Shared error types
pub mod common;

/// Raster decoding and the option-button selection probe
pub mod images;

/// OOXML package access: working copy, drawing indices and workbook controls
pub mod ooxml;

pub use common::error::{Error, Result};
pub use ooxml::xlsx::controls::{ControlSession, SessionOptions};
