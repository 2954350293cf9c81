//! Excel (.xlsx) workbook support.
//!
//! Only legacy form controls are read; see [`controls`].

pub mod controls;

pub use controls::{ControlSession, SessionOptions};
