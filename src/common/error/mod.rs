//! Error types returned by the public API.

pub mod types;

pub use types::{Error, Result};
