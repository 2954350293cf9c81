//! Configuration for opening a [`ControlSession`](super::ControlSession).
use std::path::{Path, PathBuf};

/// Default upper bound on a single extracted archive entry (64 MiB).
pub const DEFAULT_MAX_ENTRY_SIZE: u64 = 64 * 1024 * 1024;

/// Options that control how a package is extracted.
///
/// # Examples
///
/// ```rust
/// use formctl::SessionOptions;
///
/// let options = SessionOptions::new()
///     .with_temp_root("/var/tmp")
///     .with_max_entry_size(8 * 1024 * 1024);
/// assert_eq!(options.max_entry_size, 8 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Parent directory of the working copy; the system temp dir when `None`
    pub temp_root: Option<PathBuf>,
    /// Largest uncompressed entry the extractor accepts, in bytes
    pub max_entry_size: u64,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            temp_root: None,
            max_entry_size: DEFAULT_MAX_ENTRY_SIZE,
        }
    }
}

impl SessionOptions {
    /// Create a new `SessionOptions` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract working copies under `root` instead of the system temp dir.
    #[inline]
    pub fn with_temp_root(mut self, root: impl AsRef<Path>) -> Self {
        self.temp_root = Some(root.as_ref().to_path_buf());
        self
    }

    /// Set the largest uncompressed entry size accepted during extraction.
    ///
    /// Packages with a larger entry fail to open.
    #[inline]
    pub fn with_max_entry_size(mut self, bytes: u64) -> Self {
        self.max_entry_size = bytes;
        self
    }
}
