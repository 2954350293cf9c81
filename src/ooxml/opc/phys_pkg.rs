//! Provides the working copy of a physical OPC package (ZIP file).
//!
//! The package is extracted once into an ephemeral directory owned by the
//! session. Parts and media are then read from disk by their pack URIs, and
//! the directory is removed when the working copy is closed or dropped.

use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, trace};
use zip::ZipArchive;

/// Extracted contents of a ZIP-based OPC package.
#[derive(Debug)]
pub struct WorkingCopy {
    /// Ephemeral directory holding every extracted entry
    dir: TempDir,
}

impl WorkingCopy {
    /// Extract the package at `path` into a fresh temporary directory.
    ///
    /// # Arguments
    /// * `path` - Path to the package file (.xlsx, .xlsm)
    /// * `temp_root` - Parent of the working directory, or the system temp dir
    /// * `max_entry_size` - Upper bound on the uncompressed size of any entry
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist, isn't a valid ZIP file,
    /// contains an entry that escapes the working directory or exceeds the
    /// size limit, or cannot be written out.
    pub fn extract(path: &Path, temp_root: Option<&Path>, max_entry_size: u64) -> Result<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => OpcError::PackageNotFound(path.display().to_string()),
            _ => OpcError::IoError(e),
        })?;
        let mut archive = ZipArchive::new(BufReader::new(file))?;

        let prefix = format!(
            "{}-",
            path.file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or("package")
        );
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);
        let dir = match temp_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };

        let mut extracted = 0usize;
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let Some(relative) = entry.enclosed_name() else {
                return Err(OpcError::UnsafeEntryName(entry.name().to_string()));
            };
            let target = dir.path().join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&target)?;
                continue;
            }

            if entry.size() > max_entry_size {
                return Err(OpcError::EntryTooLarge {
                    name: entry.name().to_string(),
                    size: entry.size(),
                    limit: max_entry_size,
                });
            }

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&target)?;
            // The declared size can lie; cap what is actually inflated.
            let written = io::copy(&mut (&mut entry).take(max_entry_size + 1), &mut out)?;
            if written > max_entry_size {
                return Err(OpcError::EntryTooLarge {
                    name: entry.name().to_string(),
                    size: written,
                    limit: max_entry_size,
                });
            }

            trace!(entry = entry.name(), bytes = written, "extracted");
            extracted += 1;
        }

        debug!(
            package = %path.display(),
            working_dir = %dir.path().display(),
            entries = extracted,
            "package extracted"
        );

        Ok(Self { dir })
    }

    /// Root of the working directory.
    #[inline]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Filesystem location of a part inside the working copy.
    #[inline]
    pub fn part_path(&self, pack_uri: &PackURI) -> PathBuf {
        self.dir.path().join(pack_uri.membername())
    }

    /// Read the binary content of a part.
    ///
    /// A part missing from the working copy is reported as `PartNotFound`.
    pub fn read_part(&self, pack_uri: &PackURI) -> Result<Vec<u8>> {
        fs::read(self.part_path(pack_uri)).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => OpcError::PartNotFound(pack_uri.to_string()),
            _ => OpcError::IoError(e),
        })
    }

    /// Remove the working directory, reporting any failure.
    pub fn close(self) -> Result<()> {
        let root = self.dir.path().to_path_buf();
        self.dir.close()?;
        debug!(working_dir = %root.display(), "working copy removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::{SimpleFileOptions, ZipWriter};

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        for (name, data) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_extract_and_read_part() {
        let dir = tempfile::tempdir().unwrap();
        let package = dir.path().join("controls.xlsx");
        write_zip(
            &package,
            &[
                ("xl/drawings/drawing1.xml", b"<xdr:wsDr/>"),
                ("xl/media/image1.png", b"not really a png"),
            ],
        );

        let copy = WorkingCopy::extract(&package, Some(dir.path()), 1024).unwrap();
        let uri = PackURI::new("/xl/drawings/drawing1.xml").unwrap();
        assert_eq!(copy.read_part(&uri).unwrap(), b"<xdr:wsDr/>");
        assert!(copy.part_path(&PackURI::new("/xl/media/image1.png").unwrap()).is_file());
        assert!(
            copy.root()
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap()
                .starts_with("controls-")
        );
    }

    #[test]
    fn test_missing_part() {
        let dir = tempfile::tempdir().unwrap();
        let package = dir.path().join("empty.xlsx");
        write_zip(&package, &[("[Content_Types].xml", b"<Types/>")]);

        let copy = WorkingCopy::extract(&package, Some(dir.path()), 1024).unwrap();
        let err = copy
            .read_part(&PackURI::new("/xl/drawings/drawing1.xml").unwrap())
            .unwrap_err();
        assert!(matches!(err, OpcError::PartNotFound(_)));
    }

    #[test]
    fn test_corrupt_archive() {
        let dir = tempfile::tempdir().unwrap();
        let package = dir.path().join("corrupt.xlsx");
        fs::write(&package, b"PK\x03\x04 definitely not a zip file").unwrap();

        let err = WorkingCopy::extract(&package, Some(dir.path()), 1024).unwrap_err();
        assert!(matches!(err, OpcError::ZipError(_)));
    }

    #[test]
    fn test_missing_package() {
        let dir = tempfile::tempdir().unwrap();
        let err = WorkingCopy::extract(&dir.path().join("nope.xlsx"), None, 1024).unwrap_err();
        assert!(matches!(err, OpcError::PackageNotFound(_)));
    }

    #[test]
    fn test_entry_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let package = dir.path().join("big.xlsx");
        write_zip(&package, &[("xl/media/image1.png", &[0u8; 64])]);

        let err = WorkingCopy::extract(&package, Some(dir.path()), 16).unwrap_err();
        assert!(matches!(err, OpcError::EntryTooLarge { limit: 16, .. }));
    }

    #[test]
    fn test_close_removes_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        let package = dir.path().join("close.xlsx");
        write_zip(&package, &[("xl/drawings/drawing1.xml", b"<xdr:wsDr/>")]);

        let copy = WorkingCopy::extract(&package, Some(dir.path()), 1024).unwrap();
        let root = copy.root().to_path_buf();
        assert!(root.is_dir());

        copy.close().unwrap();
        assert!(!root.exists());
    }
}
