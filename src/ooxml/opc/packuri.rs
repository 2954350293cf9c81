/// Provides the PackURI value type used to address parts inside the working copy.
///
/// A PackURI represents a part name within an OPC package, following the URI format
/// defined by the Open Packaging Conventions (ECMA-376 Part 2).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackURI {
    /// The full pack URI string (e.g., "/xl/drawings/drawing1.xml")
    uri: String,
}

impl PackURI {
    /// Create a new PackURI from a string.
    ///
    /// # Returns
    /// * `Ok(PackURI)` if the URI is valid
    /// * `Err` if the URI doesn't start with a forward slash
    pub fn new<S: Into<String>>(uri: S) -> Result<Self, String> {
        let uri = uri.into();
        if !uri.starts_with('/') {
            return Err(format!("PackURI must begin with slash, got '{}'", uri));
        }
        Ok(PackURI { uri })
    }

    /// Create the PackURI of a file inside a package directory.
    ///
    /// Only the final segment of `file_ref` is kept, so "../media/image1.emf"
    /// joined onto "/xl/media" yields "/xl/media/image1.emf".
    pub fn in_dir(dir: &str, file_ref: &str) -> Result<Self, String> {
        let file_name = file_name_of(file_ref)
            .ok_or_else(|| format!("reference '{}' does not name a file", file_ref))?;
        Self::new(format!("{}/{}", dir.trim_end_matches('/'), file_name))
    }

    /// Get the base URI (directory portion) of this PackURI.
    ///
    /// For example, "/xl/drawings" for "/xl/drawings/drawing1.xml".
    pub fn base_uri(&self) -> &str {
        match self.uri.rfind('/') {
            Some(0) | None => "/",
            Some(pos) => &self.uri[..pos],
        }
    }

    /// Get the filename portion of this PackURI.
    pub fn filename(&self) -> &str {
        file_name_of(&self.uri).unwrap_or("")
    }

    /// Get the membername (URI with leading slash stripped).
    ///
    /// This is the form used as the ZIP entry name and as the path relative to
    /// the working copy root.
    pub fn membername(&self) -> &str {
        &self.uri[1..]
    }

    /// Get the PackURI of the .rels part corresponding to this PackURI.
    ///
    /// For example, "/xl/drawings/_rels/vmlDrawing1.vml.rels" for "/xl/drawings/vmlDrawing1.vml".
    pub fn rels_uri(&self) -> Result<PackURI, String> {
        let base_uri = self.base_uri();
        let rels_uri_str = if base_uri == "/" {
            format!("/_rels/{}.rels", self.filename())
        } else {
            format!("{}/_rels/{}.rels", base_uri, self.filename())
        };

        Self::new(rels_uri_str)
    }

    /// Get the full URI string.
    pub fn as_str(&self) -> &str {
        &self.uri
    }
}

/// Last non-empty path segment of a forward-slash reference.
pub(crate) fn file_name_of(reference: &str) -> Option<&str> {
    match reference.rsplit('/').next() {
        Some("") | Some(".") | Some("..") | None => None,
        Some(name) => Some(name),
    }
}

impl std::fmt::Display for PackURI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for PackURI {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
