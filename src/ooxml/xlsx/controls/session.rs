//! An opened workbook and the queries it answers.

use super::decoder;
use super::index::DocumentIndex;
use super::options::SessionOptions;
use super::resolver;
use crate::common::error::{Error, Result};
use crate::ooxml::drawings::DrawingShape;
use crate::ooxml::opc::WorkingCopy;
use std::path::Path;
use tracing::debug;

/// A workbook extracted to a working directory, with its control parts
/// indexed.
///
/// The index is read-only after [`open`](Self::open), so a session can be
/// shared between tasks and queried concurrently. Closing consumes the
/// session; dropping it without closing also removes the working directory,
/// but silently.
///
/// # Examples
///
/// ```no_run
/// use formctl::ControlSession;
///
/// # async fn run() -> formctl::Result<()> {
/// let session = ControlSession::open("survey.xlsx")?;
/// let agreed = session.checkbox_state("Check Box 1")?;
/// let picked = session.radio_button_state("Opt1").await?;
/// println!("agreed={agreed} picked={picked}");
/// session.close()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ControlSession {
    working_copy: WorkingCopy,
    index: DocumentIndex,
}

impl ControlSession {
    /// Open a workbook with default options.
    ///
    /// # Errors
    /// [`Error::Archive`] if the file cannot be extracted or one of the
    /// drawing, VML or VML relationship parts is missing or malformed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, SessionOptions::default())
    }

    /// Open a workbook, extracting it as `options` directs.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: SessionOptions) -> Result<Self> {
        let path = path.as_ref();
        let working_copy =
            WorkingCopy::extract(path, options.temp_root.as_deref(), options.max_entry_size)?;

        // On failure the working copy is dropped, which removes it.
        let index = DocumentIndex::load(&working_copy)?;

        debug!(
            package = %path.display(),
            working_dir = %working_copy.root().display(),
            "control session opened"
        );
        Ok(Self {
            working_copy,
            index,
        })
    }

    /// Whether the checkbox whose drawing name contains `name` is checked.
    ///
    /// Matching is by substring, first node in document order. A control
    /// whose legacy shape is missing from the VML part reads as unchecked.
    ///
    /// # Errors
    /// [`Error::ControlNotFound`] when no drawing node matches.
    pub fn checkbox_state(&self, name: &str) -> Result<bool> {
        let spid = resolver::resolve_checkbox_identifier(&self.index, name)?;
        Ok(decoder::is_checked(&self.index, spid))
    }

    /// Whether the radio button with VML id `name` is drawn selected.
    ///
    /// Matching is exact. The button's image is loaded from `xl/media/` and
    /// its selection dot inspected.
    ///
    /// # Errors
    /// - [`Error::ControlNotFound`] when no VML shape has that id
    /// - [`Error::UnresolvedRelationship`] when the shape does not lead to a
    ///   media file
    /// - [`Error::ImageLoad`] when the media cannot be read or probed
    pub async fn radio_button_state(&self, name: &str) -> Result<bool> {
        if self.index.vml().shape(name).is_none() {
            return Err(Error::ControlNotFound(name.to_string()));
        }
        let relation_id = resolver::resolve_radio_relation_id(&self.index, name).ok_or_else(|| {
            Error::UnresolvedRelationship(format!("radio button '{}' carries no image reference", name))
        })?;

        let file_name = decoder::relationship_target(&self.index, relation_id)?;
        let media = decoder::media_path(&self.working_copy, file_name)?;
        decoder::is_selected(&media).await
    }

    /// Names of every drawing node, in document order.
    pub fn control_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.index.drawing().shapes().iter().map(DrawingShape::name)
    }

    /// Directory the workbook was extracted into.
    #[inline]
    pub fn working_dir(&self) -> &Path {
        self.working_copy.root()
    }

    /// Remove the working directory.
    ///
    /// # Errors
    /// [`Error::Archive`] if the directory cannot be removed.
    pub fn close(self) -> Result<()> {
        debug!(working_dir = %self.working_copy.root().display(), "closing control session");
        self.working_copy.close()?;
        Ok(())
    }
}
