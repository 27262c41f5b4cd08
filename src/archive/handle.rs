//! Ownership of the temporary downloaded archive

use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The local file holding a downloaded archive
///
/// The owner must call [`ArchiveHandle::release`] to delete the file and
/// observe any failure. A handle dropped without being released deletes the
/// file silently, so an aborted download never leaves an archive behind.
#[derive(Debug)]
pub struct ArchiveHandle {
    path: PathBuf,
    released: bool,
}

impl ArchiveHandle {
    /// Take ownership of the archive path
    ///
    /// The file does not need to exist yet.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            released: false,
        }
    }

    /// Location of the archive file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the archive file
    ///
    /// Consumes the handle; the drop fallback will not run afterwards.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file cannot be removed
    pub async fn release(mut self) -> io::Result<()> {
        self.released = true;
        tokio::fs::remove_file(&self.path).await
    }
}

impl Drop for ArchiveHandle {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            debug!("Dropped archive {:?} was not removed: {}", self.path, e);
        }
    }
}
