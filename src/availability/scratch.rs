//! Scratch copies of cloud-backed documents.

use std::path::{Path, PathBuf};

/// A temporary copy of a document, deleted when dropped.
///
/// Deletion failures are logged and otherwise ignored.
#[derive(Debug)]
pub struct ScratchCopy {
    path: PathBuf,
}

impl ScratchCopy {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchCopy {
    fn drop(&mut self) {
        if !self.path.exists() {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("  [ICLOUD] Cleaned up temp file {}", self.path.display()),
            Err(e) => tracing::warn!(
                "  [ICLOUD] WARNING: Could not delete temp file {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}
