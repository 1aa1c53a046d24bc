//! Filing Engine
//!
//! Moves a classified document into its destination folder and records the
//! move in the audit log.
//!
//! ## Collisions
//! A document is never moved over another file. If the destination already
//! holds a different file with the same name, the move is refused and the
//! document stays where it is for manual handling.

pub mod audit;
pub mod naming;

pub use audit::{AuditError, AuditLog, FilingRecord, AUDIT_FILENAME};
pub use naming::{clean_suggested_filename, is_manual_override, rename_in_place, RenameOutcome};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::file_coordination;

#[derive(Debug, Error)]
pub enum FilingError {
    #[error("failed to create {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} already exists in destination", .path.display())]
    Collision { path: PathBuf },
    #[error("failed to move {} to {}: {source}", .from.display(), .to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to rename {}: {source}", .path.display())]
    Rename {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} has no file name", .0.display())]
    NoFileName(PathBuf),
    #[error(transparent)]
    Audit(#[from] AuditError),
}

/// Moves documents and writes the audit log
pub struct Filer {
    audit: AuditLog,
}

impl Filer {
    pub fn new(audit: AuditLog) -> Self {
        Self { audit }
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    /// Move `path` into `destination` (created if needed) and append an audit
    /// record naming `original_name` as the pre-move name. Returns the new
    /// path.
    pub fn file_document(
        &self,
        path: &Path,
        destination: &Path,
        original_name: &str,
    ) -> Result<PathBuf, FilingError> {
        tracing::info!("  [MOVE] Source: {}", path.display());
        tracing::info!("  [MOVE] Destination folder: {}", destination.display());

        let file_name = path
            .file_name()
            .ok_or_else(|| FilingError::NoFileName(path.to_path_buf()))?;

        fs::create_dir_all(destination).map_err(|source| FilingError::CreateDir {
            path: destination.to_path_buf(),
            source,
        })?;

        let target = destination.join(file_name);
        if target.exists() && !same_file(path, &target) {
            tracing::error!(
                "  [MOVE] ERROR: '{}' already exists in destination, skipping move",
                file_name.to_string_lossy()
            );
            return Err(FilingError::Collision { path: target });
        }

        if target != path {
            move_file(path, &target)?;
        }
        tracing::info!("  [MOVE] Moved to {}", target.display());

        let record = FilingRecord::now(original_name, &file_name.to_string_lossy(), destination);
        if let Err(e) = self.audit.append(&record) {
            // The move already happened; report it without undoing the move
            tracing::error!("  [AUDIT] ERROR: failed to log move: {}", e);
        }

        if let Err(e) = file_coordination::notify_file_placed(&target) {
            tracing::debug!("  [MOVE] Could not touch destination folder: {}", e);
        }

        Ok(target)
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Rename, falling back to copy + delete across volumes
fn move_file(from: &Path, to: &Path) -> Result<(), FilingError> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }

    let err = |source| FilingError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };
    fs::copy(from, to).map_err(err)?;
    fs::remove_file(from).map_err(err)?;
    Ok(())
}
