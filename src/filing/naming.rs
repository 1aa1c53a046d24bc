//! Filename policy: manual overrides, cleanup of generated names, and
//! collision-safe renames in place.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

use super::FilingError;

/// `YYYY-MM-DD - Description.pdf`
static MANUAL_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}\s+-\s+.+\.pdf$").expect("valid regex"));

/// True when the name already follows the dated convention and must be kept
pub fn is_manual_override(filename: &str) -> bool {
    MANUAL_NAME.is_match(filename)
}

/// Make an assistant-suggested name safe to use as a filename: path
/// separators become `-` and `.pdf` is appended when missing.
pub fn clean_suggested_filename(suggested: &str) -> String {
    let mut name: String = suggested
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | ':' | '\\') { '-' } else { c })
        .collect();
    if !name.ends_with(".pdf") {
        name.push_str(".pdf");
    }
    name
}

/// Result of an attempted rename
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed(PathBuf),
    Unchanged(PathBuf),
    /// Another file already has the new name; the original was kept
    Collision(PathBuf),
}

impl RenameOutcome {
    /// Where the document is now
    pub fn path(&self) -> &Path {
        match self {
            Self::Renamed(p) | Self::Unchanged(p) | Self::Collision(p) => p,
        }
    }
}

/// Rename `path` to `new_name` in the same directory unless the name is
/// unchanged or already taken.
pub fn rename_in_place(path: &Path, new_name: &str) -> Result<RenameOutcome, FilingError> {
    let current = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
    if current == new_name {
        tracing::info!("  [RENAME] Name unchanged: {}", current);
        return Ok(RenameOutcome::Unchanged(path.to_path_buf()));
    }

    let target = path.with_file_name(new_name);
    if target.exists() {
        tracing::warn!(
            "  [RENAME] '{}' already exists, keeping original name '{}'",
            new_name,
            current
        );
        return Ok(RenameOutcome::Collision(path.to_path_buf()));
    }

    std::fs::rename(path, &target).map_err(|source| FilingError::Rename {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("  [RENAME] {} -> {}", current, new_name);
    Ok(RenameOutcome::Renamed(target))
}
