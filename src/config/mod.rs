//! Runtime settings.
//!
//! Resolution order: built-in defaults, then environment variables (a `.env`
//! file is loaded into the environment at startup), then command line flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::assistant::{DEFAULT_ASSISTANT_TIMEOUT, DEFAULT_SHORTCUT};

/// iCloud Drive's Documents folder, relative to the home directory
pub const ICLOUD_DOCUMENTS: &str = "Library/Mobile Documents/com~apple~CloudDocs/Documents";

/// Inbox folder name inside the documents base
pub const INBOX_FOLDER: &str = "00 - Scan Inbox";

pub const ENV_INBOX: &str = "FILE_SORT_INBOX";
pub const ENV_DOCUMENTS: &str = "FILE_SORT_DOCUMENTS";
pub const ENV_SHORTCUT: &str = "FILE_SORT_SHORTCUT";
pub const ENV_ASSISTANT_TIMEOUT: &str = "FILE_SORT_ASSISTANT_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Folder scanned for new PDFs; also holds the audit and debug logs
    pub inbox: PathBuf,
    /// Root of the filing taxonomy
    pub documents_base: PathBuf,
    /// Shortcuts workflow that answers prompts
    pub shortcut: String,
    pub assistant_timeout: Duration,
    /// Where scratch copies of cloud files are made
    pub scratch_dir: PathBuf,
}

impl Settings {
    /// Defaults rooted at `home`
    pub fn defaults_for(home: &Path) -> Self {
        let documents_base = home.join(ICLOUD_DOCUMENTS);
        Self {
            inbox: documents_base.join(INBOX_FOLDER),
            documents_base,
            shortcut: DEFAULT_SHORTCUT.to_string(),
            assistant_timeout: DEFAULT_ASSISTANT_TIMEOUT,
            scratch_dir: std::env::temp_dir(),
        }
    }

    /// Defaults overlaid with the process environment
    pub fn from_env() -> Self {
        let home = dirs::home_dir().unwrap_or_default();
        Self::from_lookup(&home, |key| std::env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for each variable.
    /// An inbox that is not set explicitly follows the documents base.
    pub fn from_lookup(home: &Path, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::defaults_for(home);
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let documents_base = non_empty(ENV_DOCUMENTS)
            .map(PathBuf::from)
            .unwrap_or(defaults.documents_base);
        let inbox = non_empty(ENV_INBOX)
            .map(PathBuf::from)
            .unwrap_or_else(|| documents_base.join(INBOX_FOLDER));

        let assistant_timeout = match non_empty(ENV_ASSISTANT_TIMEOUT) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    tracing::warn!(
                        "[Config] Ignoring invalid {}='{}', using {}s",
                        ENV_ASSISTANT_TIMEOUT,
                        raw,
                        defaults.assistant_timeout.as_secs()
                    );
                    defaults.assistant_timeout
                }
            },
            None => defaults.assistant_timeout,
        };

        Self {
            inbox,
            documents_base,
            shortcut: non_empty(ENV_SHORTCUT).unwrap_or(defaults.shortcut),
            assistant_timeout,
            scratch_dir: defaults.scratch_dir,
        }
    }

    /// Audit log location
    pub fn audit_log_path(&self) -> PathBuf {
        self.inbox.join(crate::filing::AUDIT_FILENAME)
    }
}
