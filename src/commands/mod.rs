//! Command line interface.
//!
//! - `sort` (default): process the inbox
//! - `view`: print the text the extraction cascade gets out of PDFs
//! - `history`: print the audit log

mod history;
mod sort;
mod view;

pub use history::history;
pub use sort::sort;
pub use view::view;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use thiserror::Error;

use crate::config::{Settings, INBOX_FOLDER};
use crate::filing::AuditError;

#[derive(Debug, Parser)]
#[command(name = "file-sort")]
#[command(about = "Classify, rename and file scanned PDFs from an inbox folder")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub settings: SettingsArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract, classify, rename and file every PDF in the inbox
    Sort,
    /// Show the text extracted from a PDF, or from every PDF in a folder
    View {
        /// PDF file or folder (defaults to the inbox)
        path: Option<PathBuf>,
        /// Also write the text to <name>.txt next to each PDF
        #[arg(long)]
        save: bool,
    },
    /// Show filed documents, newest first
    History {
        /// Show at most this many entries
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

/// Flags that override environment and default settings
#[derive(Debug, Default, Args)]
pub struct SettingsArgs {
    /// Inbox folder to scan [env: FILE_SORT_INBOX]
    #[arg(long, global = true, value_name = "DIR")]
    pub inbox: Option<PathBuf>,
    /// Root of the document folders [env: FILE_SORT_DOCUMENTS]
    #[arg(long, global = true, value_name = "DIR")]
    pub documents: Option<PathBuf>,
    /// Shortcuts workflow used as the assistant [env: FILE_SORT_SHORTCUT]
    #[arg(long, global = true, value_name = "NAME")]
    pub shortcut: Option<String>,
    /// Assistant timeout in seconds [env: FILE_SORT_ASSISTANT_TIMEOUT_SECS]
    #[arg(long, global = true, value_name = "SECS")]
    pub assistant_timeout: Option<u64>,
}

impl SettingsArgs {
    /// Overlay the flags on `settings`. As with the environment, an inbox
    /// that was derived from the documents base follows a `--documents` flag.
    pub fn apply(&self, settings: Settings) -> Settings {
        let derived_inbox = settings.inbox == settings.documents_base.join(INBOX_FOLDER);
        let documents_base = self.documents.clone().unwrap_or(settings.documents_base);
        let inbox = match &self.inbox {
            Some(inbox) => inbox.clone(),
            None if derived_inbox => documents_base.join(INBOX_FOLDER),
            None => settings.inbox,
        };

        Settings {
            inbox,
            documents_base,
            shortcut: self.shortcut.clone().unwrap_or(settings.shortcut),
            assistant_timeout: self
                .assistant_timeout
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(settings.assistant_timeout),
            ..settings
        }
    }
}

/// Error type for `view` and `history`
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{} is not a PDF file or directory", .0.display())]
    NotPdf(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Run one command to completion
pub async fn dispatch(command: Command, settings: &Settings) -> ExitCode {
    let result = match command {
        Command::Sort => {
            sort(settings).await;
            // A sort run always reports success; problems are in the logs
            Ok(())
        }
        Command::View { path, save } => view(settings, path, save).await,
        Command::History { limit, json } => history(settings, limit, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
