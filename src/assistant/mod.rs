//! Assistant Module
//!
//! Classification and naming are delegated to an external chat assistant.
//!
//! This module provides:
//! - [`Assistant`]: the transport (prompt in, plain-text answer out)
//! - [`ShortcutsAssistant`]: the macOS Shortcuts implementation
//! - [`DocumentAssistant`]: prompt building and response parsing
//! - `rtf`: conversion of the Shortcuts RTF envelope to plain text

mod client;
pub mod prompts;
pub mod rtf;
mod shortcuts;

pub use client::DocumentAssistant;
pub use shortcuts::{ShortcutsAssistant, DEFAULT_ASSISTANT_TIMEOUT, DEFAULT_SHORTCUT};

use async_trait::async_trait;
use thiserror::Error;

use crate::process::ProcessError;

/// Error type for assistant calls
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error("assistant exited with status {code:?}: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },
    #[error("assistant returned an empty response")]
    Empty,
}

/// Something that answers a prompt with plain text
#[async_trait]
pub trait Assistant: Send + Sync {
    async fn ask(&self, prompt: &str) -> Result<String, AssistantError>;
}

/// First `max` characters of `text`, for log lines
pub(crate) fn preview(text: &str, max: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview() {
        assert_eq!(preview("short", 200), "short");
        assert_eq!(preview("abcdef", 3), "abc...");
    }
}
