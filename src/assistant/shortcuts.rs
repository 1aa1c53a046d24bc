//! Assistant backed by a macOS Shortcuts workflow.
//!
//! The prompt is piped to `shortcuts run <name> --input-path -`. Shortcuts
//! answers in RTF, which is converted to plain text before returning.

use async_trait::async_trait;
use std::time::Duration;

use super::{preview, rtf, Assistant, AssistantError};
use crate::process::run_command;

/// Shortcut invoked when none is configured
pub const DEFAULT_SHORTCUT: &str = "Ask ChatGPT";

/// Maximum time to wait for one answer
pub const DEFAULT_ASSISTANT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct ShortcutsAssistant {
    program: String,
    shortcut: String,
    timeout: Duration,
}

impl ShortcutsAssistant {
    pub fn new(shortcut: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: "shortcuts".to_string(),
            shortcut: shortcut.into(),
            timeout,
        }
    }

    /// Use a different executable in place of `shortcuts`
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

impl Default for ShortcutsAssistant {
    fn default() -> Self {
        Self::new(DEFAULT_SHORTCUT, DEFAULT_ASSISTANT_TIMEOUT)
    }
}

#[async_trait]
impl Assistant for ShortcutsAssistant {
    async fn ask(&self, prompt: &str) -> Result<String, AssistantError> {
        tracing::info!("  [ASSISTANT] Calling shortcut '{}'...", self.shortcut);
        tracing::info!("  [ASSISTANT] Prompt length: {} characters", prompt.chars().count());

        let output = run_command(
            &self.program,
            ["run", self.shortcut.as_str(), "--input-path", "-"],
            Some(prompt.as_bytes()),
            self.timeout,
        )
        .await?;

        tracing::debug!("  [ASSISTANT] Return code: {:?}", output.status.code());

        if !output.status.success() {
            return Err(AssistantError::NonZeroExit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let raw = String::from_utf8_lossy(&output.stdout);
        tracing::debug!("  [ASSISTANT] Response length: {} characters", raw.chars().count());

        let text = rtf::to_plain_text(&raw);
        if text.is_empty() {
            return Err(AssistantError::Empty);
        }

        tracing::info!("  [ASSISTANT] Response: {}", preview(&text, 200));
        Ok(text)
    }
}
