//! Text recognition with the `tesseract` command line tool.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{OcrError, TextRecognizer};
use crate::process::{locate_tool, run_command, HOMEBREW_BIN_DIRS};

/// Upper bound for recognizing a single page
const RECOGNIZE_TIMEOUT: Duration = Duration::from_secs(120);

/// Runs `tesseract <image> stdout` per page
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    binary: Option<PathBuf>,
}

impl TesseractRecognizer {
    /// Find `tesseract` in the Homebrew prefixes or on PATH.
    /// When it is missing, the recognizer reports itself unavailable.
    pub fn locate() -> Self {
        Self {
            binary: locate_tool("tesseract", HOMEBREW_BIN_DIRS),
        }
    }

    pub fn with_binary(binary: Option<PathBuf>) -> Self {
        Self { binary }
    }
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    fn is_available(&self) -> bool {
        self.binary.is_some()
    }

    async fn recognize(&self, image: &Path) -> Result<String, OcrError> {
        let binary = self
            .binary
            .as_ref()
            .ok_or_else(|| OcrError::Recognize("tesseract is not installed".to_string()))?;

        let args = [image.as_os_str(), std::ffi::OsStr::new("stdout")];
        let output = run_command(binary, args, None, RECOGNIZE_TIMEOUT).await?;
        if !output.status.success() {
            return Err(OcrError::Recognize(format!(
                "tesseract exited with {:?} for {}: {}",
                output.status.code(),
                image.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unavailable_without_binary() {
        let recognizer = TesseractRecognizer::with_binary(None);
        assert!(!recognizer.is_available());
        assert!(recognizer.recognize(Path::new("/tmp/page-1.png")).await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_recognize_error() {
        // `false` ignores its arguments and exits 1
        let recognizer = TesseractRecognizer::with_binary(crate::process::locate_tool("false", &[]));
        let result = recognizer.recognize(Path::new("/tmp/page-1.png")).await;
        assert!(matches!(result, Err(OcrError::Recognize(_))));
    }
}
