//! Text Extraction Module
//!
//! Turns a (possibly cloud-backed) PDF into plain text for classification.
//!
//! ## Strategy
//! 1. Resolve availability (see [`crate::availability`])
//! 2. Run an ordered cascade of extraction strategies, accepting the first
//!    output with at least [`MIN_VIABLE_CHARS`] non-whitespace-trimmed characters:
//!    - `lopdf`: per-page structural extraction
//!    - `pdf-extract`: whole-document structural extraction
//!    - `ocr`: render pages at 300 DPI and run tesseract
//!
//! Some readers return short garbage instead of failing, so acceptance is
//! decided by output length rather than by a success flag.

mod cascade;
mod lopdf_reader;
pub mod ocr;
mod pdf_extract_reader;

pub use cascade::Cascade;
pub use lopdf_reader::LopdfReader;
pub use ocr::OcrStrategy;
pub use pdf_extract_reader::PdfExtractReader;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::availability::{Availability, AvailabilityResolver};

/// Minimum trimmed character count for a strategy's output to be accepted
pub const MIN_VIABLE_CHARS: usize = 50;

/// A PDF loaded into memory, with the path it was read from
#[derive(Debug, Clone)]
pub struct PdfSource {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

impl PdfSource {
    pub fn load(path: &Path) -> Result<Self, ExtractionError> {
        let bytes = std::fs::read(path).map_err(|source| ExtractionError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            bytes,
        })
    }
}

/// Outcome of a single cascade stage
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    /// The stage produced text (possibly too little to accept)
    Text(String),
    /// The stage failed in a way that ends extraction with no text
    Halt,
}

/// One way of getting text out of a PDF
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    /// Short name used in logs and in [`ExtractionResult::strategy`]
    fn name(&self) -> &'static str;

    async fn extract(&self, source: &PdfSource) -> StageOutcome;
}

/// Text pulled from a document, with the stage that produced it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionResult {
    pub text: String,
    pub strategy: Option<&'static str>,
}

impl ExtractionResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Character count (not bytes)
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Error type for extraction internals. Never escapes [`TextExtractor`].
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse PDF: {0}")]
    Parse(String),
    #[error("PDF reader panicked")]
    Panicked,
}

/// Availability resolution followed by the extraction cascade
pub struct TextExtractor {
    resolver: AvailabilityResolver,
    cascade: Cascade,
}

impl TextExtractor {
    pub fn new(resolver: AvailabilityResolver, cascade: Cascade) -> Self {
        Self { resolver, cascade }
    }

    /// Extract text from `path`. Returns an empty result when the file cannot
    /// be made available or no stage produced text.
    pub async fn extract_text(&self, path: &Path) -> ExtractionResult {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        tracing::info!("  [EXTRACT] Starting text extraction for: {}", name);

        let availability = self.resolver.ensure_available(path).await;
        let readable = match &availability {
            Availability::Unavailable => {
                tracing::error!("  [EXTRACT] ERROR: Could not download file from iCloud, aborting...");
                return ExtractionResult::empty();
            }
            Availability::Scratch(copy) => {
                tracing::info!("  [EXTRACT] Using temp file for processing: {}", copy.path().display());
                copy.path()
            }
            Availability::Original(original) => original.as_path(),
        };

        let result = match PdfSource::load(readable) {
            Ok(source) => self.cascade.run(&source).await,
            Err(e) => {
                tracing::error!("  [EXTRACT] ERROR: {}", e);
                ExtractionResult::empty()
            }
        };

        tracing::info!(
            "  [EXTRACT] Final extracted text length: {} characters",
            result.char_count()
        );

        // Dropping the availability deletes any scratch copy
        drop(availability);
        result
    }
}

/// Trimmed character count used by the acceptance predicate
pub(crate) fn viable_len(text: &str) -> usize {
    text.trim().chars().count()
}
