//! Whole-document structural extraction with pdf-extract.

use async_trait::async_trait;
use std::panic::{catch_unwind, AssertUnwindSafe};

use super::{ExtractionError, ExtractionStrategy, PdfSource, StageOutcome};

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractReader;

impl PdfExtractReader {
    /// Extract text from PDF bytes.
    /// Wrapped in catch_unwind: pdf-extract (and its cff-parser dependency)
    /// can panic on malformed fonts/glyphs.
    pub fn extract_bytes(bytes: &[u8]) -> Result<String, ExtractionError> {
        match catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes))) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(ExtractionError::Parse(e.to_string())),
            Err(_panic) => Err(ExtractionError::Panicked),
        }
    }
}

#[async_trait]
impl ExtractionStrategy for PdfExtractReader {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    async fn extract(&self, source: &PdfSource) -> StageOutcome {
        match Self::extract_bytes(&source.bytes) {
            Ok(text) => StageOutcome::Text(text),
            Err(ExtractionError::Panicked) => {
                tracing::error!(
                    "  [EXTRACT] pdf-extract PANICKED for {} - likely malformed font/glyph",
                    source.path.display()
                );
                StageOutcome::Text(String::new())
            }
            Err(e) => {
                tracing::info!("  [EXTRACT] pdf-extract extraction failed: {}", e);
                StageOutcome::Text(String::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::test_pdf;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_invalid_pdf_yields_empty_text() {
        let source = PdfSource {
            path: PathBuf::from("/inbox/broken.pdf"),
            bytes: b"%PDF-1.4 truncated".to_vec(),
        };

        assert_eq!(
            PdfExtractReader.extract(&source).await,
            StageOutcome::Text(String::new())
        );
    }

    #[tokio::test]
    async fn test_extracts_text_from_real_pdf() {
        let source = PdfSource {
            path: PathBuf::from("/inbox/scan001.pdf"),
            bytes: test_pdf::with_pages(&[
                test_pdf::text_page("Invoice"),
                test_pdf::text_page("Receipt"),
            ]),
        };

        match PdfExtractReader.extract(&source).await {
            StageOutcome::Text(text) => {
                assert!(text.contains("Invoice"));
                assert!(text.contains("Receipt"));
            }
            StageOutcome::Halt => panic!("pdf-extract never halts the cascade"),
        }
    }
}
