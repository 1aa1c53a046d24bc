//! Per-page structural extraction with lopdf.
//!
//! Pages are extracted one at a time so a single broken page (bad font
//! encoding, invalid content stream) only loses that page.

use async_trait::async_trait;
use lopdf::Document;
use std::panic::{catch_unwind, AssertUnwindSafe};

use super::{ExtractionError, ExtractionStrategy, PdfSource, StageOutcome};

#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfReader;

impl LopdfReader {
    /// Extract every page, skipping pages that fail.
    pub fn extract_pages(bytes: &[u8]) -> Result<String, ExtractionError> {
        let document = catch_unwind(AssertUnwindSafe(|| Document::load_mem(bytes)))
            .map_err(|_| ExtractionError::Panicked)?
            .map_err(|e| ExtractionError::Parse(e.to_string()))?;

        let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
        tracing::info!("  [EXTRACT] lopdf found {} page(s)", page_numbers.len());

        let mut text = String::new();
        for page in page_numbers {
            match catch_unwind(AssertUnwindSafe(|| document.extract_text(&[page]))) {
                Ok(Ok(page_text)) if !page_text.is_empty() => {
                    tracing::debug!("  [EXTRACT] Page {}: extracted {} characters", page, page_text.chars().count());
                    text.push_str(&page_text);
                    text.push('\n');
                }
                Ok(Ok(_)) => {
                    tracing::debug!("  [EXTRACT] Page {}: no text", page);
                }
                Ok(Err(e)) => {
                    tracing::info!("  [EXTRACT] Page {} extraction failed: {}", page, e);
                }
                Err(_) => {
                    tracing::warn!("  [EXTRACT] Page {} extraction panicked, skipping", page);
                }
            }
        }

        Ok(text)
    }
}

#[async_trait]
impl ExtractionStrategy for LopdfReader {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    async fn extract(&self, source: &PdfSource) -> StageOutcome {
        match Self::extract_pages(&source.bytes) {
            Ok(text) => StageOutcome::Text(text),
            Err(e) => {
                tracing::info!("  [EXTRACT] lopdf extraction failed for {}: {}", source.path.display(), e);
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
    async fn test_garbage_bytes_yield_empty_text_not_halt() {
        let source = PdfSource {
            path: PathBuf::from("/inbox/not-a-pdf.pdf"),
            bytes: b"this is not a pdf".to_vec(),
        };

        let outcome = LopdfReader.extract(&source).await;
        assert_eq!(outcome, StageOutcome::Text(String::new()));
    }

    #[test]
    fn test_extracts_text_from_every_page() {
        let bytes = test_pdf::with_pages(&[
            test_pdf::text_page("Invoice"),
            test_pdf::text_page("Receipt"),
        ]);

        let text = LopdfReader::extract_pages(&bytes).unwrap();

        let invoice = text.find("Invoice").unwrap();
        let receipt = text.find("Receipt").unwrap();
        assert!(invoice < receipt);
    }

    #[test]
    fn test_broken_page_keeps_other_pages() {
        let bytes = test_pdf::with_pages(&[
            b"BT /F1 18 Tf ((( Tj ] >> \xff ET".to_vec(),
            test_pdf::text_page("Receipt"),
        ]);

        let text = LopdfReader::extract_pages(&bytes).unwrap();

        assert!(text.contains("Receipt"));
    }

    #[test]
    fn test_parse_error_is_reported() {
        assert!(LopdfReader::extract_pages(b"").is_err());
    }
}
