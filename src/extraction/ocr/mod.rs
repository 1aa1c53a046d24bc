//! OCR stage for scanned/image-only PDFs.
//!
//! Uses a fallback-free chain: render every page to a raster image, then run
//! text recognition on each page. Both halves sit behind traits so the stage
//! can be exercised without poppler or tesseract installed.
//!
//! Note: the default backends are command line tools.
//! On macOS: brew install poppler tesseract
//! On Linux: apt install poppler-utils tesseract-ocr

mod poppler;
mod tesseract;

#[cfg(feature = "pdfium")]
mod pdfium;

pub use poppler::PopplerRenderer;
pub use tesseract::TesseractRecognizer;

#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumRenderer;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::{ExtractionStrategy, PdfSource, StageOutcome};
use crate::process::ProcessError;

/// Render resolution for OCR
pub const OCR_DPI: u32 = 300;

/// Error type for the OCR stage
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("page rendering failed: {0}")]
    Render(String),
    #[error("text recognition failed: {0}")]
    Recognize(String),
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Renders PDF pages to image files
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Render every page of `pdf` at `dpi` into `out_dir`, returning the
    /// image paths in page order.
    async fn render_pages(&self, pdf: &Path, dpi: u32, out_dir: &Path) -> Result<Vec<PathBuf>, OcrError>;
}

/// Recognizes text in a page image
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Whether the recognition engine is installed
    fn is_available(&self) -> bool;

    async fn recognize(&self, image: &Path) -> Result<String, OcrError>;
}

/// Render-then-recognize extraction stage.
///
/// Any failure here is a hard stop for the document: the cascade returns no
/// text rather than falling back to an earlier stage's partial output.
pub struct OcrStrategy {
    renderer: Box<dyn PageRenderer>,
    recognizer: Box<dyn TextRecognizer>,
    dpi: u32,
}

impl OcrStrategy {
    pub fn new(renderer: Box<dyn PageRenderer>, recognizer: Box<dyn TextRecognizer>) -> Self {
        Self {
            renderer,
            recognizer,
            dpi: OCR_DPI,
        }
    }

    /// Default backends: pdfium when compiled in, otherwise poppler; tesseract for recognition
    pub fn with_default_backends() -> Self {
        #[cfg(feature = "pdfium")]
        let renderer: Box<dyn PageRenderer> = Box::new(PdfiumRenderer);
        #[cfg(not(feature = "pdfium"))]
        let renderer: Box<dyn PageRenderer> = Box::new(PopplerRenderer::locate());

        Self::new(renderer, Box::new(TesseractRecognizer::locate()))
    }

    async fn ocr(&self, pdf: &Path) -> Result<String, OcrError> {
        let scratch = tempfile::Builder::new().prefix("file-sort-ocr").tempdir()?;

        tracing::info!("  [EXTRACT] Converting PDF to images...");
        let pages = self.renderer.render_pages(pdf, self.dpi, scratch.path()).await?;
        tracing::info!("  [EXTRACT] Converted to {} image(s)", pages.len());

        let mut text = String::new();
        for (index, page) in pages.iter().enumerate() {
            tracing::info!("  [EXTRACT] OCR processing page {}/{}...", index + 1, pages.len());
            let page_text = self.recognizer.recognize(page).await?;
            if !page_text.is_empty() {
                text.push_str(&page_text);
                text.push('\n');
            }
        }
        Ok(text)
    }
}

#[async_trait]
impl ExtractionStrategy for OcrStrategy {
    fn name(&self) -> &'static str {
        "ocr"
    }

    async fn extract(&self, source: &PdfSource) -> StageOutcome {
        if !self.recognizer.is_available() {
            tracing::error!("  [EXTRACT] ERROR: OCR engine not available. Install Tesseract: brew install tesseract");
            return StageOutcome::Halt;
        }

        match self.ocr(&source.path).await {
            Ok(text) => StageOutcome::Text(text),
            Err(e) => {
                tracing::error!("  [EXTRACT] ERROR: OCR extraction failed for {}: {}", source.path.display(), e);
                tracing::debug!("  [EXTRACT] PATH: {}", crate::process::extended_path().to_string_lossy());
                StageOutcome::Halt
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct FakeRenderer {
        pages: usize,
        fail: bool,
        seen_dpi: Arc<Mutex<Option<u32>>>,
    }

    impl FakeRenderer {
        fn new(pages: usize) -> Self {
            Self {
                pages,
                fail: false,
                seen_dpi: Arc::new(Mutex::new(None)),
            }
        }
    }

    #[async_trait]
    impl PageRenderer for FakeRenderer {
        async fn render_pages(&self, _pdf: &Path, dpi: u32, out_dir: &Path) -> Result<Vec<PathBuf>, OcrError> {
            *self.seen_dpi.lock().unwrap() = Some(dpi);
            if self.fail {
                return Err(OcrError::Render("pdftoppm exploded".into()));
            }
            (1..=self.pages)
                .map(|n| {
                    let path = out_dir.join(format!("page-{}.png", n));
                    std::fs::write(&path, format!("page {}", n))?;
                    Ok(path)
                })
                .collect()
        }
    }

    struct FakeRecognizer {
        available: bool,
    }

    #[async_trait]
    impl TextRecognizer for FakeRecognizer {
        fn is_available(&self) -> bool {
            self.available
        }

        async fn recognize(&self, image: &Path) -> Result<String, OcrError> {
            Ok(format!("text of {}", std::fs::read_to_string(image)?))
        }
    }

    fn source() -> PdfSource {
        PdfSource {
            path: PathBuf::from("/inbox/scan.pdf"),
            bytes: b"%PDF".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_joins_pages_with_newlines() {
        let strategy = OcrStrategy::new(
            Box::new(FakeRenderer::new(2)),
            Box::new(FakeRecognizer { available: true }),
        );

        let outcome = strategy.extract(&source()).await;
        assert_eq!(outcome, StageOutcome::Text("text of page 1\ntext of page 2\n".into()));
    }

    #[tokio::test]
    async fn test_renders_at_300_dpi() {
        let renderer = FakeRenderer::new(1);
        let seen_dpi = renderer.seen_dpi.clone();
        let strategy = OcrStrategy::new(Box::new(renderer), Box::new(FakeRecognizer { available: true }));

        strategy.extract(&source()).await;
        assert_eq!(*seen_dpi.lock().unwrap(), Some(300));
    }

    #[tokio::test]
    async fn test_missing_recognizer_halts() {
        let strategy = OcrStrategy::new(
            Box::new(FakeRenderer::new(1)),
            Box::new(FakeRecognizer { available: false }),
        );
        assert_eq!(strategy.extract(&source()).await, StageOutcome::Halt);
    }

    #[tokio::test]
    async fn test_render_failure_halts() {
        let mut renderer = FakeRenderer::new(1);
        renderer.fail = true;
        let strategy = OcrStrategy::new(Box::new(renderer), Box::new(FakeRecognizer { available: true }));
        assert_eq!(strategy.extract(&source()).await, StageOutcome::Halt);
    }
}
