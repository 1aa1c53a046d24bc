//! Page rendering with pdfium (enabled by the `pdfium` feature).
//!
//! Note: pdfium-render requires the pdfium library to be installed.
//! On macOS: brew install pdfium
//! On Linux: apt install libpdfium-dev

use async_trait::async_trait;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};

use super::{OcrError, PageRenderer};

/// Points per inch in PDF user space
const PDF_POINTS_PER_INCH: f32 = 72.0;

/// Renders pages in-process through the system pdfium library
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfiumRenderer;

#[async_trait]
impl PageRenderer for PdfiumRenderer {
    async fn render_pages(&self, pdf: &Path, dpi: u32, out_dir: &Path) -> Result<Vec<PathBuf>, OcrError> {
        let bindings = Pdfium::bind_to_system_library()
            .map_err(|e| OcrError::Render(format!("Failed to initialize pdfium: {}", e)))?;
        let pdfium = Pdfium::new(bindings);

        let document = pdfium
            .load_pdf_from_file(pdf, None)
            .map_err(|e| OcrError::Render(format!("Failed to load PDF: {}", e)))?;

        let config = PdfRenderConfig::new()
            .scale_page_by_factor(dpi as f32 / PDF_POINTS_PER_INCH)
            .render_form_data(true)
            .render_annotations(true);

        let mut pages = Vec::new();
        for (index, page) in document.pages().iter().enumerate() {
            let bitmap = page
                .render_with_config(&config)
                .map_err(|e| OcrError::Render(format!("Failed to render page {}: {}", index + 1, e)))?;

            let path = out_dir.join(format!("page-{:04}.png", index + 1));
            bitmap
                .as_image()
                .save(&path)
                .map_err(|e| OcrError::Render(format!("Failed to encode page {}: {}", index + 1, e)))?;
            pages.push(path);
        }

        Ok(pages)
    }
}
