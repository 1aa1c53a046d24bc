//! Page rendering with poppler's `pdftoppm`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{OcrError, PageRenderer};
use crate::process::{locate_tool, run_command, POPPLER_BIN_DIRS};

/// Upper bound for rendering a whole document
const RENDER_TIMEOUT: Duration = Duration::from_secs(300);

/// Output file prefix inside the scratch directory
const PAGE_PREFIX: &str = "page";

/// Renders pages to PNG with `pdftoppm`
#[derive(Debug, Clone)]
pub struct PopplerRenderer {
    binary: PathBuf,
}

impl PopplerRenderer {
    /// Find `pdftoppm` in the Homebrew poppler kegs, then on PATH, else rely
    /// on the bare command name.
    pub fn locate() -> Self {
        let binary = match locate_tool("pdftoppm", POPPLER_BIN_DIRS) {
            Some(path) => {
                tracing::debug!("  [EXTRACT] Found poppler at: {}", path.display());
                path
            }
            None => {
                tracing::warn!("  [EXTRACT] WARNING: Poppler path not found, trying default...");
                PathBuf::from("pdftoppm")
            }
        };
        Self { binary }
    }

    pub fn with_binary(binary: PathBuf) -> Self {
        Self { binary }
    }
}

#[async_trait]
impl PageRenderer for PopplerRenderer {
    async fn render_pages(&self, pdf: &Path, dpi: u32, out_dir: &Path) -> Result<Vec<PathBuf>, OcrError> {
        let dpi = dpi.to_string();
        let prefix = out_dir.join(PAGE_PREFIX);
        let args = [
            std::ffi::OsStr::new("-r"),
            std::ffi::OsStr::new(&dpi),
            std::ffi::OsStr::new("-png"),
            pdf.as_os_str(),
            prefix.as_os_str(),
        ];

        let output = run_command(&self.binary, args, None, RENDER_TIMEOUT).await?;
        if !output.status.success() {
            return Err(OcrError::Render(format!(
                "pdftoppm exited with {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        rendered_pages(out_dir)
    }
}

/// Collect `page-N.png` files in page order.
/// pdftoppm zero-pads page numbers to a common width, so name order is page order.
fn rendered_pages(out_dir: &Path) -> Result<Vec<PathBuf>, OcrError> {
    let mut pages: Vec<PathBuf> = std::fs::read_dir(out_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            let is_png = path.extension().and_then(|e| e.to_str()) == Some("png");
            let is_page = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(PAGE_PREFIX))
                .unwrap_or(false);
            is_png && is_page
        })
        .collect();
    pages.sort();
    Ok(pages)
}
