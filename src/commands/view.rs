//! `file-sort view`: show what the extraction cascade sees.

use std::path::{Path, PathBuf};

use super::CommandError;
use crate::availability::{AvailabilityPolicy, AvailabilityResolver};
use crate::config::Settings;
use crate::extraction::TextExtractor;
use crate::file_coordination;
use crate::pipeline::{default_cascade, inbox_pdfs};

const RULE: &str = "================================================================================";
const THIN_RULE: &str = "--------------------------------------------------------------------------------";

/// Print the extracted text of `path` (a PDF or a folder of PDFs; the inbox
/// when `None`). With `save`, also write `<name>.txt` next to each PDF.
pub async fn view(settings: &Settings, path: Option<PathBuf>, save: bool) -> Result<(), CommandError> {
    let (folder, files) = targets(path.as_deref().unwrap_or(&settings.inbox))?;
    if files.is_empty() {
        println!("No PDF files found in {}", folder.display());
        return Ok(());
    }
    println!("Found {} PDF file(s) to process\n", files.len());

    let extractor = TextExtractor::new(
        AvailabilityResolver::with_scratch_dir(
            file_coordination::default_storage(),
            AvailabilityPolicy::default(),
            settings.scratch_dir.clone(),
        ),
        default_cascade(),
    );

    for file in files {
        println!("{RULE}");
        println!("File: {}", file.file_name().unwrap_or_default().to_string_lossy());
        println!("{RULE}");

        let result = extractor.extract_text(&file).await;
        if let Some(strategy) = result.strategy {
            println!("Extraction method: {}", strategy);
        }
        if result.is_empty() {
            println!("\n[NO TEXT EXTRACTED]\n");
            continue;
        }

        println!("\nExtracted {} characters of text\n", result.char_count());
        println!("{THIN_RULE}");
        println!("EXTRACTED TEXT:");
        println!("{THIN_RULE}");
        println!("{}", result.text);
        println!("{THIN_RULE}\n");

        if save {
            let output = file.with_extension("txt");
            std::fs::write(&output, &result.text)?;
            println!("Saved to: {}\n", output.display());
        }
    }

    Ok(())
}

/// The folder being viewed and the PDFs in it
fn targets(path: &Path) -> Result<(PathBuf, Vec<PathBuf>), CommandError> {
    if path.is_dir() {
        return Ok((path.to_path_buf(), inbox_pdfs(path)));
    }

    let is_pdf = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if path.is_file() && is_pdf {
        let folder = path.parent().map(Path::to_path_buf).unwrap_or_default();
        return Ok((folder, vec![path.to_path_buf()]));
    }

    Err(CommandError::NotPdf(path.to_path_buf()))
}
