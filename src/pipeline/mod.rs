//! Run driver.
//!
//! Processes every PDF in the inbox, one at a time:
//! extract text, classify, name, rename in place, file.
//!
//! A failure on one document is logged and recorded in the [`RunSummary`];
//! it never stops the run.

mod outcome;

pub use outcome::{FileOutcome, RunSummary};

use chrono::{DateTime, Local, NaiveDate};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::assistant::{DocumentAssistant, ShortcutsAssistant};
use crate::availability::{AvailabilityPolicy, AvailabilityResolver};
use crate::config::Settings;
use crate::extraction::{Cascade, LopdfReader, OcrStrategy, PdfExtractReader, TextExtractor};
use crate::file_coordination;
use crate::filing::{self, AuditLog, Filer};
use crate::taxonomy::Taxonomy;

const RULE: &str = "================================================================================";

pub struct Pipeline {
    inbox: PathBuf,
    documents_base: PathBuf,
    extractor: TextExtractor,
    assistant: DocumentAssistant,
    filer: Filer,
}

impl Pipeline {
    pub fn new(
        inbox: PathBuf,
        documents_base: PathBuf,
        extractor: TextExtractor,
        assistant: DocumentAssistant,
    ) -> Self {
        let filer = Filer::new(AuditLog::in_dir(&inbox));
        Self {
            inbox,
            documents_base,
            extractor,
            assistant,
            filer,
        }
    }

    /// The production pipeline: platform cloud storage, the lopdf /
    /// pdf-extract / OCR cascade and the Shortcuts assistant.
    pub fn from_settings(settings: &Settings) -> Self {
        let resolver = AvailabilityResolver::with_scratch_dir(
            file_coordination::default_storage(),
            AvailabilityPolicy::default(),
            settings.scratch_dir.clone(),
        );
        let extractor = TextExtractor::new(resolver, default_cascade());
        let assistant = DocumentAssistant::new(Box::new(ShortcutsAssistant::new(
            settings.shortcut.clone(),
            settings.assistant_timeout,
        )));
        Self::new(
            settings.inbox.clone(),
            settings.documents_base.clone(),
            extractor,
            assistant,
        )
    }

    /// Process every PDF in the inbox
    pub async fn run(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        tracing::info!("Scan folder: {}", self.inbox.display());

        if !self.inbox.is_dir() {
            tracing::error!("ERROR: Folder does not exist: {}", self.inbox.display());
            summary.inbox_missing = true;
            return summary;
        }

        let files = inbox_pdfs(&self.inbox);
        if files.is_empty() {
            tracing::info!("No PDF files found in {}", self.inbox.display());
            return summary;
        }

        tracing::info!("Found {} PDF file(s) to process", files.len());
        for file in &files {
            tracing::info!("  - {}", file_name(file));
        }
        tracing::info!("CSV log file: {}", self.filer.audit_log().path().display());

        for file in files {
            tracing::info!("{}", RULE);
            tracing::info!("Processing: {}", file_name(&file));
            tracing::info!("Full path: {}", file.display());
            tracing::info!("{}", RULE);

            let outcome = self.process_file(&file).await;
            summary.record(file_name(&file), outcome);
        }

        summary.log();
        summary
    }

    /// Extract, classify, name and file one document
    pub async fn process_file(&self, path: &Path) -> FileOutcome {
        let original_name = file_name(path);

        tracing::info!("[1] Extracting text from PDF...");
        let extraction = self.extractor.extract_text(path).await;
        if extraction.is_empty() {
            tracing::warn!("WARNING: Could not extract text from {}, skipping...", original_name);
            return FileOutcome::NoText;
        }
        tracing::info!(
            "Extracted {} characters of text (via {})",
            extraction.char_count(),
            extraction.strategy.unwrap_or("unknown")
        );
        let text = extraction.text;

        if filing::is_manual_override(&original_name) {
            tracing::info!("[SKIP] File already follows yyyy-mm-dd - summary format, keeping its name");

            tracing::info!("[2] Classifying file category...");
            let Some(destination) = self.destination_for(&text).await else {
                tracing::error!("ERROR: Failed to get category classification, file will remain in inbox");
                return FileOutcome::Unclassified {
                    path: path.to_path_buf(),
                };
            };

            tracing::info!("[3] Moving file to destination...");
            return self.file(path, &destination, &original_name);
        }

        tracing::info!("[2] Getting file creation date...");
        let created = creation_date(path);
        tracing::info!("File created date: {}", created);

        tracing::info!("[3] Classifying file category...");
        let destination = self.destination_for(&text).await;
        if destination.is_none() {
            tracing::error!("ERROR: Failed to get category classification");
        }

        tracing::info!("[4] Generating filename...");
        let Some(suggested) = self.assistant.generate_filename(&text, created).await else {
            tracing::error!("ERROR: Failed to generate filename, skipping rename...");
            return FileOutcome::NoFilename;
        };
        let new_name = filing::clean_suggested_filename(&suggested);
        tracing::info!("Suggested filename: {}", new_name);

        let current = match filing::rename_in_place(path, &new_name) {
            Ok(outcome) => outcome.path().to_path_buf(),
            Err(e) => {
                tracing::error!("  [RENAME] ERROR: {}", e);
                path.to_path_buf()
            }
        };

        match destination {
            Some(destination) => {
                tracing::info!("[5] Moving file to destination...");
                self.file(&current, &destination, &original_name)
            }
            None => {
                tracing::info!("[5] No destination folder determined, file will remain in inbox");
                FileOutcome::Unclassified { path: current }
            }
        }
    }

    async fn destination_for(&self, text: &str) -> Option<PathBuf> {
        let classification = self.assistant.classify(text).await?;
        let destination = Taxonomy::global().resolve_destination(&self.documents_base, &classification);
        tracing::info!("Destination folder: {}", destination.display());
        Some(destination)
    }

    fn file(&self, path: &Path, destination: &Path, original_name: &str) -> FileOutcome {
        match self.filer.file_document(path, destination, original_name) {
            Ok(filed) => FileOutcome::Filed { path: filed },
            Err(e) => {
                tracing::error!("  [MOVE] ERROR: {}", e);
                FileOutcome::NotFiled {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// lopdf, then pdf-extract, then OCR
pub fn default_cascade() -> Cascade {
    Cascade::new(vec![
        Box::new(LopdfReader),
        Box::new(PdfExtractReader),
        Box::new(OcrStrategy::with_default_backends()),
    ])
}

/// PDFs directly inside `dir` (lowercase `.pdf` only), sorted by name
pub fn inbox_pdfs(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping unreadable inbox entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension() == Some(OsStr::new("pdf")))
        .collect()
}

/// The file's creation date, or today when the filesystem does not record one
pub fn creation_date(path: &Path) -> NaiveDate {
    match std::fs::metadata(path).and_then(|m| m.created()) {
        Ok(created) => DateTime::<Local>::from(created).date_naive(),
        Err(e) => {
            tracing::debug!("No creation date for {} ({}), using today", path.display(), e);
            Local::now().date_naive()
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::{Assistant, AssistantError};
    use crate::extraction::{ExtractionStrategy, PdfSource, StageOutcome};
    use crate::file_coordination::LocalDisk;
    use async_trait::async_trait;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Treats the file bytes as the document text
    struct PlainText;

    #[async_trait]
    impl ExtractionStrategy for PlainText {
        fn name(&self) -> &'static str {
            "plain"
        }

        async fn extract(&self, source: &PdfSource) -> StageOutcome {
            StageOutcome::Text(String::from_utf8_lossy(&source.bytes).to_string())
        }
    }

    /// Answers classification and filename prompts from fixed tables keyed
    /// by a marker word in the document text
    #[derive(Clone, Default)]
    struct ScriptedAssistant {
        answers: Arc<Mutex<Vec<(&'static str, Option<&'static str>, Option<&'static str>)>>>,
        calls: Arc<Mutex<usize>>,
    }

    impl ScriptedAssistant {
        fn answer(self, marker: &'static str, category: Option<&'static str>, filename: Option<&'static str>) -> Self {
            self.answers.lock().unwrap().push((marker, category, filename));
            self
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl Assistant for ScriptedAssistant {
        async fn ask(&self, prompt: &str) -> Result<String, AssistantError> {
            *self.calls.lock().unwrap() += 1;
            let is_classify = prompt.contains("=== MAIN CATEGORIES ===");
            let answers = self.answers.lock().unwrap();
            let (_, category, filename) = answers
                .iter()
                .find(|(marker, _, _)| prompt.contains(marker))
                .ok_or(AssistantError::Empty)?;
            let answer = if is_classify { category } else { filename };
            answer.map(str::to_string).ok_or(AssistantError::Empty)
        }
    }

    struct Fixture {
        inbox: TempDir,
        docs: TempDir,
        _scratch: TempDir,
        pipeline: Pipeline,
    }

    fn fixture(assistant: ScriptedAssistant) -> Fixture {
        let inbox = TempDir::new().unwrap();
        let docs = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let resolver = AvailabilityResolver::with_scratch_dir(
            Box::new(LocalDisk),
            AvailabilityPolicy::immediate(),
            scratch.path().to_path_buf(),
        );
        let extractor = TextExtractor::new(resolver, Cascade::new(vec![Box::new(PlainText)]));
        let pipeline = Pipeline::new(
            inbox.path().to_path_buf(),
            docs.path().to_path_buf(),
            extractor,
            DocumentAssistant::new(Box::new(assistant)),
        );
        Fixture {
            inbox,
            docs,
            _scratch: scratch,
            pipeline,
        }
    }

    fn text(marker: &str) -> String {
        format!("{marker}: this document has plenty of extractable text for the classifier to read.")
    }

    impl Fixture {
        fn put(&self, name: &str, contents: &str) -> PathBuf {
            let path = self.inbox.path().join(name);
            fs::write(&path, contents).unwrap();
            path
        }

        fn audit(&self) -> Vec<filing::FilingRecord> {
            self.pipeline.filer.audit_log().read_all().unwrap()
        }
    }

    #[tokio::test]
    async fn test_manual_override_is_filed_without_rename() {
        let assistant = ScriptedAssistant::default().answer("#dental", Some("Medical/Oliver"), Some("2025-09-09 - Wrong.pdf"));
        let f = fixture(assistant.clone());
        f.put("2025-01-01 - x.pdf", &text("#dental"));

        let summary = f.pipeline.run().await;

        let expected = f.docs.path().join("Medical/Oliver/2025-01-01 - x.pdf");
        assert!(expected.exists());
        assert_eq!(summary.filed(), 1);
        assert_eq!(assistant.calls(), 1, "no filename request for manual overrides");

        let audit = f.audit();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].old_filename, "2025-01-01 - x.pdf");
        assert_eq!(audit[0].new_filename, "2025-01-01 - x.pdf");
    }

    #[tokio::test]
    async fn test_document_without_text_stays_in_inbox() {
        let assistant = ScriptedAssistant::default();
        let f = fixture(assistant.clone());
        let scan = f.put("scan001.pdf", "   \n  ");

        let summary = f.pipeline.run().await;

        assert!(scan.exists());
        assert_eq!(summary.files, vec![("scan001.pdf".to_string(), FileOutcome::NoText)]);
        assert!(f.audit().is_empty());
        assert_eq!(assistant.calls(), 0);
    }

    #[tokio::test]
    async fn test_rename_then_file() {
        let assistant = ScriptedAssistant::default().answer(
            "#electric",
            Some("Financial/Bills/Electric"),
            Some("\"2025-01-15 - Electric Bill January\""),
        );
        let f = fixture(assistant);
        let scan = f.put("scan002.pdf", &text("#electric"));

        f.pipeline.run().await;

        let filed = f.docs.path().join("Financial/Bills/Electric/2025-01-15 - Electric Bill January.pdf");
        assert!(filed.exists());
        assert!(!scan.exists());

        let audit = f.audit();
        assert_eq!(audit[0].old_filename, "scan002.pdf");
        assert_eq!(audit[0].new_filename, "2025-01-15 - Electric Bill January.pdf");
    }

    #[tokio::test]
    async fn test_remapped_subfolder() {
        let assistant = ScriptedAssistant::default().answer(
            "#sams",
            Some("  'Financial/Cards/Sams Club'  "),
            Some("2025-03-01 - Sams Club Statement"),
        );
        let f = fixture(assistant);
        f.put("scan003.pdf", &text("#sams"));

        f.pipeline.run().await;

        assert!(f
            .docs
            .path()
            .join("Financial/Cards/Sam's Club/2025-03-01 - Sams Club Statement.pdf")
            .exists());
    }

    #[tokio::test]
    async fn test_classification_failure_keeps_renamed_file_in_inbox() {
        let assistant = ScriptedAssistant::default().answer("#mystery", None, Some("2025-04-04 - Mystery Letter"));
        let f = fixture(assistant);
        f.put("scan004.pdf", &text("#mystery"));

        let summary = f.pipeline.run().await;

        let renamed = f.inbox.path().join("2025-04-04 - Mystery Letter.pdf");
        assert!(renamed.exists());
        assert_eq!(summary.files[0].1, FileOutcome::Unclassified { path: renamed });
        assert!(f.audit().is_empty());
    }

    #[tokio::test]
    async fn test_filename_failure_leaves_file_untouched() {
        let assistant = ScriptedAssistant::default().answer("#recipe", Some("Recipes"), None);
        let f = fixture(assistant);
        let scan = f.put("scan005.pdf", &text("#recipe"));

        let summary = f.pipeline.run().await;

        assert!(scan.exists());
        assert_eq!(summary.files[0].1, FileOutcome::NoFilename);
    }

    #[tokio::test]
    async fn test_destination_collision_is_skipped_and_run_continues() {
        let assistant = ScriptedAssistant::default()
            .answer("#pie-one", Some("Recipes"), Some("2025-05-05 - Apple Pie"))
            .answer("#pie-two", Some("Recipes"), Some("2025-05-05 - Apple Pie"))
            .answer("#toll", Some("Financial/Tolls"), Some("2025-05-06 - Toll Statement"));
        let f = fixture(assistant);
        f.put("a.pdf", &text("#pie-one"));
        f.put("b.pdf", &text("#pie-two"));
        f.put("c.pdf", &text("#toll"));

        let summary = f.pipeline.run().await;

        // a.pdf is renamed and filed; b.pdf cannot take the same name in the
        // inbox once a.pdf has left, so it is renamed too and collides in Recipes
        assert_eq!(summary.total(), 3);
        assert_eq!(summary.filed(), 2);
        assert!(matches!(summary.files[1].1, FileOutcome::NotFiled { .. }));
        assert!(f.inbox.path().join("2025-05-05 - Apple Pie.pdf").exists());
        assert_eq!(
            fs::read_to_string(f.docs.path().join("Recipes/2025-05-05 - Apple Pie.pdf")).unwrap(),
            text("#pie-one")
        );
        assert!(f.docs.path().join("Financial/Tolls/2025-05-06 - Toll Statement.pdf").exists());
        assert_eq!(f.audit().len(), 2);
    }

    #[tokio::test]
    async fn test_second_run_is_a_no_op() {
        let assistant = ScriptedAssistant::default().answer("#car", Some("Cars/2022 Accord"), Some("2025-06-01 - Registration"));
        let f = fixture(assistant);
        f.put("scan006.pdf", &text("#car"));

        f.pipeline.run().await;
        let again = f.pipeline.run().await;

        assert_eq!(again.total(), 0);
        assert_eq!(f.audit().len(), 1);
        assert!(f.docs.path().join("Cars/2022 Accord/2025-06-01 - Registration.pdf").exists());
    }

    #[tokio::test]
    async fn test_missing_inbox() {
        let f = fixture(ScriptedAssistant::default());
        let missing = f.inbox.path().join("nope");
        let pipeline = Pipeline::new(
            missing,
            f.docs.path().to_path_buf(),
            TextExtractor::new(
                AvailabilityResolver::new(Box::new(LocalDisk), AvailabilityPolicy::immediate()),
                Cascade::new(vec![Box::new(PlainText)]),
            ),
            DocumentAssistant::new(Box::new(ScriptedAssistant::default())),
        );

        let summary = pipeline.run().await;
        assert!(summary.inbox_missing);
        assert_eq!(summary.total(), 0);
    }

    #[test]
    fn test_inbox_pdfs_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        for name in ["b.pdf", "a.pdf", "c.PDF", "notes.txt", "file_move_log.csv"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("sub.pdf")).unwrap();
        fs::write(dir.path().join("sub.pdf").join("nested.pdf"), b"x").unwrap();

        let names: Vec<String> = inbox_pdfs(dir.path()).iter().map(|p| file_name(p)).collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf"]);
    }

    #[test]
    fn test_creation_date_falls_back_to_today() {
        let today = Local::now().date_naive();
        let missing = creation_date(Path::new("/definitely/not/here.pdf"));
        assert_eq!(missing, today);
    }
}
