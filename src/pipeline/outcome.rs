use std::path::PathBuf;

/// What happened to one inbox document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Moved into the taxonomy
    Filed { path: PathBuf },
    /// No text could be extracted; left untouched
    NoText,
    /// Classification failed; the (possibly renamed) file stays in the inbox
    Unclassified { path: PathBuf },
    /// No filename could be generated; left untouched
    NoFilename,
    /// A destination was chosen but the move did not happen
    NotFiled { path: PathBuf, reason: String },
}

impl FileOutcome {
    pub fn is_filed(&self) -> bool {
        matches!(self, FileOutcome::Filed { .. })
    }

    /// Short label for the run summary
    pub fn label(&self) -> &'static str {
        match self {
            FileOutcome::Filed { .. } => "filed",
            FileOutcome::NoText => "no text",
            FileOutcome::Unclassified { .. } => "unclassified",
            FileOutcome::NoFilename => "no filename",
            FileOutcome::NotFiled { .. } => "not filed",
        }
    }
}

/// Per-run tally
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// The inbox did not exist; nothing was processed
    pub inbox_missing: bool,
    /// `(original file name, outcome)` in processing order
    pub files: Vec<(String, FileOutcome)>,
}

impl RunSummary {
    pub fn record(&mut self, name: String, outcome: FileOutcome) {
        self.files.push((name, outcome));
    }

    pub fn total(&self) -> usize {
        self.files.len()
    }

    pub fn filed(&self) -> usize {
        self.files.iter().filter(|(_, o)| o.is_filed()).count()
    }

    /// Documents still needing attention
    pub fn left_in_inbox(&self) -> usize {
        self.total() - self.filed()
    }

    pub fn log(&self) {
        tracing::info!(
            "Summary: {} file(s) processed, {} filed, {} left in inbox",
            self.total(),
            self.filed(),
            self.left_in_inbox()
        );
        for (name, outcome) in self.files.iter().filter(|(_, o)| !o.is_filed()) {
            tracing::info!("  - {}: {}", name, outcome.label());
        }
    }
}
