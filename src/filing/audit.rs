//! CSV audit log of every move.
//!
//! The newest record is always first, directly below the header, so the log
//! is rewritten in full on every append (temp file + rename).

use chrono::Local;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Audit file name inside the inbox
pub const AUDIT_FILENAME: &str = "file_move_log.csv";

pub const AUDIT_HEADER: [&str; 4] = ["DateTime", "Old Filename", "New Filename", "Destination"];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit log I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("audit log CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// One row of the audit log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilingRecord {
    pub timestamp: String,
    pub old_filename: String,
    pub new_filename: String,
    pub destination: String,
}

impl FilingRecord {
    /// A record stamped with the current local time
    pub fn now(old_filename: &str, new_filename: &str, destination: &Path) -> Self {
        Self {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            old_filename: old_filename.to_string(),
            new_filename: new_filename.to_string(),
            destination: destination.to_string_lossy().to_string(),
        }
    }

    fn from_row(row: &StringRecord) -> Self {
        let field = |i: usize| row.get(i).unwrap_or_default().to_string();
        Self {
            timestamp: field(0),
            old_filename: field(1),
            new_filename: field(2),
            destination: field(3),
        }
    }

    fn to_row(&self) -> StringRecord {
        StringRecord::from(vec![
            self.timestamp.as_str(),
            self.old_filename.as_str(),
            self.new_filename.as_str(),
            self.destination.as_str(),
        ])
    }
}

#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The audit log kept in `inbox`
    pub fn in_dir(inbox: &Path) -> Self {
        Self::new(inbox.join(AUDIT_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Existing rows without the header. A first row that is not the header
    /// is kept as data.
    fn read_rows(&self) -> Result<Vec<StringRecord>, AuditError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)?;

        let mut rows = Vec::new();
        for (i, row) in reader.records().enumerate() {
            let row = row?;
            if i == 0 && row.iter().eq(AUDIT_HEADER.iter().copied()) {
                continue;
            }
            rows.push(row);
        }
        Ok(rows)
    }

    /// All records, newest first
    pub fn read_all(&self) -> Result<Vec<FilingRecord>, AuditError> {
        Ok(self.read_rows()?.iter().map(FilingRecord::from_row).collect())
    }

    /// Insert `record` directly below the header
    pub fn append(&self, record: &FilingRecord) -> Result<(), AuditError> {
        let existing = self.read_rows()?;

        let temp_path = self.path.with_extension("csv.tmp");
        let mut writer = WriterBuilder::new()
            .flexible(true)
            .from_writer(File::create(&temp_path)?);

        writer.write_record(AUDIT_HEADER)?;
        writer.write_record(&record.to_row())?;
        for row in &existing {
            writer.write_record(row)?;
        }
        writer.flush()?;

        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, &self.path)?;

        tracing::info!(
            "  [AUDIT] Logged move: {} -> {} ({} earlier entries)",
            record.old_filename,
            record.new_filename,
            existing.len()
        );
        Ok(())
    }
}
