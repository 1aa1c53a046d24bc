//! `file-sort history`: print the audit log.

use super::CommandError;
use crate::config::Settings;
use crate::filing::{AuditLog, FilingRecord};

/// Print audit records newest first, as a table or as JSON
pub fn history(settings: &Settings, limit: Option<usize>, json: bool) -> Result<(), CommandError> {
    let log = AuditLog::new(settings.audit_log_path());
    let records = select(log.read_all()?, limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No filed documents recorded in {}", log.path().display());
        return Ok(());
    }

    for line in records.iter().map(format_record) {
        println!("{}", line);
    }
    Ok(())
}

fn select(mut records: Vec<FilingRecord>, limit: Option<usize>) -> Vec<FilingRecord> {
    if let Some(limit) = limit {
        records.truncate(limit);
    }
    records
}

fn format_record(record: &FilingRecord) -> String {
    let name = if record.old_filename == record.new_filename {
        record.new_filename.clone()
    } else {
        format!("{} -> {}", record.old_filename, record.new_filename)
    };
    format!("{}  {}\n    {}", record.timestamp, name, record.destination)
}
