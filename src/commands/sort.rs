use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;

use crate::config::Settings;
use crate::logging::RunLog;
use crate::pipeline::{Pipeline, RunSummary};

/// Run the pipeline over the inbox with a per-run debug log.
///
/// A panic anywhere in the run is caught and logged as fatal; the debug log
/// is still completed and closed.
pub async fn sort(settings: &Settings) -> RunSummary {
    let run_log = match RunLog::open(&settings.inbox) {
        Ok(log) => Some(log),
        Err(e) => {
            tracing::error!(
                "ERROR: Could not create log file in {}: {}",
                settings.inbox.display(),
                e
            );
            None
        }
    };

    let pipeline = Pipeline::from_settings(settings);
    let summary = match AssertUnwindSafe(pipeline.run()).catch_unwind().await {
        Ok(summary) => summary,
        Err(panic) => {
            tracing::error!("FATAL ERROR: {}", panic_message(panic.as_ref()));
            RunSummary::default()
        }
    };

    drop(run_log);
    summary
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
