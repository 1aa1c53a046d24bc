//! Logging setup.
//!
//! Every subcommand logs to the console, filtered by `RUST_LOG` (default
//! `info`). A sort run additionally writes a debug log into the inbox
//! (`file_sort_debug_YYYYMMDD_HHMMSS.log`) so runs launched from Shortcuts
//! can be inspected afterwards. That file is owned by a [`RunLog`] value:
//! its subscriber is installed for the lifetime of the value and the
//! completion banner is written when it is dropped, on every exit path.

use chrono::Local;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_FILTER: &str = "info";
const FILE_FILTER: &str = "info,file_sort_lib=debug";
const BANNER_RULE: &str =
    "================================================================================";

fn console_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn console_layer<S>() -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(io::stdout)
        .with_target(false)
        .with_filter(console_filter())
}

/// Install the process-wide console logger. Safe to call more than once.
pub fn init_console() {
    let _ = tracing_subscriber::registry().with(console_layer()).try_init();
}

/// `file_sort_debug_YYYYMMDD_HHMMSS.log`
pub fn debug_log_name() -> String {
    format!("file_sort_debug_{}.log", Local::now().format("%Y%m%d_%H%M%S"))
}

/// The debug log of one sort run
pub struct RunLog {
    path: PathBuf,
    started: Instant,
    _guard: DefaultGuard,
}

impl RunLog {
    /// Create a new debug log in `dir` and route this thread's events to it
    /// (and to the console) until the returned value is dropped.
    pub fn open(dir: &Path) -> io::Result<Self> {
        let path = dir.join(debug_log_name());
        let file = File::create(&path)?;

        let file_layer = fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(false)
            .with_filter(EnvFilter::new(FILE_FILTER));

        let subscriber = tracing_subscriber::registry()
            .with(console_layer())
            .with(file_layer);
        let guard = tracing::subscriber::set_default(subscriber);

        tracing::info!("=== File Sort Started at {} ===", Local::now().format("%Y-%m-%d %H:%M:%S"));
        tracing::info!("Log file: {}", path.display());
        tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
        if let Ok(cwd) = std::env::current_dir() {
            tracing::info!("Working directory: {}", cwd.display());
        }
        tracing::info!("{}", BANNER_RULE);

        Ok(Self {
            path,
            started: Instant::now(),
            _guard: guard,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLog {
    fn drop(&mut self) {
        tracing::info!("{}", BANNER_RULE);
        tracing::info!(
            "=== File Sort Completed at {} ({:.1}s) ===",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            self.started.elapsed().as_secs_f64()
        );
        tracing::info!("Debug log saved to: {}", self.path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_debug_log_name_format() {
        let name = debug_log_name();
        assert!(name.starts_with("file_sort_debug_"));
        assert!(name.ends_with(".log"));
        // file_sort_debug_ + YYYYMMDD_HHMMSS + .log
        assert_eq!(name.len(), "file_sort_debug_".len() + 15 + ".log".len());
    }

    #[test]
    fn test_run_log_captures_events_and_banners() {
        let dir = TempDir::new().unwrap();

        let path = {
            let log = RunLog::open(dir.path()).unwrap();
            tracing::info!("  [EXTRACT] hello from the run");
            tracing::debug!("  [ICLOUD] debug detail");
            log.path().to_path_buf()
        };

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("File Sort Started"));
        assert!(contents.contains("hello from the run"));
        assert!(contents.contains("debug detail"));
        assert!(contents.contains("File Sort Completed"));
        assert!(!contents.contains('\u{1b}'), "file log must not contain ANSI escapes");
    }

    #[test]
    fn test_events_after_drop_do_not_reach_file() {
        let dir = TempDir::new().unwrap();
        let log = RunLog::open(dir.path()).unwrap();
        let path = log.path().to_path_buf();
        drop(log);

        tracing::info!("after the run");

        assert!(!fs::read_to_string(&path).unwrap().contains("after the run"));
    }
}
