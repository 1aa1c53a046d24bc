//! Child process helpers.
//!
//! Every external tool the pipeline touches (the assistant shortcut, the
//! iCloud helpers, poppler and tesseract) is launched through [`run_command`],
//! which enforces a timeout and kills the child when it expires.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Homebrew binary directories (Apple Silicon, Intel).
/// Shortcuts launches scripts with a minimal PATH that lacks these.
pub const HOMEBREW_BIN_DIRS: &[&str] = &["/opt/homebrew/bin", "/usr/local/bin"];

/// Poppler keg directories, checked before PATH when locating `pdftoppm`.
pub const POPPLER_BIN_DIRS: &[&str] = &["/opt/homebrew/opt/poppler/bin", "/usr/local/opt/poppler/bin"];

/// Error type for child process execution
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} timed out after {}s", .timeout.as_secs())]
    Timeout { program: String, timeout: Duration },
    #[error("I/O error talking to {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// PATH for child processes: Homebrew and poppler directories that exist on
/// this machine, followed by the inherited PATH.
pub fn extended_path() -> OsString {
    let inherited = std::env::var_os("PATH").unwrap_or_default();
    let current: Vec<PathBuf> = std::env::split_paths(&inherited).collect();

    let mut dirs: Vec<PathBuf> = HOMEBREW_BIN_DIRS
        .iter()
        .chain(POPPLER_BIN_DIRS.iter())
        .map(PathBuf::from)
        .filter(|dir| dir.is_dir() && !current.contains(dir))
        .collect();
    dirs.extend(current);

    std::env::join_paths(dirs).unwrap_or(inherited)
}

/// Locate an executable: first in `known_dirs`, then on the (extended) PATH.
/// Returns `None` when nothing is found; callers fall back to the bare name.
pub fn locate_tool(name: &str, known_dirs: &[&str]) -> Option<PathBuf> {
    if let Some(found) = known_dirs
        .iter()
        .map(|dir| Path::new(dir).join(name))
        .find(|candidate| candidate.is_file())
    {
        tracing::debug!("[Tools] Found {} at known location {}", name, found.display());
        return Some(found);
    }

    let found = std::env::split_paths(&extended_path())
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file());

    match &found {
        Some(path) => tracing::debug!("[Tools] Found {} on PATH: {}", name, path.display()),
        None => tracing::debug!("[Tools] {} not found in known locations or PATH", name),
    }
    found
}

/// Run a program to completion, optionally feeding `stdin`, and capture its
/// output. The child is killed if it outlives `timeout`.
///
/// A non-zero exit status is not an error here; callers inspect
/// `Output::status` because each tool reports failure differently.
pub async fn run_command<I, S>(
    program: impl AsRef<OsStr>,
    args: I,
    stdin: Option<&[u8]>,
    timeout: Duration,
) -> Result<Output, ProcessError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let program = program.as_ref();
    let name = program.to_string_lossy().to_string();

    let mut command = Command::new(program);
    command
        .args(args)
        .env("PATH", extended_path())
        .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command.spawn().map_err(|source| ProcessError::Spawn {
        program: name.clone(),
        source,
    })?;

    let stdin_pipe = child.stdin.take();
    let run = async {
        if let (Some(mut pipe), Some(input)) = (stdin_pipe, stdin) {
            match pipe.write_all(input).await {
                Ok(()) => {}
                // The child exited without reading everything; its status tells the story.
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Err(e) => return Err(e),
            }
            // Dropping the pipe closes stdin so the child sees EOF.
        }
        child.wait_with_output().await
    };

    match tokio::time::timeout(timeout, run).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => Err(ProcessError::Io { program: name, source }),
        // The child is dropped with the future and killed via kill_on_drop.
        Err(_) => Err(ProcessError::Timeout { program: name, timeout }),
    }
}
