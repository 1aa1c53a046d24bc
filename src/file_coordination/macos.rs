//! iCloud Drive coordination for macOS.
//!
//! Strategies used:
//! 1. `xattr -l` - files still in the cloud carry `com.apple.icloud*` download attributes
//! 2. `brctl download` - asks the bird daemon to materialize the file

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use super::CloudStorage;
use crate::process::run_command;

/// Timeout for the extended-attribute probe
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for the download request
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(15);

/// iCloud Drive, driven through the macOS command line tools
#[derive(Debug, Clone)]
pub struct ICloudDrive {
    probe_timeout: Duration,
    download_timeout: Duration,
}

impl Default for ICloudDrive {
    fn default() -> Self {
        Self {
            probe_timeout: PROBE_TIMEOUT,
            download_timeout: DOWNLOAD_TIMEOUT,
        }
    }
}

#[async_trait]
impl CloudStorage for ICloudDrive {
    async fn is_downloaded(&self, path: &Path) -> bool {
        match run_command("xattr", [std::ffi::OsStr::new("-l"), path.as_os_str()], None, self.probe_timeout).await {
            Ok(output) => {
                let attrs = String::from_utf8_lossy(&output.stdout).to_lowercase();
                !(attrs.contains("com.apple.icloud") && attrs.contains("download"))
            }
            Err(e) => {
                tracing::debug!("[ICLOUD] xattr probe failed ({}), assuming downloaded", e);
                true
            }
        }
    }

    async fn request_download(&self, path: &Path) {
        tracing::info!("  [ICLOUD] Attempting to force download using brctl...");
        match run_command(
            "brctl",
            [std::ffi::OsStr::new("download"), path.as_os_str()],
            None,
            self.download_timeout,
        )
        .await
        {
            Ok(output) if output.status.success() => {
                tracing::info!("  [ICLOUD] brctl download command executed successfully");
            }
            Ok(output) => {
                tracing::info!(
                    "  [ICLOUD] brctl returned code {:?}: {}",
                    output.status.code(),
                    String::from_utf8_lossy(&output.stderr).trim()
                );
            }
            Err(e) => {
                tracing::info!("  [ICLOUD] brctl error: {}", e);
            }
        }
    }
}
