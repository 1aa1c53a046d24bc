//! File coordination with the operating system's file providers.
//!
//! Documents live in iCloud Drive, so two things need the OS's cooperation:
//! - `CloudStorage`: checking whether a file's bytes are local and asking the
//!   provider to download them before we read
//! - `notify_file_placed`: nudging Finder/iCloud after a document lands in its
//!   destination folder

use async_trait::async_trait;
use filetime::{set_file_mtime, FileTime};
use std::path::Path;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "macos")]
pub use macos::ICloudDrive;

/// A storage provider that may keep file contents remotely until requested.
#[async_trait]
pub trait CloudStorage: Send + Sync {
    /// Whether the file's bytes are present locally.
    /// Implementations answer `true` when they cannot tell.
    async fn is_downloaded(&self, path: &Path) -> bool;

    /// Ask the provider to start materializing the file. Does not wait for
    /// the download to finish; failures are only logged.
    async fn request_download(&self, path: &Path);
}

/// Plain local disk: everything is already downloaded.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalDisk;

#[async_trait]
impl CloudStorage for LocalDisk {
    async fn is_downloaded(&self, _path: &Path) -> bool {
        true
    }

    async fn request_download(&self, _path: &Path) {}
}

/// The storage provider for the current platform
pub fn default_storage() -> Box<dyn CloudStorage> {
    #[cfg(target_os = "macos")]
    {
        Box::new(ICloudDrive::default())
    }
    #[cfg(not(target_os = "macos"))]
    {
        Box::new(LocalDisk)
    }
}

/// Notify the system that a file was placed into a folder.
///
/// Bumps the parent directory's mtime so FSEvents fires and Finder/iCloud
/// pick up the new entry. The document itself is left untouched so its own
/// timestamps survive the move.
pub fn notify_file_placed(path: &Path) -> std::io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    set_file_mtime(parent, FileTime::now())
}
