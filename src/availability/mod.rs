//! Availability resolution for cloud-synced documents.
//!
//! Files in iCloud Drive can be "dataless": the directory entry exists but the
//! bytes are still remote. Reading such a file too early fails or stalls, so
//! before extraction every document goes through [`AvailabilityResolver`]:
//!
//! 1. Probe the provider and request a download (best effort)
//! 2. Copy to a fresh scratch file, which forces the provider to materialize it
//! 3. Re-read the original; fall back to the scratch copy if it is still unreadable
//! 4. Last resort: chunked direct reads of the original with exponential backoff
//!
//! Scratch files get a unique name per attempt, so a leftover from an earlier
//! run (or another document with the same name) is never mistaken for a copy.
//!
//! Nothing in here returns an error: every failure is logged and the next
//! strategy is tried. Only total exhaustion yields [`Availability::Unavailable`].

mod scratch;

pub use scratch::ScratchCopy;

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::file_coordination::CloudStorage;

/// Chunk size for direct reads (1 MiB)
const READ_CHUNK_SIZE: usize = 1024 * 1024;

/// Bytes read from the original to confirm it became readable
const PROBE_READ_SIZE: usize = 1024;

/// Retry budget and delays for the resolver
#[derive(Debug, Clone)]
pub struct AvailabilityPolicy {
    /// Wait after the download request before the first copy attempt
    pub settle_delay: Duration,
    /// Scratch copy attempts
    pub copy_attempts: u32,
    /// Fixed delay between scratch copy attempts
    pub copy_retry_delay: Duration,
    /// Wait after a good scratch copy before re-reading the original
    pub reread_delay: Duration,
    /// Direct read attempts in the final fallback
    pub read_attempts: u32,
    /// First backoff delay for direct reads; doubles on every failure
    pub read_backoff_base: Duration,
}

impl Default for AvailabilityPolicy {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(2),
            copy_attempts: 5,
            copy_retry_delay: Duration::from_secs(2),
            reread_delay: Duration::from_secs(1),
            read_attempts: 5,
            read_backoff_base: Duration::from_secs(2),
        }
    }
}

impl AvailabilityPolicy {
    /// Same attempt counts with every delay set to zero (tests, local disks)
    pub fn immediate() -> Self {
        Self {
            settle_delay: Duration::ZERO,
            copy_retry_delay: Duration::ZERO,
            reread_delay: Duration::ZERO,
            read_backoff_base: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Backoff before direct read attempt `attempt + 1` (0-based `attempt`)
    fn read_backoff(&self, attempt: u32) -> Duration {
        self.read_backoff_base.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// The file operations the resolver performs on documents
pub trait FileAccess: Send + Sync {
    /// Copy `from` over the existing file `to`, returning the bytes copied
    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64>;

    /// Read the first KiB of `path`
    fn probe_read(&self, path: &Path) -> io::Result<()>;

    /// Read all of `path` in chunks, returning the byte count
    fn read_all(&self, path: &Path) -> io::Result<u64>;
}

/// Plain `std::fs` access
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectAccess;

impl FileAccess for DirectAccess {
    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
        fs::copy(from, to)
    }

    fn probe_read(&self, path: &Path) -> io::Result<()> {
        probe_read(path)
    }

    fn read_all(&self, path: &Path) -> io::Result<u64> {
        read_in_chunks(path)
    }
}

/// Outcome of availability resolution
#[derive(Debug)]
pub enum Availability {
    /// The original path is readable
    Original(PathBuf),
    /// Only a scratch copy is readable; it is deleted when dropped
    Scratch(ScratchCopy),
    /// Nothing readable could be produced
    Unavailable,
}

impl Availability {
    /// Path to read from, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            Availability::Original(path) => Some(path),
            Availability::Scratch(copy) => Some(copy.path()),
            Availability::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, Availability::Unavailable)
    }
}

/// Makes cloud-backed files locally readable before processing
pub struct AvailabilityResolver {
    storage: Box<dyn CloudStorage>,
    files: Box<dyn FileAccess>,
    policy: AvailabilityPolicy,
    scratch_dir: PathBuf,
}

impl AvailabilityResolver {
    /// Create a resolver using the system temp directory for scratch copies
    pub fn new(storage: Box<dyn CloudStorage>, policy: AvailabilityPolicy) -> Self {
        Self::with_scratch_dir(storage, policy, std::env::temp_dir())
    }

    /// Create a resolver with a custom scratch directory
    pub fn with_scratch_dir(
        storage: Box<dyn CloudStorage>,
        policy: AvailabilityPolicy,
        scratch_dir: PathBuf,
    ) -> Self {
        Self {
            storage,
            files: Box::new(DirectAccess),
            policy,
            scratch_dir,
        }
    }

    /// Replace the file operations (used by tests to script failures)
    pub fn with_file_access(mut self, files: Box<dyn FileAccess>) -> Self {
        self.files = files;
        self
    }

    /// Ensure `path` can be read, materializing it if necessary.
    pub async fn ensure_available(&self, path: &Path) -> Availability {
        tracing::info!("  [ICLOUD] Ensuring file is downloaded from iCloud...");

        if self.storage.is_downloaded(path).await {
            tracing::info!("  [ICLOUD] File appears to be already downloaded");
        } else {
            tracing::info!("  [ICLOUD] File needs to be downloaded from iCloud");
        }

        self.storage.request_download(path).await;
        sleep(self.policy.settle_delay).await;

        if let Some(availability) = self.resolve_via_scratch_copy(path).await {
            return availability;
        }

        self.resolve_via_direct_read(path).await
    }

    /// Copy to scratch as a forcing function for materialization.
    /// Returns `None` when no non-empty copy could be produced.
    async fn resolve_via_scratch_copy(&self, path: &Path) -> Option<Availability> {
        tracing::info!("  [ICLOUD] Attempting to copy file to temp location to force download...");

        let scratch = match self.create_scratch(path) {
            Ok(scratch) => scratch,
            Err(e) => {
                tracing::info!(
                    "  [ICLOUD] Could not create temp file in {}: {}",
                    self.scratch_dir.display(),
                    e
                );
                return None;
            }
        };

        let mut copied = false;
        for attempt in 1..=self.policy.copy_attempts {
            match self.files.copy(path, scratch.path()) {
                Ok(bytes) => {
                    tracing::info!(
                        "  [ICLOUD] File copied to temp location successfully ({} bytes)",
                        bytes
                    );
                    copied = true;
                    break;
                }
                Err(e) if attempt < self.policy.copy_attempts => {
                    tracing::info!(
                        "  [ICLOUD] Copy attempt {} failed: {}, waiting and retrying...",
                        attempt,
                        e
                    );
                    sleep(self.policy.copy_retry_delay).await;
                }
                Err(e) => {
                    tracing::info!("  [ICLOUD] All copy attempts failed: {}", e);
                }
            }
        }

        // Dropping `scratch` on any early return removes the file we created
        if !copied {
            return None;
        }

        let scratch_size = fs::metadata(scratch.path()).map(|m| m.len()).unwrap_or(0);
        if scratch_size == 0 {
            tracing::info!("  [ICLOUD] Temp file verification failed");
            return None;
        }
        tracing::info!("  [ICLOUD] Temp file verified: {} bytes", scratch_size);

        sleep(self.policy.reread_delay).await;

        match self.files.probe_read(path) {
            Ok(()) => {
                tracing::info!("  [ICLOUD] Original file is now readable");
                drop(scratch);
                Some(Availability::Original(path.to_path_buf()))
            }
            Err(e) => {
                tracing::info!("  [ICLOUD] Original file still not readable: {}", e);
                tracing::info!("  [ICLOUD] Will use temp file for processing");
                Some(Availability::Scratch(scratch))
            }
        }
    }

    /// A new, empty, uniquely named file in the scratch directory
    fn create_scratch(&self, path: &Path) -> io::Result<ScratchCopy> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "document.pdf".to_string());
        let suffix = format!("_{}", name);

        let scratch_path = tempfile::Builder::new()
            .prefix("icloud_download_")
            .suffix(&suffix)
            .tempfile_in(&self.scratch_dir)?
            .into_temp_path()
            .keep()
            .map_err(|e| e.error)?;
        Ok(ScratchCopy::new(scratch_path))
    }

    /// Final fallback: read the whole original in chunks with exponential backoff.
    async fn resolve_via_direct_read(&self, path: &Path) -> Availability {
        tracing::info!("  [ICLOUD] Attempting direct file read...");

        for attempt in 0..self.policy.read_attempts {
            match self.files.read_all(path) {
                Ok(0) => {
                    tracing::warn!("  [ICLOUD] WARNING: File exists but is 0 bytes");
                    return Availability::Unavailable;
                }
                Ok(bytes) => {
                    tracing::info!("  [ICLOUD] File read successfully ({} bytes)", bytes);
                    return Availability::Original(path.to_path_buf());
                }
                Err(e) if attempt + 1 < self.policy.read_attempts => {
                    let wait = self.policy.read_backoff(attempt);
                    tracing::info!(
                        "  [ICLOUD] Attempt {} failed: {}, waiting {:?}...",
                        attempt + 1,
                        e,
                        wait
                    );
                    sleep(wait).await;
                }
                Err(e) => {
                    tracing::error!(
                        "  [ICLOUD] ERROR reading file {}: {} ({:?})",
                        path.display(),
                        e,
                        e.kind()
                    );
                }
            }
        }

        tracing::error!("  [ICLOUD] All read attempts failed for {}", path.display());
        Availability::Unavailable
    }
}

async fn sleep(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

/// Read the first KiB of a file
fn probe_read(path: &Path) -> io::Result<()> {
    let mut file = File::open(path)?;
    let mut buf = [0u8; PROBE_READ_SIZE];
    file.read(&mut buf)?;
    Ok(())
}

/// Read a whole file in fixed-size chunks, returning the byte count
fn read_in_chunks(path: &Path) -> io::Result<u64> {
    let mut file = File::open(path)?;
    let mut buf = vec![0u8; READ_CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            return Ok(total);
        }
        total += n as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_coordination::LocalDisk;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn resolver(scratch: &TempDir) -> AvailabilityResolver {
        AvailabilityResolver::with_scratch_dir(
            Box::new(LocalDisk),
            AvailabilityPolicy::immediate(),
            scratch.path().to_path_buf(),
        )
    }

    fn scratch_entries(scratch: &TempDir) -> usize {
        fs::read_dir(scratch.path()).unwrap().count()
    }

    #[tokio::test]
    async fn test_readable_file_resolves_to_original() {
        let inbox = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let doc = inbox.path().join("scan.pdf");
        fs::write(&doc, b"%PDF-1.4 some bytes").unwrap();

        let availability = resolver(&scratch).ensure_available(&doc).await;

        match availability {
            Availability::Original(path) => assert_eq!(path, doc),
            other => panic!("expected original, got {:?}", other),
        }
        // Scratch copy cleaned up once the original proved readable
        assert_eq!(scratch_entries(&scratch), 0);
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let inbox = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();

        let availability = resolver(&scratch)
            .ensure_available(&inbox.path().join("gone.pdf"))
            .await;

        assert!(!availability.is_available());
        assert!(availability.path().is_none());
        assert_eq!(scratch_entries(&scratch), 0);
    }

    #[tokio::test]
    async fn test_empty_file_is_unavailable() {
        let inbox = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let doc = inbox.path().join("empty.pdf");
        fs::write(&doc, b"").unwrap();

        let availability = resolver(&scratch).ensure_available(&doc).await;

        assert!(matches!(availability, Availability::Unavailable));
        assert_eq!(scratch_entries(&scratch), 0);
    }

    struct CountingStorage {
        probes: Arc<AtomicUsize>,
        requests: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CloudStorage for CountingStorage {
        async fn is_downloaded(&self, _path: &Path) -> bool {
            self.probes.fetch_add(1, Ordering::SeqCst);
            false
        }

        async fn request_download(&self, _path: &Path) {
            self.requests.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_probes_and_requests_download_once() {
        let inbox = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let doc = inbox.path().join("cloud.pdf");
        fs::write(&doc, b"%PDF-1.4").unwrap();

        let probes = Arc::new(AtomicUsize::new(0));
        let requests = Arc::new(AtomicUsize::new(0));
        let resolver = AvailabilityResolver::with_scratch_dir(
            Box::new(CountingStorage {
                probes: probes.clone(),
                requests: requests.clone(),
            }),
            AvailabilityPolicy::immediate(),
            scratch.path().to_path_buf(),
        );

        assert!(resolver.ensure_available(&doc).await.is_available());
        assert_eq!(probes.load(Ordering::SeqCst), 1);
        assert_eq!(requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_leftover_scratch_file_is_never_used() {
        let inbox = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        // A directory can be neither copied nor read
        let doc = inbox.path().join("scan001.pdf");
        fs::create_dir(&doc).unwrap();
        let leftover = scratch.path().join("icloud_download_scan001.pdf");
        fs::write(&leftover, b"%PDF old unrelated document").unwrap();

        let availability = resolver(&scratch).ensure_available(&doc).await;

        assert!(matches!(availability, Availability::Unavailable));
        // Another run's file is left alone; ours is gone
        assert_eq!(fs::read(&leftover).unwrap(), b"%PDF old unrelated document");
        assert_eq!(scratch_entries(&scratch), 1);
    }

    /// File access with scripted successes and failures
    struct ScriptedFiles {
        copy_ok: bool,
        original_readable: bool,
        read_ok: bool,
        copies: Arc<AtomicUsize>,
    }

    impl ScriptedFiles {
        fn new(copy_ok: bool, original_readable: bool, read_ok: bool) -> (Self, Arc<AtomicUsize>) {
            let copies = Arc::new(AtomicUsize::new(0));
            let files = Self {
                copy_ok,
                original_readable,
                read_ok,
                copies: copies.clone(),
            };
            (files, copies)
        }
    }

    fn unavailable() -> io::Error {
        io::Error::from(io::ErrorKind::TimedOut)
    }

    impl FileAccess for ScriptedFiles {
        fn copy(&self, _from: &Path, to: &Path) -> io::Result<u64> {
            self.copies.fetch_add(1, Ordering::SeqCst);
            if !self.copy_ok {
                return Err(unavailable());
            }
            fs::write(to, b"%PDF-1.4 materialized")?;
            Ok(21)
        }

        fn probe_read(&self, _path: &Path) -> io::Result<()> {
            if self.original_readable {
                Ok(())
            } else {
                Err(unavailable())
            }
        }

        fn read_all(&self, _path: &Path) -> io::Result<u64> {
            if self.read_ok {
                Ok(2048)
            } else {
                Err(unavailable())
            }
        }
    }

    fn scripted(scratch: &TempDir, files: ScriptedFiles) -> AvailabilityResolver {
        resolver(scratch).with_file_access(Box::new(files))
    }

    #[tokio::test]
    async fn test_unreadable_original_falls_back_to_scratch_copy() {
        let scratch = TempDir::new().unwrap();
        let (files, copies) = ScriptedFiles::new(true, false, false);

        let availability = scripted(&scratch, files)
            .ensure_available(Path::new("/icloud/inbox/scan001.pdf"))
            .await;

        let copy = match availability {
            Availability::Scratch(copy) => copy,
            other => panic!("expected scratch copy, got {:?}", other),
        };
        assert_eq!(copies.load(Ordering::SeqCst), 1);
        assert!(copy.path().starts_with(scratch.path()));
        let name = copy.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("icloud_download_"));
        assert!(name.ends_with("_scan001.pdf"));
        assert_eq!(fs::read(copy.path()).unwrap(), b"%PDF-1.4 materialized");

        drop(copy);
        assert_eq!(scratch_entries(&scratch), 0);
    }

    #[tokio::test]
    async fn test_direct_read_after_failed_copies() {
        let scratch = TempDir::new().unwrap();
        let (files, copies) = ScriptedFiles::new(false, false, true);
        let doc = Path::new("/icloud/inbox/scan002.pdf");

        let availability = scripted(&scratch, files).ensure_available(doc).await;

        match availability {
            Availability::Original(path) => assert_eq!(path, doc),
            other => panic!("expected original, got {:?}", other),
        }
        assert_eq!(copies.load(Ordering::SeqCst), 5);
        assert_eq!(scratch_entries(&scratch), 0);
    }

    #[tokio::test]
    async fn test_everything_failing_is_unavailable() {
        let scratch = TempDir::new().unwrap();
        let (files, _) = ScriptedFiles::new(false, false, false);

        let availability = scripted(&scratch, files)
            .ensure_available(Path::new("/icloud/inbox/scan003.pdf"))
            .await;

        assert!(matches!(availability, Availability::Unavailable));
        assert_eq!(scratch_entries(&scratch), 0);
    }

    #[test]
    fn test_read_backoff_doubles() {
        let policy = AvailabilityPolicy::default();
        assert_eq!(policy.read_backoff(0), Duration::from_secs(2));
        assert_eq!(policy.read_backoff(1), Duration::from_secs(4));
        assert_eq!(policy.read_backoff(3), Duration::from_secs(16));
    }

    #[test]
    fn test_read_in_chunks_counts_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.bin");
        fs::write(&path, vec![7u8; READ_CHUNK_SIZE + 10]).unwrap();
        assert_eq!(read_in_chunks(&path).unwrap(), (READ_CHUNK_SIZE + 10) as u64);
    }
}
