//! Advisory file locking on a `.lk` sibling of the document.
//!
//! The lock file is separate from the document so that the document itself
//! can be replaced by an atomic rename while the lock is held.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::warn;

use crate::error::{StoreError, StoreResult};

/// Delay between non-blocking lock attempts.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Whether to acquire a shared (read) or exclusive (write) lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LockMode {
    Shared,
    Exclusive,
}

/// Holds an advisory lock until dropped.
pub(crate) struct FileLockGuard {
    file: File,
}

impl Drop for FileLockGuard {
    fn drop(&mut self) {
        // Closing the descriptor releases the lock as well; unlock explicitly
        // so release does not depend on when the handle is closed.
        let _ = fs2::FileExt::unlock(&self.file);
    }
}

/// Path of the lock file guarding `document`.
pub(crate) fn lock_path_for(document: &Path) -> PathBuf {
    let mut name = document
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".lk");
    document.with_file_name(name)
}

/// Create the lock file (and its directory) if missing.
pub(crate) fn ensure_lock_file(lock_path: &Path) -> StoreResult<()> {
    if let Some(parent) = lock_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(lock_path)
        .map_err(|e| StoreError::io(lock_path, e))?;
    Ok(())
}

/// Acquire `mode` on `lock_path`, retrying until `timeout` has elapsed.
///
/// `document` is only used for error reporting.
pub(crate) fn acquire(
    document: &Path,
    lock_path: &Path,
    mode: LockMode,
    timeout: Duration,
) -> StoreResult<FileLockGuard> {
    let file = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open(lock_path)
        .map_err(|e| StoreError::io(lock_path, e))?;

    let started = Instant::now();
    let contended = fs2::lock_contended_error().raw_os_error();
    loop {
        let attempt = match mode {
            LockMode::Shared => fs2::FileExt::try_lock_shared(&file),
            LockMode::Exclusive => fs2::FileExt::try_lock_exclusive(&file),
        };
        match attempt {
            Ok(()) => return Ok(FileLockGuard { file }),
            Err(e) if e.raw_os_error() == contended => {},
            Err(e) => return Err(StoreError::io(lock_path, e)),
        }

        let waited = started.elapsed();
        if waited >= timeout {
            warn!(
                path = %document.display(),
                ?mode,
                waited_ms = waited.as_millis(),
                "Gave up waiting for document lock"
            );
            return Err(StoreError::LockTimeout {
                path: document.to_path_buf(),
                waited,
            });
        }
        std::thread::sleep(POLL_INTERVAL.min(timeout.saturating_sub(waited)));
    }
}
