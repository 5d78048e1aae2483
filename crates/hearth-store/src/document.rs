//! Read/modify/write access to a single persisted document.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, TryLockError};
use std::time::{Duration, Instant};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::lock::{self, LockMode};

/// Default upper bound on lock acquisition.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

/// Delay between attempts on the in-memory lock.
const MEMORY_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Options for opening a file-backed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Maximum time to wait for the shared or exclusive lock.
    pub lock_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }
}

impl StoreOptions {
    /// Set the lock acquisition timeout.
    #[must_use]
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }
}

enum Backend<D> {
    File { path: PathBuf, lock_path: PathBuf },
    Memory(RwLock<D>),
}

/// A single document guarded by a reader/writer lock.
///
/// Every [`read`](Self::read) observes a fully committed document, and every
/// [`with_write`](Self::with_write) either commits all of its changes or none
/// of them. The whole document is one lock domain.
pub struct LockedDocument<D> {
    backend: Backend<D>,
    options: StoreOptions,
}

impl<D> std::fmt::Debug for LockedDocument<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("LockedDocument");
        match &self.backend {
            Backend::File { path, .. } => s.field("path", path),
            Backend::Memory(_) => s.field("path", &"<memory>"),
        };
        s.field("options", &self.options).finish()
    }
}

impl<D> LockedDocument<D>
where
    D: Serialize + DeserializeOwned + Default + Clone,
{
    /// Create a document that lives only in memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::in_memory_with(D::default())
    }

    /// Create an in-memory document seeded with `initial`.
    #[must_use]
    pub fn in_memory_with(initial: D) -> Self {
        Self {
            backend: Backend::Memory(RwLock::new(initial)),
            options: StoreOptions::default(),
        }
    }

    /// Open (or prepare) a JSON document at `path`.
    ///
    /// The document itself is not created until the first write; the parent
    /// directory and the `.lk` lock file are created immediately.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory or lock file cannot be created.
    pub fn open(path: impl Into<PathBuf>, options: StoreOptions) -> StoreResult<Self> {
        let path = path.into();
        let lock_path = lock::lock_path_for(&path);
        lock::ensure_lock_file(&lock_path)?;
        debug!(path = %path.display(), "Opened locked document");
        Ok(Self {
            backend: Backend::File { path, lock_path },
            options,
        })
    }

    /// Path of the backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match &self.backend {
            Backend::File { path, .. } => Some(path.as_path()),
            Backend::Memory(_) => None,
        }
    }

    /// Load the current document under a shared lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock cannot be acquired in time or the
    /// document cannot be read or parsed.
    pub fn read(&self) -> StoreResult<D> {
        match &self.backend {
            Backend::File { path, lock_path } => {
                let _guard =
                    lock::acquire(path, lock_path, LockMode::Shared, self.options.lock_timeout)?;
                load_file(path)
            },
            Backend::Memory(cell) => {
                let guard = poll_memory_lock(self.options.lock_timeout, || cell.try_read())?;
                Ok((*guard).clone())
            },
        }
    }

    /// Load, mutate and persist the document under an exclusive lock.
    ///
    /// `mutate` works on an in-memory copy. The copy is persisted only when
    /// `mutate` returns `Ok`; on `Err` the stored document is untouched. The
    /// lock is released in both cases.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `mutate`, or a [`StoreError`] (converted
    /// into `E`) if locking, loading or persisting fails.
    pub fn with_write<T, E, F>(&self, mutate: F) -> Result<T, E>
    where
        F: FnOnce(&mut D) -> Result<T, E>,
        E: From<StoreError>,
    {
        match &self.backend {
            Backend::File { path, lock_path } => {
                let _guard = lock::acquire(
                    path,
                    lock_path,
                    LockMode::Exclusive,
                    self.options.lock_timeout,
                )?;
                let mut doc = load_file(path)?;
                let out = mutate(&mut doc)?;
                save_file(path, &doc)?;
                Ok(out)
            },
            Backend::Memory(cell) => {
                let mut guard = poll_memory_lock(self.options.lock_timeout, || cell.try_write())?;
                let mut doc = (*guard).clone();
                let out = mutate(&mut doc)?;
                *guard = doc;
                Ok(out)
            },
        }
    }
}

fn load_file<D: DeserializeOwned + Default>(path: &Path) -> StoreResult<D> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "Document not found, using empty default");
            return Ok(D::default());
        },
        Err(e) => return Err(StoreError::io(path, e)),
    };

    if content.trim().is_empty() {
        return Ok(D::default());
    }

    serde_json::from_str(&content).map_err(|e| StoreError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Write `doc` to a temp file next to `path`, sync it, then rename over `path`.
fn save_file<D: Serialize>(path: &Path, doc: &D) -> StoreResult<()> {
    let body = serde_json::to_vec_pretty(doc).map_err(|e| StoreError::Serialize(e.to_string()))?;

    let parent = path.parent().unwrap_or(Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| StoreError::io(parent, e))?;
    tmp.write_all(&body)
        .map_err(|e| StoreError::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| StoreError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| StoreError::io(path, e.error))?;

    debug!(path = %path.display(), bytes = body.len(), "Saved document");
    Ok(())
}

fn poll_memory_lock<G, A>(timeout: Duration, mut attempt: A) -> StoreResult<G>
where
    A: FnMut() -> Result<G, TryLockError<G>>,
{
    let started = Instant::now();
    loop {
        match attempt() {
            Ok(guard) => return Ok(guard),
            Err(TryLockError::Poisoned(_)) => return Err(StoreError::Poisoned),
            Err(TryLockError::WouldBlock) => {},
        }
        let waited = started.elapsed();
        if waited >= timeout {
            warn!(waited_ms = waited.as_millis(), "Gave up waiting for in-memory document lock");
            return Err(StoreError::LockTimeout {
                path: PathBuf::from("<memory>"),
                waited,
            });
        }
        std::thread::sleep(MEMORY_POLL_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        value: u32,
        #[serde(default)]
        labels: Vec<String>,
    }

    #[derive(Debug, thiserror::Error)]
    enum TestError {
        #[error("rejected")]
        Rejected,
        #[error(transparent)]
        Store(#[from] StoreError),
    }

    fn file_store(dir: &TempDir) -> LockedDocument<Counter> {
        LockedDocument::open(dir.path().join("counter.json"), StoreOptions::default()).unwrap()
    }

    #[test]
    fn missing_file_reads_as_default() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);
        assert_eq!(store.read().unwrap(), Counter::default());
        assert!(!dir.path().join("counter.json").exists());
        assert!(dir.path().join("counter.json.lk").exists());
    }

    #[test]
    fn write_persists_and_returns_value() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);

        let got: Result<u32, StoreError> = store.with_write(|doc| {
            doc.value = 7;
            doc.labels.push("first".into());
            Ok(doc.value)
        });
        assert_eq!(got.unwrap(), 7);

        // A fresh handle sees the committed state.
        let reopened = file_store(&dir);
        let doc = reopened.read().unwrap();
        assert_eq!(doc.value, 7);
        assert_eq!(doc.labels, vec!["first".to_string()]);
    }

    #[test]
    fn failed_mutation_is_discarded() {
        let dir = TempDir::new().unwrap();
        let store = file_store(&dir);
        store
            .with_write(|doc| {
                doc.value = 1;
                Ok::<_, TestError>(())
            })
            .unwrap();

        let result = store.with_write(|doc| {
            doc.value = 99;
            doc.labels.push("partial".into());
            Err::<(), _>(TestError::Rejected)
        });
        assert!(matches!(result, Err(TestError::Rejected)));
        assert_eq!(store.read().unwrap().value, 1);
        assert!(store.read().unwrap().labels.is_empty());

        // The lock was released despite the failure.
        store
            .with_write(|doc| {
                doc.value = 2;
                Ok::<_, TestError>(())
            })
            .unwrap();
        assert_eq!(store.read().unwrap().value, 2);
    }

    #[test]
    fn memory_backend_discards_failed_mutation() {
        let store: LockedDocument<Counter> = LockedDocument::in_memory();
        let result = store.with_write(|doc| {
            doc.value = 5;
            Err::<(), _>(TestError::Rejected)
        });
        assert!(result.is_err());
        assert_eq!(store.read().unwrap().value, 0);
        assert!(store.path().is_none());
    }

    #[test]
    fn corrupt_document_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("counter.json"), "{ not json").unwrap();
        let store = file_store(&dir);
        assert!(matches!(store.read(), Err(StoreError::Parse { .. })));
    }

    #[test]
    fn concurrent_writers_do_not_lose_updates() {
        let dir = TempDir::new().unwrap();
        let store = std::sync::Arc::new(file_store(&dir));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = std::sync::Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..5 {
                        store
                            .with_write(|doc| {
                                doc.value = doc.value.saturating_add(1);
                                Ok::<_, StoreError>(())
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(store.read().unwrap().value, 40);
    }
}
