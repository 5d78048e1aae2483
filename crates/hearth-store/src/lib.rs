//! Hearth Store - a single persisted document behind a reader/writer lock.
//!
//! [`LockedDocument`] gives two operations over any serde document:
//!
//! - [`read`](LockedDocument::read) takes a shared lock, loads, and releases.
//! - [`with_write`](LockedDocument::with_write) takes an exclusive lock,
//!   loads, applies a closure to an in-memory copy, and persists the copy only
//!   if the closure succeeds.
//!
//! File-backed documents are stored as JSON. Locking is advisory (`flock`
//! style) on a `<document>.lk` sibling, and writes replace the document through
//! a synced temp file and an atomic rename. Lock acquisition is bounded by
//! [`StoreOptions::lock_timeout`].
//!
//! # Example
//!
//! ```
//! use hearth_store::{LockedDocument, StoreError};
//!
//! let store: LockedDocument<Vec<String>> = LockedDocument::in_memory();
//! store
//!     .with_write(|names| {
//!         names.push("laptop".to_string());
//!         Ok::<_, StoreError>(())
//!     })
//!     .unwrap();
//! assert_eq!(store.read().unwrap(), vec!["laptop".to_string()]);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod document;
mod error;
mod lock;

pub use document::{DEFAULT_LOCK_TIMEOUT, LockedDocument, StoreOptions};
pub use error::{StoreError, StoreResult};
