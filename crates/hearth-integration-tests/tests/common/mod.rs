//! Shared fixtures.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use hearth_auth::{AuthSettings, Credentials, TokenStore};
use hearth_store::StoreOptions;
use tempfile::TempDir;

/// A temp directory holding one token document.
pub struct Fixture {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens.json");
        Self { dir, path }
    }

    /// A fresh handle on the document, as a separate process would open it.
    pub fn credentials(&self) -> Credentials {
        open(&self.path, StoreOptions::default())
    }

    pub fn credentials_with_timeout(&self, timeout: Duration) -> Credentials {
        open(&self.path, StoreOptions::default().with_lock_timeout(timeout))
    }

    pub fn raw_json(&self) -> serde_json::Value {
        let body = std::fs::read_to_string(&self.path).unwrap();
        serde_json::from_str(&body).unwrap()
    }
}

fn open(path: &Path, options: StoreOptions) -> Credentials {
    let store = TokenStore::open(path, options).unwrap();
    Credentials::new(Arc::new(store), AuthSettings::default())
}
