//! Configuration types.
//!
//! Every section implements [`Default`] with the same values as the embedded
//! `defaults.toml`, so a partial file (or none at all) still yields a working
//! configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for Hearth.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Token document location and locking.
    pub store: StoreSection,
    /// Credential behaviour.
    pub auth: AuthSection,
    /// Logging level, format and per-crate directives.
    pub logging: LoggingSection,
}

/// Where the token document lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Path to the JSON token document.
    pub path: PathBuf,
    /// Maximum wait for the document lock, in milliseconds.
    pub lock_timeout_ms: u64,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/var/lib/hearth/tokens.json"),
            lock_timeout_ms: 10_000,
        }
    }
}

impl StoreSection {
    /// Lock timeout as a [`Duration`].
    #[must_use]
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

/// Credential settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    /// Lifetime of a pairing secret, in seconds.
    pub pairing_ttl_secs: u64,
    /// BIP-39 word list name (`english`, `french`, `chinese-simplified`, ...).
    ///
    /// Only the spelling of newly generated phrases depends on it; phrases
    /// in any BIP-39 language are accepted on redemption.
    pub mnemonic_language: String,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            pairing_ttl_secs: 600,
            mnemonic_language: "english".to_owned(),
        }
    }
}

/// Logging and tracing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global level filter (`trace`, `debug`, `info`, `warn`, `error`).
    pub level: String,
    /// Output format: `pretty`, `compact` or `json`.
    pub format: String,
    /// Per-crate directives such as `hearth_store=debug`.
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}
