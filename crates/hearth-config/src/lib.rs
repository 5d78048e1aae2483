//! Hearth Config - layered configuration for the Hearth credential service.
//!
//! # Usage
//!
//! ```rust,no_run
//! use hearth_config::Config;
//!
//! let resolved = Config::load(None).unwrap();
//! println!("tokens at {}", resolved.config.store.path.display());
//! ```
//!
//! # Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Explicit** file passed with `--config`
//! 2. **User** (`$HEARTH_HOME/config.toml`, else `~/.hearth/config.toml`)
//! 3. **System** (`/etc/hearth/config.toml`)
//! 4. **Environment** (`HEARTH_*`), used only for fields no file set
//! 5. **Embedded defaults** (`defaults.toml` compiled into the binary)
//!
//! This crate depends on no other Hearth crate. The CLI converts these
//! types into store and auth settings.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

/// Environment variable fallbacks.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Layered merging with source tracking.
pub mod merge;
/// Resolved configuration display.
pub mod show;
/// Configuration struct definitions.
pub mod types;
/// Validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigPaths;
pub use merge::ConfigLayer;
pub use show::ResolvedConfig;
pub use types::*;

impl Config {
    /// Load configuration with the full precedence chain.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a file is unreadable or malformed, or the
    /// merged result is invalid.
    pub fn load(explicit: Option<&std::path::Path>) -> ConfigResult<ResolvedConfig> {
        loader::load(explicit)
    }
}
