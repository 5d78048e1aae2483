//! Post-merge validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Upper bound for `store.lock_timeout_ms` (10 minutes).
const MAX_LOCK_TIMEOUT_MS: u64 = 600_000;

/// Upper bound for `auth.pairing_ttl_secs` (one day).
const MAX_PAIRING_TTL_SECS: u64 = 86_400;

/// BIP-39 word lists accepted for `auth.mnemonic_language`.
pub const MNEMONIC_LANGUAGES: &[&str] = &[
    "english",
    "czech",
    "french",
    "italian",
    "japanese",
    "korean",
    "portuguese",
    "spanish",
    "chinese-simplified",
    "chinese-traditional",
];

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["pretty", "compact", "json"];

/// Validate a merged configuration.
///
/// # Errors
///
/// Returns the first [`ConfigError::ValidationError`] found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_store(config)?;
    validate_auth(config)?;
    validate_logging(config)?;
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message: message.into(),
    }
}

fn validate_store(config: &Config) -> ConfigResult<()> {
    let s = &config.store;
    if s.path.as_os_str().is_empty() {
        return Err(invalid("store.path", "must not be empty"));
    }
    if s.path.file_name().is_none() {
        return Err(invalid(
            "store.path",
            format!("'{}' does not name a file", s.path.display()),
        ));
    }
    if !(1..=MAX_LOCK_TIMEOUT_MS).contains(&s.lock_timeout_ms) {
        return Err(invalid(
            "store.lock_timeout_ms",
            format!("must be between 1 and {MAX_LOCK_TIMEOUT_MS}"),
        ));
    }
    Ok(())
}

fn validate_auth(config: &Config) -> ConfigResult<()> {
    let a = &config.auth;
    if !(1..=MAX_PAIRING_TTL_SECS).contains(&a.pairing_ttl_secs) {
        return Err(invalid(
            "auth.pairing_ttl_secs",
            format!("must be between 1 and {MAX_PAIRING_TTL_SECS}"),
        ));
    }
    if !MNEMONIC_LANGUAGES.contains(&a.mnemonic_language.as_str()) {
        return Err(invalid(
            "auth.mnemonic_language",
            format!(
                "unsupported language '{}'; expected one of: {}",
                a.mnemonic_language,
                MNEMONIC_LANGUAGES.join(", ")
            ),
        ));
    }
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let l = &config.logging;
    if !LOG_LEVELS.contains(&l.level.to_lowercase().as_str()) {
        return Err(invalid(
            "logging.level",
            format!("unknown level '{}'", l.level),
        ));
    }
    if !LOG_FORMATS.contains(&l.format.as_str()) {
        return Err(invalid(
            "logging.format",
            format!(
                "unknown format '{}'; expected one of: {}",
                l.format,
                LOG_FORMATS.join(", ")
            ),
        ));
    }
    Ok(())
}
