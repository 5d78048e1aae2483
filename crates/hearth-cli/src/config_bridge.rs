//! Conversion from `hearth_config::Config` to the settings the library
//! crates take.

use std::sync::Arc;

use anyhow::Context;
use chrono::TimeDelta;
use hearth_auth::codec::Wordlist;
use hearth_auth::{AuthSettings, Credentials, TokenStore};
use hearth_config::Config;
use hearth_store::StoreOptions;
use hearth_telemetry::{LogConfig, LogFormat};

/// Logging settings from `[logging]`.
pub(crate) fn to_log_config(config: &Config) -> LogConfig {
    let format = config
        .logging
        .format
        .parse::<LogFormat>()
        .unwrap_or_default();
    let mut log = LogConfig::new(config.logging.level.to_lowercase()).with_format(format);
    for directive in &config.logging.directives {
        log = log.with_directive(directive.clone());
    }
    log
}

/// Store options from `[store]`.
pub(crate) fn to_store_options(config: &Config) -> StoreOptions {
    StoreOptions::default().with_lock_timeout(config.store.lock_timeout())
}

/// Credential settings from `[auth]`.
pub(crate) fn to_auth_settings(config: &Config) -> anyhow::Result<AuthSettings> {
    let wordlist = Wordlist::by_name(&config.auth.mnemonic_language).with_context(|| {
        format!(
            "unsupported mnemonic language '{}'",
            config.auth.mnemonic_language
        )
    })?;
    let secs = i64::try_from(config.auth.pairing_ttl_secs)
        .context("auth.pairing_ttl_secs is out of range")?;
    let pairing_ttl = TimeDelta::try_seconds(secs).context("auth.pairing_ttl_secs is out of range")?;
    Ok(AuthSettings {
        pairing_ttl,
        wordlist,
    })
}

/// Open the token store and build the managers over it.
pub(crate) fn open_credentials(config: &Config) -> anyhow::Result<Credentials> {
    let store = TokenStore::open(&config.store.path, to_store_options(config))
        .with_context(|| format!("failed to open {}", config.store.path.display()))?;
    Ok(Credentials::new(Arc::new(store), to_auth_settings(config)?))
}
