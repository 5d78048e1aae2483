//! Wiring of the three managers over one token store.

use std::sync::Arc;

use chrono::TimeDelta;
use hearth_store::LockedDocument;

use crate::codec::Wordlist;
use crate::devices::DeviceTokens;
use crate::document::TokenDocument;
use crate::pairing::{DEFAULT_PAIRING_TTL_SECS, PairingTokens};
use crate::recovery::RecoveryTokens;

/// The store every credential manager shares.
pub type TokenStore = LockedDocument<TokenDocument>;

/// Tunables for [`Credentials`].
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// Lifetime of pairing secrets.
    pub pairing_ttl: TimeDelta,
    /// Word list for recovery phrases.
    pub wordlist: Wordlist,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            pairing_ttl: TimeDelta::seconds(DEFAULT_PAIRING_TTL_SECS),
            wordlist: Wordlist::english(),
        }
    }
}

/// Device, recovery and pairing managers backed by the same document.
///
/// All writes, whichever manager makes them, serialize on the one
/// document lock.
#[derive(Debug, Clone)]
pub struct Credentials {
    store: Arc<TokenStore>,
    devices: DeviceTokens,
    recovery: RecoveryTokens,
    pairing: PairingTokens,
}

impl Credentials {
    /// Build the managers over `store`.
    #[must_use]
    pub fn new(store: Arc<TokenStore>, settings: AuthSettings) -> Self {
        Self {
            devices: DeviceTokens::new(Arc::clone(&store)),
            recovery: RecoveryTokens::new(Arc::clone(&store), settings.wordlist),
            pairing: PairingTokens::new(Arc::clone(&store), settings.pairing_ttl),
            store,
        }
    }

    /// Credentials over a fresh in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(TokenStore::in_memory()), AuthSettings::default())
    }

    /// Device token manager.
    #[must_use]
    pub fn devices(&self) -> &DeviceTokens {
        &self.devices
    }

    /// Recovery credential manager.
    #[must_use]
    pub fn recovery(&self) -> &RecoveryTokens {
        &self.recovery
    }

    /// Pairing manager.
    #[must_use]
    pub fn pairing(&self) -> &PairingTokens {
        &self.pairing
    }

    /// The shared store.
    #[must_use]
    pub fn store(&self) -> &Arc<TokenStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn managers_share_one_document() {
        let creds = Credentials::in_memory();
        let phrase = creds.recovery().generate(None, Some(2)).unwrap();
        let pairing = creds.pairing().generate().unwrap();
        let device = creds.recovery().redeem(&phrase, "restored").unwrap();

        let doc = creds.store().read().unwrap();
        assert_eq!(doc.devices.len(), 1);
        assert_eq!(doc.recovery.as_ref().unwrap().uses_left, Some(1));
        assert_eq!(doc.pairing.as_ref().unwrap().secret, pairing);
        assert!(creds.devices().is_valid(&device.secret).unwrap());
    }

    #[test]
    fn default_settings() {
        let settings = AuthSettings::default();
        assert_eq!(settings.pairing_ttl, TimeDelta::minutes(10));
        assert_eq!(settings.wordlist.name(), "english");
    }
}
