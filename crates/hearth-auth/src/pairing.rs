//! One-shot pairing secrets for enrolling a new device.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{info, warn};

use crate::codec::{new_opaque_token, secrets_match};
use crate::credentials::TokenStore;
use crate::devices::issue_device;
use crate::document::{DeviceToken, PairingCredential};
use crate::error::{AuthError, AuthResult};

/// Default lifetime of a pairing secret, in seconds.
pub const DEFAULT_PAIRING_TTL_SECS: i64 = 600;

/// Manager for the single pending pairing credential.
#[derive(Debug, Clone)]
pub struct PairingTokens {
    store: Arc<TokenStore>,
    ttl: TimeDelta,
}

impl PairingTokens {
    /// Create a manager whose secrets live for `ttl`.
    #[must_use]
    pub fn new(store: Arc<TokenStore>, ttl: TimeDelta) -> Self {
        Self { store, ttl }
    }

    /// Lifetime of newly generated secrets.
    #[must_use]
    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Issue a new pairing secret, replacing any pending one.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Store`] if the document cannot be updated.
    pub fn generate(&self) -> AuthResult<String> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let secret = self.store.with_write(|doc| {
            // Replacing the slot, so only device secrets can collide.
            let secret = new_opaque_token(|candidate| doc.device_by_secret(candidate).is_some());
            doc.pairing = Some(PairingCredential {
                secret: secret.clone(),
                created_at: now,
                expires_at,
            });
            Ok::<_, AuthError>(secret)
        })?;

        info!(%expires_at, "Generated pairing secret");
        Ok(secret)
    }

    /// Drop the pending pairing secret, if any.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Store`] if the document cannot be updated.
    pub fn invalidate(&self) -> AuthResult<()> {
        let removed = self.store.with_write(|doc| Ok::<_, AuthError>(doc.pairing.take().is_some()))?;
        if removed {
            info!("Invalidated pairing secret");
        }
        Ok(())
    }

    /// Expiry of the pending secret, if one is pending and unexpired.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Store`] if the document cannot be read.
    pub fn status(&self) -> AuthResult<Option<DateTime<Utc>>> {
        let now = Utc::now();
        Ok(self
            .store
            .read()?
            .pairing
            .filter(|p| p.is_live_at(now))
            .map(|p| p.expires_at))
    }

    /// Trade the pairing secret for a device token.
    ///
    /// The pairing secret is consumed in the same write that adds the device.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotFound`] if nothing is pending, it expired, or
    /// `secret` does not match.
    pub fn redeem(&self, secret: &str, device_name: &str) -> AuthResult<DeviceToken> {
        let result = self.store.with_write(|doc| {
            let now = Utc::now();
            let pending = doc.pairing.as_ref().ok_or(AuthError::NotFound)?;
            if !pending.is_live_at(now) || !secrets_match(pending.secret.as_bytes(), secret.as_bytes())
            {
                return Err(AuthError::NotFound);
            }
            doc.pairing = None;
            Ok(issue_device(doc, device_name, now))
        });

        match result {
            Ok(device) => {
                info!(device = %device.name, "Paired new device");
                Ok(device)
            },
            Err(AuthError::NotFound) => {
                warn!("Rejected pairing redemption");
                Err(AuthError::NotFound)
            },
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::DeviceTokens;

    fn managers() -> (PairingTokens, DeviceTokens, Arc<TokenStore>) {
        let store = Arc::new(TokenStore::in_memory());
        (
            PairingTokens::new(
                Arc::clone(&store),
                TimeDelta::seconds(DEFAULT_PAIRING_TTL_SECS),
            ),
            DeviceTokens::new(Arc::clone(&store)),
            store,
        )
    }

    #[test]
    fn redeem_succeeds_exactly_once() {
        let (pairing, devices, _) = managers();
        let secret = pairing.generate().unwrap();

        let device = pairing.redeem(&secret, "new phone").unwrap();
        assert_eq!(device.name, "new_phone");
        assert!(devices.is_valid(&device.secret).unwrap());
        assert!(pairing.status().unwrap().is_none());

        assert!(matches!(
            pairing.redeem(&secret, "again"),
            Err(AuthError::NotFound)
        ));
        assert_eq!(devices.list(None).unwrap().len(), 1);
    }

    #[test]
    fn second_generate_invalidates_first() {
        let (pairing, _, _) = managers();
        let first = pairing.generate().unwrap();
        let second = pairing.generate().unwrap();
        assert_ne!(first, second);

        assert!(matches!(pairing.redeem(&first, "a"), Err(AuthError::NotFound)));
        assert!(pairing.redeem(&second, "a").is_ok());
    }

    #[test]
    fn wrong_secret_keeps_pending_credential() {
        let (pairing, _, _) = managers();
        let secret = pairing.generate().unwrap();
        assert!(matches!(pairing.redeem("guess", "a"), Err(AuthError::NotFound)));
        assert!(pairing.status().unwrap().is_some());
        assert!(pairing.redeem(&secret, "a").is_ok());
    }

    #[test]
    fn expired_secret_is_not_found() {
        let (pairing, _, store) = managers();
        let secret = pairing.generate().unwrap();
        store
            .with_write(|doc| {
                doc.pairing.as_mut().unwrap().expires_at = Utc::now() - TimeDelta::seconds(1);
                Ok::<_, AuthError>(())
            })
            .unwrap();

        assert!(pairing.status().unwrap().is_none());
        assert!(matches!(pairing.redeem(&secret, "a"), Err(AuthError::NotFound)));
    }

    #[test]
    fn invalidate_is_idempotent() {
        let (pairing, _, _) = managers();
        pairing.invalidate().unwrap();

        let secret = pairing.generate().unwrap();
        pairing.invalidate().unwrap();
        pairing.invalidate().unwrap();
        assert!(matches!(pairing.redeem(&secret, "a"), Err(AuthError::NotFound)));
    }

    #[test]
    fn status_reports_expiry_within_ttl() {
        let (pairing, _, _) = managers();
        assert!(pairing.status().unwrap().is_none());

        let before = Utc::now();
        pairing.generate().unwrap();
        let expires = pairing.status().unwrap().unwrap();
        assert!(expires > before);
        assert!(expires <= Utc::now() + pairing.ttl());
    }
}
