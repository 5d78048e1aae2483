//! The recovery credential: a mnemonic that can mint new device tokens.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::codec::{RECOVERY_SECRET_LEN, Wordlist, new_recovery_bytes, secrets_match};
use crate::credentials::TokenStore;
use crate::devices::issue_device;
use crate::document::{DeviceToken, RecoveryCredential, SecretBytes};
use crate::error::{AuthError, AuthResult};

/// Snapshot of the recovery credential.
///
/// Every field is empty and both flags are false when none exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryStatus {
    /// A credential is stored.
    pub exists: bool,
    /// The stored credential can currently be redeemed.
    pub valid: bool,
    /// When it was generated.
    pub created_at: Option<DateTime<Utc>>,
    /// When it expires, if ever.
    pub expires_at: Option<DateTime<Utc>>,
    /// Remaining uses, if limited.
    pub uses_left: Option<u64>,
}

/// Manager for the single recovery credential.
#[derive(Debug, Clone)]
pub struct RecoveryTokens {
    store: Arc<TokenStore>,
    wordlist: Wordlist,
}

impl RecoveryTokens {
    /// Create a manager over `store` that speaks `wordlist`.
    #[must_use]
    pub fn new(store: Arc<TokenStore>, wordlist: Wordlist) -> Self {
        Self { store, wordlist }
    }

    /// Word list used for phrases.
    #[must_use]
    pub fn wordlist(&self) -> &Wordlist {
        &self.wordlist
    }

    /// Replace the recovery credential and return its phrase.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidExpirationDate`] if `expires_at` is not in the future.
    /// - [`AuthError::InvalidUsesLeft`] if `uses_left` is not positive.
    ///
    /// Both are checked before anything is written.
    pub fn generate(
        &self,
        expires_at: Option<DateTime<Utc>>,
        uses_left: Option<i64>,
    ) -> AuthResult<String> {
        let now = Utc::now();
        if expires_at.is_some_and(|exp| exp <= now) {
            return Err(AuthError::InvalidExpirationDate);
        }
        let uses_left = match uses_left {
            None => None,
            Some(n) => match u64::try_from(n) {
                Ok(n) if n > 0 => Some(n),
                _ => return Err(AuthError::InvalidUsesLeft),
            },
        };

        let bytes = new_recovery_bytes();
        let phrase = self.wordlist.encode(&bytes[..])?;
        let credential = RecoveryCredential {
            secret: SecretBytes::new(bytes.to_vec()),
            created_at: now,
            expires_at,
            uses_left,
        };
        self.store.with_write(|doc| {
            doc.recovery = Some(credential);
            Ok::<_, AuthError>(())
        })?;

        info!(
            expires_at = ?expires_at,
            uses_left = ?uses_left,
            "Generated recovery credential"
        );
        Ok(phrase)
    }

    /// Report whether a credential exists and can be redeemed now.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Store`] if the document cannot be read.
    pub fn status(&self) -> AuthResult<RecoveryStatus> {
        let doc = self.store.read()?;
        Ok(doc.recovery.as_ref().map_or_else(RecoveryStatus::default, |r| {
            RecoveryStatus {
                exists: true,
                valid: r.is_valid_at(Utc::now()),
                created_at: Some(r.created_at),
                expires_at: r.expires_at,
                uses_left: r.uses_left,
            }
        }))
    }

    /// Trade a recovery phrase for a new device token.
    ///
    /// On success a limited credential loses one use.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidMnemonic`] if the phrase is malformed.
    /// - [`AuthError::NotFound`] if no credential exists, the phrase does not
    ///   match it, or it has expired or run out of uses.
    pub fn redeem(&self, mnemonic: &str, device_name: &str) -> AuthResult<DeviceToken> {
        let presented = self.wordlist.decode_exact(mnemonic, RECOVERY_SECRET_LEN)?;

        let result = self.store.with_write(|doc| {
            let now = Utc::now();
            let credential = doc.recovery.as_mut().ok_or(AuthError::NotFound)?;
            if !secrets_match(credential.secret.as_bytes(), &presented) {
                return Err(AuthError::NotFound);
            }
            if !credential.is_valid_at(now) {
                return Err(AuthError::NotFound);
            }
            if let Some(n) = credential.uses_left.as_mut() {
                *n = n.saturating_sub(1);
            }
            Ok(issue_device(doc, device_name, now))
        });

        match result {
            Ok(device) => {
                info!(device = %device.name, "Redeemed recovery credential");
                Ok(device)
            },
            Err(AuthError::NotFound) => {
                warn!("Rejected recovery redemption");
                Err(AuthError::NotFound)
            },
            Err(e) => Err(e),
        }
    }
}
