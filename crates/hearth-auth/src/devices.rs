//! Device token issuance, lookup, rotation and deletion.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::info;

use crate::codec::{new_opaque_token, secrets_match};
use crate::credentials::TokenStore;
use crate::document::{DeviceToken, TokenDocument};
use crate::error::{AuthError, AuthResult};

/// Name given to devices that ask for an empty one.
pub const UNNAMED_DEVICE: &str = "Unknown_device";

/// Replace every character outside `[A-Za-z0-9]` with `_`.
///
/// Stored names are therefore `[A-Za-z0-9_]+`: purely alphanumeric except
/// for the underscores introduced here and by [`UNNAMED_DEVICE`]. An empty
/// input becomes [`UNNAMED_DEVICE`].
#[must_use]
pub fn sanitize_device_name(requested: &str) -> String {
    if requested.is_empty() {
        return UNNAMED_DEVICE.to_string();
    }
    requested
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Append a device to `doc` with a unique name and secret.
///
/// Shared by plain creation and by recovery/pairing redemption so the new
/// device lands in the same transaction as the credential update.
pub(crate) fn issue_device(
    doc: &mut TokenDocument,
    requested_name: &str,
    now: DateTime<Utc>,
) -> DeviceToken {
    let mut name = sanitize_device_name(requested_name);
    let mut rng = rand::thread_rng();
    while doc.device_by_name(&name).is_some() {
        name.push(char::from(b'0'.saturating_add(rng.gen_range(0..10u8))));
    }

    let secret = new_opaque_token(|candidate| doc.holds_secret(candidate));
    let device = DeviceToken {
        secret,
        name,
        created_at: now,
    };
    doc.devices.push(device.clone());
    device
}

/// Public view of a device, without its secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Display name.
    pub name: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Whether this is the device whose secret the caller presented.
    pub is_caller: bool,
}

/// Manager for long-lived device tokens.
#[derive(Debug, Clone)]
pub struct DeviceTokens {
    store: Arc<TokenStore>,
}

impl DeviceTokens {
    /// Create a manager over `store`.
    #[must_use]
    pub fn new(store: Arc<TokenStore>) -> Self {
        Self { store }
    }

    /// Issue a token for a new device.
    ///
    /// The name is sanitized and made unique by appending digits.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Store`] if the document cannot be updated.
    pub fn create(&self, display_name: &str) -> AuthResult<DeviceToken> {
        let device = self.store.with_write(|doc| {
            Ok::<_, AuthError>(issue_device(doc, display_name, Utc::now()))
        })?;
        info!(device = %device.name, "Created device token");
        Ok(device)
    }

    /// Whether `secret` belongs to a current device.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Store`] if the document cannot be read.
    pub fn is_valid(&self, secret: &str) -> AuthResult<bool> {
        Ok(self.store.read()?.device_by_secret(secret).is_some())
    }

    /// Name of the device holding `secret`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Store`] if the document cannot be read.
    pub fn name_of(&self, secret: &str) -> AuthResult<Option<String>> {
        Ok(self
            .store
            .read()?
            .device_by_secret(secret)
            .map(|d| d.name.clone()))
    }

    /// Look up a device by display name.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Store`] if the document cannot be read.
    pub fn get_by_name(&self, name: &str) -> AuthResult<Option<DeviceInfo>> {
        Ok(self
            .store
            .read()?
            .device_by_name(name)
            .map(|d| DeviceInfo {
                name: d.name.clone(),
                created_at: d.created_at,
                is_caller: false,
            }))
    }

    /// All devices in stored order.
    ///
    /// `is_caller` is set on the device whose secret equals `caller_secret`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Store`] if the document cannot be read.
    pub fn list(&self, caller_secret: Option<&str>) -> AuthResult<Vec<DeviceInfo>> {
        let doc = self.store.read()?;
        Ok(doc
            .devices
            .iter()
            .map(|d| DeviceInfo {
                name: d.name.clone(),
                created_at: d.created_at,
                is_caller: caller_secret
                    .is_some_and(|s| secrets_match(d.secret.as_bytes(), s.as_bytes())),
            })
            .collect())
    }

    /// Delete the device named `name`.
    ///
    /// # Errors
    ///
    /// - [`AuthError::NotFound`] if no device has that name.
    /// - [`AuthError::CannotDeleteCaller`] if that device holds `caller_secret`.
    pub fn delete(&self, name: &str, caller_secret: &str) -> AuthResult<()> {
        self.store.with_write(|doc| {
            let pos = doc
                .devices
                .iter()
                .position(|d| d.name == name)
                .ok_or(AuthError::NotFound)?;
            if secrets_match(doc.devices[pos].secret.as_bytes(), caller_secret.as_bytes()) {
                return Err(AuthError::CannotDeleteCaller);
            }
            doc.devices.remove(pos);
            Ok(())
        })?;
        info!(device = %name, "Deleted device token");
        Ok(())
    }

    /// Replace the caller's secret with a fresh one.
    ///
    /// Name and creation time are kept. The old secret stops working at once.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotFound`] if `caller_secret` is not a device token.
    pub fn rotate(&self, caller_secret: &str) -> AuthResult<String> {
        let (name, secret) = self.store.with_write(|doc| {
            let pos = doc
                .devices
                .iter()
                .position(|d| secrets_match(d.secret.as_bytes(), caller_secret.as_bytes()))
                .ok_or(AuthError::NotFound)?;
            let fresh = new_opaque_token(|candidate| doc.holds_secret(candidate));
            let device = &mut doc.devices[pos];
            device.secret.clone_from(&fresh);
            Ok::<_, AuthError>((device.name.clone(), fresh))
        })?;
        info!(device = %name, "Rotated device token");
        Ok(secret)
    }
}
