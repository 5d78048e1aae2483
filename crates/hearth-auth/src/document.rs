//! The persisted token document.
//!
//! ```json
//! {
//!   "tokens": [{ "token": "...", "name": "laptop", "date": "2024-05-01T10:00:00.000000Z" }],
//!   "recovery_token": { "token": "<hex>", "date": "...", "expiration": null, "uses_left": 3 },
//!   "new_device": { "token": "...", "date": "...", "expiration": "..." }
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::codec::secrets_match;

/// All persisted credential state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenDocument {
    /// Device tokens in creation order.
    #[serde(rename = "tokens", default)]
    pub devices: Vec<DeviceToken>,
    /// The recovery credential, if one was ever generated.
    #[serde(
        rename = "recovery_token",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub recovery: Option<RecoveryCredential>,
    /// The pending new-device pairing credential.
    #[serde(rename = "new_device", default, skip_serializing_if = "Option::is_none")]
    pub pairing: Option<PairingCredential>,
}

impl TokenDocument {
    /// Device whose secret equals `secret`.
    #[must_use]
    pub fn device_by_secret(&self, secret: &str) -> Option<&DeviceToken> {
        self.devices
            .iter()
            .find(|d| secrets_match(d.secret.as_bytes(), secret.as_bytes()))
    }

    /// Device named `name`.
    #[must_use]
    pub fn device_by_name(&self, name: &str) -> Option<&DeviceToken> {
        self.devices.iter().find(|d| d.name == name)
    }

    /// Whether `secret` is already used by any stored opaque credential.
    #[must_use]
    pub fn holds_secret(&self, secret: &str) -> bool {
        self.device_by_secret(secret).is_some()
            || self
                .pairing
                .as_ref()
                .is_some_and(|p| secrets_match(p.secret.as_bytes(), secret.as_bytes()))
    }
}

/// A long-lived bearer token identifying one device.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceToken {
    /// The bearer secret.
    #[serde(rename = "token")]
    pub secret: String,
    /// Unique display name, `[A-Za-z0-9_]+` (see
    /// [`sanitize_device_name`](crate::sanitize_device_name)).
    pub name: String,
    /// Creation time, kept across rotations.
    #[serde(rename = "date", with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for DeviceToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceToken")
            .field("secret", &"<redacted>")
            .field("name", &self.name)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Raw secret bytes, stored as hex and wiped on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretBytes(Vec<u8>);

impl SecretBytes {
    /// Wrap raw bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Borrow the raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretBytes(<{} bytes redacted>)", self.0.len())
    }
}

impl Serialize for SecretBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for SecretBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        hex::decode(raw.trim())
            .map(Self)
            .map_err(|e| serde::de::Error::custom(format!("invalid hex secret: {e}")))
    }
}

/// The multi-use recovery credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryCredential {
    /// Secret bytes behind the mnemonic.
    #[serde(rename = "token")]
    pub secret: SecretBytes,
    /// When the credential was generated.
    #[serde(rename = "date", with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Optional hard expiry.
    #[serde(rename = "expiration", default, with = "timestamp::option")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Remaining redemptions; `None` means unlimited.
    #[serde(default)]
    pub uses_left: Option<u64>,
}

impl RecoveryCredential {
    /// Whether the credential can be redeemed at `now`.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|exp| now < exp) && self.uses_left.is_none_or(|n| n > 0)
    }
}

/// The single-use new-device pairing credential.
#[derive(Clone, Serialize, Deserialize)]
pub struct PairingCredential {
    /// The pairing secret.
    #[serde(rename = "token")]
    pub secret: String,
    /// When the credential was generated.
    #[serde(rename = "date", with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// When the credential stops being accepted.
    #[serde(rename = "expiration", with = "timestamp")]
    pub expires_at: DateTime<Utc>,
}

impl PairingCredential {
    /// Whether the credential is still usable at `now`.
    #[must_use]
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

impl std::fmt::Debug for PairingCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PairingCredential")
            .field("secret", &"<redacted>")
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Timestamp (de)serialization.
///
/// Writes RFC 3339 in UTC. Reads RFC 3339, and also naive ISO-8601 values
/// (`T` or space separated, no offset) as UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    pub(super) fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Ok(ts.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
            .ok_or_else(|| format!("invalid timestamp {raw:?}"))
    }

    pub(super) fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub(super) mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        #[allow(clippy::ref_option)]
        pub(in super::super) fn serialize<S: Serializer>(
            ts: &Option<DateTime<Utc>>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match ts {
                Some(ts) => super::serialize(ts, s),
                None => s.serialize_none(),
            }
        }

        pub(in super::super) fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<String>::deserialize(d)?
                .map(|raw| super::parse(&raw).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}
