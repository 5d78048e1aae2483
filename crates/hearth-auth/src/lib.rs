//! Hearth Auth - device tokens, recovery phrases and new-device pairing.
//!
//! This crate provides:
//! - Opaque bearer tokens for authorized devices, with rotation and
//!   self-protected deletion
//! - A single recovery credential shown to the owner as a BIP-39 style
//!   mnemonic, optionally expiring and optionally use-limited
//! - A short-lived, one-shot pairing secret for enrolling a new device
//!
//! # Storage Model
//!
//! All state lives in one [`TokenDocument`] inside a
//! [`hearth_store::LockedDocument`]. Reads take the shared lock, and every
//! mutation (including a redemption and the device it mints) is a single
//! exclusive transaction. Two callers racing to redeem the same credential
//! therefore see at most one winner.
//!
//! # Example
//!
//! ```
//! use hearth_auth::{AuthError, Credentials};
//!
//! let creds = Credentials::in_memory();
//!
//! // Pair a first device.
//! let pairing_secret = creds.pairing().generate().unwrap();
//! let laptop = creds.pairing().redeem(&pairing_secret, "laptop").unwrap();
//! assert!(creds.devices().is_valid(&laptop.secret).unwrap());
//!
//! // The pairing secret is single-use.
//! assert!(matches!(
//!     creds.pairing().redeem(&pairing_secret, "again"),
//!     Err(AuthError::NotFound)
//! ));
//!
//! // A one-shot recovery phrase.
//! let phrase = creds.recovery().generate(None, Some(1)).unwrap();
//! let spare = creds.recovery().redeem(&phrase, "spare").unwrap();
//! assert_eq!(spare.name, "spare");
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod codec;
pub mod prelude;

mod credentials;
mod devices;
mod document;
mod error;
mod pairing;
mod recovery;

pub use credentials::{AuthSettings, Credentials, TokenStore};
pub use devices::{DeviceInfo, DeviceTokens, UNNAMED_DEVICE, sanitize_device_name};
pub use document::{
    DeviceToken, PairingCredential, RecoveryCredential, SecretBytes, TokenDocument,
};
pub use error::{AuthError, AuthResult};
pub use pairing::{DEFAULT_PAIRING_TTL_SECS, PairingTokens};
pub use recovery::{RecoveryStatus, RecoveryTokens};
