//! Prelude module - commonly used types for convenient import.
//!
//! Use `use hearth_auth::prelude::*;` to import all essential types.

// Errors
pub use crate::{AuthError, AuthResult};

// Managers
pub use crate::{AuthSettings, Credentials, DeviceTokens, PairingTokens, RecoveryTokens};

// Records
pub use crate::{DeviceInfo, DeviceToken, RecoveryStatus, TokenDocument, TokenStore};

// Encoding
pub use crate::codec::{MnemonicError, Wordlist};
