//! Credential error types.

use hearth_store::StoreError;
use thiserror::Error;

use crate::codec::MnemonicError;

/// Errors returned by the credential managers.
///
/// Everything except [`AuthError::Store`] is a caller mistake that can be
/// retried with corrected input.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token, device or credential does not exist or is no longer valid.
    ///
    /// Missing, expired, exhausted and mismatched secrets all map here.
    #[error("not found")]
    NotFound,

    /// A device tried to delete the token it is authenticating with.
    #[error("cannot delete the token used to authenticate this request")]
    CannotDeleteCaller,

    /// A recovery expiration date was not in the future.
    #[error("expiration date must be in the future")]
    InvalidExpirationDate,

    /// A recovery use limit was not a positive integer.
    #[error("uses left must be greater than zero")]
    InvalidUsesLeft,

    /// A recovery phrase was malformed.
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(#[from] MnemonicError),

    /// The token document could not be locked, read or written.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for credential operations.
pub type AuthResult<T> = Result<T, AuthError>;
