//! Secret generation and encoding.
//!
//! - Opaque bearer tokens: 32 random bytes, URL-safe base64 without padding.
//! - Recovery secrets: 24 random bytes, shown to humans as a mnemonic
//!   (see [`Wordlist`]).

mod mnemonic;
mod wordlist;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;
use tracing::debug;
use zeroize::Zeroizing;

pub use mnemonic::MnemonicError;
pub use wordlist::Wordlist;

/// Random bytes behind each opaque token.
pub const OPAQUE_TOKEN_BYTES: usize = 32;

/// Length of the recovery secret in bytes (18 mnemonic words).
pub const RECOVERY_SECRET_LEN: usize = 24;

/// Draw a fresh opaque token, redrawing while `is_taken` reports a collision.
#[must_use]
pub fn new_opaque_token(mut is_taken: impl FnMut(&str) -> bool) -> String {
    loop {
        let mut raw = Zeroizing::new([0u8; OPAQUE_TOKEN_BYTES]);
        OsRng.fill_bytes(&mut raw[..]);
        let token = URL_SAFE_NO_PAD.encode(&raw[..]);
        if !is_taken(&token) {
            return token;
        }
        debug!("Opaque token collided with a stored secret, drawing again");
    }
}

/// Draw the raw bytes of a new recovery secret.
#[must_use]
pub fn new_recovery_bytes() -> Zeroizing<[u8; RECOVERY_SECRET_LEN]> {
    let mut raw = Zeroizing::new([0u8; RECOVERY_SECRET_LEN]);
    OsRng.fill_bytes(&mut raw[..]);
    raw
}

/// Compare two secrets without short-circuiting on the first differing byte.
#[must_use]
pub fn secrets_match(a: &[u8], b: &[u8]) -> bool {
    bool::from(a.ct_eq(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn opaque_tokens_are_url_safe_and_sized() {
        let token = new_opaque_token(|_| false);
        // 32 bytes -> 43 base64 characters without padding.
        assert_eq!(token.len(), 43);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn opaque_token_redraws_on_collision() {
        let mut calls = 0u32;
        let token = new_opaque_token(|_| {
            calls = calls.saturating_add(1);
            calls < 3
        });
        assert_eq!(calls, 3);
        assert_eq!(token.len(), 43);
    }

    #[test]
    fn opaque_tokens_do_not_repeat() {
        let mut seen = HashSet::new();
        for _ in 0..256 {
            let token = new_opaque_token(|t| seen.contains(t));
            assert!(seen.insert(token));
        }
    }

    #[test]
    fn recovery_bytes_are_fresh() {
        let a = new_recovery_bytes();
        let b = new_recovery_bytes();
        assert_eq!(a.len(), RECOVERY_SECRET_LEN);
        assert_ne!(*a, *b);
    }

    #[test]
    fn secrets_match_handles_length_mismatch() {
        assert!(secrets_match(b"abc", b"abc"));
        assert!(!secrets_match(b"abc", b"abd"));
        assert!(!secrets_match(b"abc", b"abcd"));
        assert!(!secrets_match(b"", b"a"));
    }
}
