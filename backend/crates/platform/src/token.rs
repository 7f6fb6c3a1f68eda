//! Session Token Generation
//!
//! Opaque bearer tokens: the token's only security property is that it is
//! unguessable. 256 bits from the OS CSPRNG, URL-safe base64 without padding.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;

/// Token length in random bytes before encoding
const TOKEN_BYTES: usize = 32;

/// Generate a new opaque session token
///
/// Collision-resistant and unpredictable; safe to use as the sole bearer
/// credential. The encoded form is cookie- and URL-safe.
pub fn session_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_token_length() {
        // 32 bytes -> 43 base64 chars without padding
        assert_eq!(session_token().len(), 43);
    }

    #[test]
    fn test_token_is_url_safe() {
        let token = session_token();
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_tokens_do_not_repeat() {
        let tokens: HashSet<String> = (0..1000).map(|_| session_token()).collect();
        assert_eq!(tokens.len(), 1000);
    }
}
