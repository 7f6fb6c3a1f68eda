//! Session Cookie Payload Codec
//!
//! The cookie value is a URL-safe base64 encoding of the JSON claims. It is
//! opaque by convention, not signed: its authority is the server-side token
//! lookup, never the payload itself.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// Session identity carried by the cookie
///
/// Enough to reconstruct the lookup: the bearer token, plus the owning user
/// for diagnostics. Nothing else from the session row leaves the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub token: String,
    pub user_id: i64,
}

/// Encode claims into a cookie value
pub fn encode(claims: &SessionClaims) -> AuthResult<String> {
    let data = serde_json::to_vec(claims).map_err(|e| AuthError::Internal(e.to_string()))?;
    Ok(URL_SAFE.encode(data))
}

/// Decode a cookie value back into claims.
///
/// Any malformed input fails with `Unauthenticated`; the caller cannot tell
/// a corrupt cookie from a missing one externally.
pub fn decode(value: &str) -> AuthResult<SessionClaims> {
    let data = URL_SAFE
        .decode(value)
        .map_err(|_| AuthError::Unauthenticated)?;

    serde_json::from_slice(&data).map_err(|_| AuthError::Unauthenticated)
}
