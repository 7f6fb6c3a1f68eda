//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// POST /user/authorize request
#[derive(Deserialize)]
pub struct AuthorizeRequest {
    pub email: String,
    pub pass: String,
}

impl AuthorizeRequest {
    pub fn validate(&self) -> AuthResult<()> {
        if self.email.is_empty() {
            return Err(AuthError::Validation("email should not be empty".into()));
        }
        if self.pass.is_empty() {
            return Err(AuthError::Validation("pass should not be empty".into()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for AuthorizeRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizeRequest")
            .field("email", &self.email)
            .field("pass", &"[REDACTED]")
            .finish()
    }
}

/// POST /user/register request
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub pass: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> AuthResult<()> {
        if self.email.is_empty() {
            return Err(AuthError::Validation("email should not be empty".into()));
        }
        if self.pass.is_empty() {
            return Err(AuthError::Validation("pass should not be empty".into()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("pass", &"[REDACTED]")
            .finish()
    }
}

/// Session identity returned after login/register
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user_id: i64,
}

/// GET /user response
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
}
