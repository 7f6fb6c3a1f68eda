//! Login Use Case
//!
//! Verifies credentials and creates a session.

use std::sync::Arc;

use kernel::Context;
use platform::client::ClientInfo;
use platform::password::{ClearTextPassword, HashedPassword};
use platform::token;

use crate::application::session_cookie::SessionClaims;
use crate::domain::entity::{NewSession, SessionExtra};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::error::{AuthError, AuthResult};

/// Login input
///
/// Submitted credentials exist only for the duration of the request and are
/// never persisted.
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Login use case
pub struct LoginUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    users: Arc<U>,
    sessions: Arc<S>,
}

impl<U, S> LoginUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    pub fn new(users: Arc<U>, sessions: Arc<S>) -> Self {
        Self { users, sessions }
    }

    /// Authenticate and open a session.
    ///
    /// `NotFound` on an unknown email propagates unmapped; the handler
    /// decides how much to reveal. A wrong password is `NotAllowed`.
    pub async fn execute(
        &self,
        ctx: &Context,
        input: LoginInput,
        client: ClientInfo,
    ) -> AuthResult<SessionClaims> {
        let user = self.users.find_by_email(ctx, &input.email).await?;

        let password = ClearTextPassword::new(input.password).map_err(|_| AuthError::NotAllowed)?;

        let hash = HashedPassword::from_phc_string(&user.passhash)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        if !hash.verify(&password) {
            return Err(AuthError::NotAllowed);
        }

        let session = NewSession {
            user_id: user.id,
            token: token::session_token(),
            extra: SessionExtra {
                ip: client.ip_string(),
                user_agent: client.user_agent_string(),
            },
        };

        self.sessions.create(ctx, &session).await?;

        tracing::info!(user_id = user.id, "User logged in");

        Ok(SessionClaims {
            token: session.token,
            user_id: user.id,
        })
    }
}
