//! Register Use Case
//!
//! Creates a user and an initial session atomically (signup auto-login).

use std::sync::Arc;

use kernel::Context;
use platform::client::ClientInfo;
use platform::password::ClearTextPassword;
use platform::token;

use crate::application::session_cookie::SessionClaims;
use crate::domain::entity::{NewSession, NewUser, SessionExtra};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::error::{AuthError, AuthResult};
use crate::infra::tx::{Tx, TxOptions};

/// Register input
pub struct RegisterInput {
    pub email: String,
    pub password: String,
}

/// Register use case
pub struct RegisterUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    users: Arc<U>,
    sessions: Arc<S>,
    db: Tx,
}

impl<U, S> RegisterUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    pub fn new(users: Arc<U>, sessions: Arc<S>, db: Tx) -> Self {
        Self {
            users,
            sessions,
            db,
        }
    }

    /// Create the user row and its first session in one unit of work.
    ///
    /// Either both rows exist afterwards or neither does. A duplicate email
    /// maps to `AlreadyExists`; uniqueness is enforced at the storage
    /// boundary, not pre-checked.
    pub async fn execute(
        &self,
        ctx: &Context,
        input: RegisterInput,
        client: ClientInfo,
    ) -> AuthResult<SessionClaims> {
        let password = ClearTextPassword::new(input.password)?;
        let passhash = password
            .hash()
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .as_phc_string()
            .to_string();

        let new_user = NewUser {
            email: input.email,
            passhash,
        };
        let token = token::session_token();
        let extra = SessionExtra {
            ip: client.ip_string(),
            user_agent: client.user_agent_string(),
        };

        let result = self
            .db
            .with_tx(ctx, TxOptions::default(), |tx_ctx| {
                let users = self.users.clone();
                let sessions = self.sessions.clone();
                let new_user = new_user.clone();
                let token = token.clone();
                let extra = extra.clone();

                async move {
                    let user_id = users.create(&tx_ctx, &new_user).await?;

                    let session = NewSession {
                        user_id,
                        token: token.clone(),
                        extra,
                    };
                    sessions.create(&tx_ctx, &session).await?;

                    Ok(SessionClaims { token, user_id })
                }
            })
            .await;

        match result {
            Ok(claims) => {
                tracing::info!(user_id = claims.user_id, "User registered");
                Ok(claims)
            }
            Err(err) if err.is_unique_violation() => Err(AuthError::AlreadyExists),
            Err(err) => Err(err),
        }
    }
}
