//! Logout Use Case
//!
//! Invalidates a session by tombstoning its row.

use std::sync::Arc;

use kernel::Context;

use crate::domain::repository::SessionRepository;
use crate::error::AuthResult;

/// Logout use case
pub struct LogoutUseCase<S>
where
    S: SessionRepository,
{
    sessions: Arc<S>,
}

impl<S> LogoutUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(sessions: Arc<S>) -> Self {
        Self { sessions }
    }

    /// Soft-delete the session matching the token.
    ///
    /// `NotFound` when the token is unknown or the session was already
    /// logged out; invalidation is not idempotent by design.
    pub async fn execute(&self, ctx: &Context, token: &str) -> AuthResult<()> {
        self.sessions.delete_by_token(ctx, token).await?;

        tracing::info!("User logged out");
        Ok(())
    }
}
