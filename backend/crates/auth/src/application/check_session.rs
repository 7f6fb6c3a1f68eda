//! Check Session Use Case
//!
//! Resolves a session cookie into an authenticated context.

use std::sync::Arc;

use kernel::Context;

use crate::application::session_cookie;
use crate::domain::repository::SessionRepository;
use crate::error::{AuthError, AuthResult};

/// Check session use case
pub struct CheckSessionUseCase<S>
where
    S: SessionRepository,
{
    sessions: Arc<S>,
}

impl<S> CheckSessionUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(sessions: Arc<S>) -> Self {
        Self { sessions }
    }

    /// Validate the presented cookie and bind the session into a derived
    /// context. The incoming context is never modified.
    ///
    /// Failure classes stay distinct internally:
    /// - no cookie, or an undecodable payload → `Unauthenticated`
    /// - token that resolves to no live session → `NotAllowed` (the stable
    ///   kind the middleware treats as expected noise)
    /// - anything else is a real store error and propagates as such
    pub async fn execute(&self, ctx: &Context, cookie_value: Option<&str>) -> AuthResult<Context> {
        let raw = cookie_value.ok_or(AuthError::Unauthenticated)?;

        let claims = session_cookie::decode(raw)?;

        let session = match self.sessions.find_by_token(ctx, &claims.token).await {
            Ok(session) => session,
            Err(err) if err.is_not_found() => return Err(AuthError::NotAllowed),
            Err(err) => return Err(err),
        };

        Ok(crate::context::with_session(ctx, session))
    }
}
