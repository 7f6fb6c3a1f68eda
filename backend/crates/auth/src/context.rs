//! Authenticated session propagation
//!
//! Binds the resolved [`Session`] into a request [`Context`] after a
//! successful check, and recovers it in protected handlers. The binding key
//! is private to this module, so it cannot collide with other context
//! bindings or be forged from outside.

use std::sync::Arc;

use kernel::Context;

use crate::domain::entity::session::Session;

/// Private context key for the authenticated session
#[derive(Clone)]
struct CurrentSession(Arc<Session>);

/// Bind a session into a derived context
///
/// The given context is not modified.
#[must_use]
pub fn with_session(ctx: &Context, session: Session) -> Context {
    ctx.with(CurrentSession(Arc::new(session)))
}

/// Get the authenticated session from a context, if one was bound
pub fn session(ctx: &Context) -> Option<&Session> {
    ctx.get::<CurrentSession>().map(|bound| bound.0.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::session::SessionExtra;
    use chrono::Utc;
    use sqlx::types::Json;

    fn sample_session() -> Session {
        Session {
            id: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
            user_id: 42,
            token: "token-1".to_string(),
            extra: Json(SessionExtra::default()),
        }
    }

    #[test]
    fn test_session_absent() {
        let ctx = Context::new();
        assert!(session(&ctx).is_none());
    }

    #[test]
    fn test_with_session_binds_derived_context_only() {
        let ctx = Context::new();
        let derived = with_session(&ctx, sample_session());

        assert_eq!(session(&derived).map(|s| s.user_id), Some(42));
        assert!(session(&ctx).is_none());
    }
}
