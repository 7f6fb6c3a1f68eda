//! Auth Router

use axum::body::Body;
use axum::http::Request;
use axum::response::IntoResponse;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use kernel::AppError;

use crate::application::config::AuthConfig;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{self, BoxHandler, UnauthorizedResponder};

/// Create the Auth router with PostgreSQL repository
pub fn auth_router(repo: PgAuthRepository, config: AuthConfig) -> Router {
    let repo = Arc::new(repo);
    let state = AuthAppState {
        users: repo.clone(),
        sessions: repo.clone(),
        db: repo.tx(),
        config: Arc::new(config),
    };

    auth_router_generic(state)
}

/// Create a generic Auth router for any repository implementation
pub fn auth_router_generic<U, S>(state: AuthAppState<U, S>) -> Router
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
{
    let unauthorized: UnauthorizedResponder =
        Arc::new(|| AppError::unauthorized("authentication required").into_response());

    let gate = middleware::session_gate(state.sessions.clone(), state.config.clone(), unauthorized);

    // Protected handlers run through the middleware chain; the gate is the
    // outermost (and only) interceptor.
    let user_get: BoxHandler = Arc::new(|req| Box::pin(handlers::user_get(req)));
    let user_get = middleware::chain(user_get, vec![gate]);

    Router::new()
        // anonymous methods
        .route("/user/authorize", post(handlers::authorize::<U, S>))
        .route("/user/register", post(handlers::register::<U, S>))
        .route("/user/logout", post(handlers::logout::<U, S>))
        // auth methods
        .route(
            "/user",
            get(move |req: Request<Body>| {
                let handler = user_get.clone();
                async move { handler(req).await }
            }),
        )
        .with_state(state)
}
