//! HTTP Handlers

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use kernel::Context;
use platform::client::extract_client_info;
use platform::cookie;

use crate::application::config::AuthConfig;
use crate::application::{
    LoginInput, LoginUseCase, LogoutUseCase, RegisterInput, RegisterUseCase, session_cookie,
};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::error::{AuthError, AuthResult};
use crate::infra::tx::Tx;
use crate::presentation::dto::{
    AuthorizeRequest, RegisterRequest, SessionResponse, UserResponse,
};

/// Shared state for auth handlers
pub struct AuthAppState<U, S>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
{
    pub users: Arc<U>,
    pub sessions: Arc<S>,
    pub db: Tx,
    pub config: Arc<AuthConfig>,
}

impl<U, S> Clone for AuthAppState<U, S>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
            sessions: self.sessions.clone(),
            db: self.db.clone(),
            config: self.config.clone(),
        }
    }
}

// ============================================================================
// Authorize (login)
// ============================================================================

/// POST /user/authorize
pub async fn authorize<U, S>(
    State(state): State<AuthAppState<U, S>>,
    headers: HeaderMap,
    Json(req): Json<AuthorizeRequest>,
) -> AuthResult<impl IntoResponse>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
{
    req.validate()?;

    let ctx = Context::new();
    let client = extract_client_info(&headers, None);

    let use_case = LoginUseCase::new(state.users.clone(), state.sessions.clone());

    let input = LoginInput {
        email: req.email,
        password: req.pass,
    };

    let claims = match use_case.execute(&ctx, input, client).await {
        Ok(claims) => claims,
        // One response for unknown email and wrong password
        Err(err) if err.is_not_found() || err.is_not_allowed() => {
            return Err(AuthError::NotAllowed);
        }
        Err(err) => return Err(err),
    };

    let cookie_value = session_cookie::encode(&claims)?;
    let cookie = cookie::set_cookie_header(&state.config.cookie(), &cookie_value);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(SessionResponse {
            user_id: claims.user_id,
        }),
    ))
}

// ============================================================================
// Register
// ============================================================================

/// POST /user/register
pub async fn register<U, S>(
    State(state): State<AuthAppState<U, S>>,
    headers: HeaderMap,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
{
    req.validate()?;

    let ctx = Context::new();
    let client = extract_client_info(&headers, None);

    let use_case = RegisterUseCase::new(
        state.users.clone(),
        state.sessions.clone(),
        state.db.clone(),
    );

    let input = RegisterInput {
        email: req.email,
        password: req.pass,
    };

    let claims = use_case.execute(&ctx, input, client).await?;

    let cookie_value = session_cookie::encode(&claims)?;
    let cookie = cookie::set_cookie_header(&state.config.cookie(), &cookie_value);

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(SessionResponse {
            user_id: claims.user_id,
        }),
    ))
}

// ============================================================================
// Logout
// ============================================================================

/// POST /user/logout
pub async fn logout<U, S>(
    State(state): State<AuthAppState<U, S>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
{
    let ctx = Context::new();

    let token = cookie::extract_cookie(&headers, &state.config.session_cookie_name)
        .and_then(|value| session_cookie::decode(&value).ok())
        .map(|claims| claims.token);

    if let Some(token) = token {
        let use_case = LogoutUseCase::new(state.sessions.clone());
        // Ignore errors - just clear the cookie
        let _ = use_case.execute(&ctx, &token).await;
    }

    let cookie = state.config.cookie().build_delete_cookie();

    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]))
}

// ============================================================================
// User (protected)
// ============================================================================

/// GET /user - runs behind the session gate.
///
/// The authenticated session is recovered from the context the gate bound
/// into the request; there is no other channel.
pub async fn user_get(req: Request<Body>) -> Response {
    let ctx = req
        .extensions()
        .get::<Context>()
        .cloned()
        .unwrap_or_default();

    match crate::context::session(&ctx) {
        Some(session) => Json(UserResponse {
            id: session.user_id,
        })
        .into_response(),
        // Gate not applied or binding missing: refuse rather than guess
        None => AuthError::Unauthenticated.into_response(),
    }
}
