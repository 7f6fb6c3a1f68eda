//! Middleware Chain
//!
//! A middleware transforms a next-handler into a handler (decorator
//! composition). [`chain`] applies middlewares right-to-left so the first
//! listed one is outermost. The session gate wraps the check-session use
//! case as an admission gate in front of protected handlers.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use kernel::Context;

use crate::application::CheckSessionUseCase;
use crate::application::config::AuthConfig;
use crate::domain::repository::SessionRepository;

/// Boxed response future of a handler
pub type HandlerFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// A request handler as a shareable value
pub type BoxHandler = Arc<dyn Fn(Request<Body>) -> HandlerFuture + Send + Sync>;

/// A middleware: wraps the next handler, returning a new handler
pub type Middleware = Box<dyn Fn(BoxHandler) -> BoxHandler + Send + Sync>;

/// Response producer invoked when the gate refuses a request
pub type UnauthorizedResponder = Arc<dyn Fn() -> Response + Send + Sync>;

/// Compose middlewares around a handler.
///
/// Applied right-to-left: the first middleware in the list becomes the
/// outermost wrapper, i.e. runs first on each request.
pub fn chain(handler: BoxHandler, middlewares: Vec<Middleware>) -> BoxHandler {
    middlewares
        .into_iter()
        .rev()
        .fold(handler, |wrapped, middleware| middleware(wrapped))
}

/// Admission gate requiring a valid session.
///
/// On success the wrapped handler runs with the session-bound context stored
/// in the request extensions. On failure the handler never runs; the
/// caller-supplied responder produces the response. Failures of the stable
/// not-allowed kind (expired or unknown tokens) are expected, high-frequency
/// noise and skip error-level logging; everything else is logged.
pub fn session_gate<S>(
    sessions: Arc<S>,
    config: Arc<AuthConfig>,
    unauthorized: UnauthorizedResponder,
) -> Middleware
where
    S: SessionRepository + Send + Sync + 'static,
{
    Box::new(move |next: BoxHandler| {
        let sessions = sessions.clone();
        let config = config.clone();
        let unauthorized = unauthorized.clone();

        Arc::new(move |mut req: Request<Body>| {
            let sessions = sessions.clone();
            let config = config.clone();
            let unauthorized = unauthorized.clone();
            let next = next.clone();

            Box::pin(async move {
                let ctx = req
                    .extensions()
                    .get::<Context>()
                    .cloned()
                    .unwrap_or_default();

                let cookie =
                    platform::cookie::extract_cookie(req.headers(), &config.session_cookie_name);

                let check = CheckSessionUseCase::new(sessions);

                match check.execute(&ctx, cookie.as_deref()).await {
                    Ok(session_ctx) => {
                        req.extensions_mut().insert(session_ctx);
                        next(req).await
                    }
                    Err(err) => {
                        if !err.is_not_allowed() {
                            tracing::error!(error = %err, "session validate");
                        }

                        unauthorized()
                    }
                }
            })
        })
    })
}
