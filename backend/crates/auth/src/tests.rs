//! Unit tests for the auth pipeline
//!
//! Use cases and the router run against an in-memory repository; the
//! fixtures honor the tombstone invariant the same way the SQL does.

use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use kernel::Context;
use sqlx::types::Json;

use crate::domain::entity::{NewSession, NewUser, Session, SessionExtra, User};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::error::{AuthError, AuthResult};

/// In-memory repository honoring soft deletes: reads skip tombstoned rows,
/// deletes only set the tombstone.
#[derive(Default)]
pub struct MemRepository {
    next_id: AtomicI64,
    users: Mutex<Vec<User>>,
    sessions: Mutex<Vec<Session>>,
}

impl MemRepository {
    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn seed_user(&self, email: &str, passhash: &str) -> i64 {
        let id = self.next_id();
        self.users.lock().unwrap().push(User {
            id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
            email: email.to_string(),
            passhash: passhash.to_string(),
        });
        id
    }

    /// Count of live (non-tombstoned) sessions
    pub fn live_session_count(&self) -> usize {
        self.sessions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.deleted_at.is_none())
            .count()
    }

    pub fn live_session(&self, token: &str) -> Option<Session> {
        self.sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.token == token && s.deleted_at.is_none())
            .cloned()
    }

    /// Fixture-level soft delete
    pub fn tombstone_session(&self, token: &str) {
        let mut sessions = self.sessions.lock().unwrap();
        if let Some(session) = sessions.iter_mut().find(|s| s.token == token) {
            session.deleted_at = Some(Utc::now());
        }
    }
}

impl UserRepository for MemRepository {
    async fn create(&self, _ctx: &Context, user: &NewUser) -> AuthResult<i64> {
        let exists = self
            .users
            .lock()
            .unwrap()
            .iter()
            .any(|u| u.email == user.email);
        if exists {
            return Err(AuthError::AlreadyExists);
        }

        Ok(self.seed_user(&user.email, &user.passhash))
    }

    async fn find_by_email(&self, _ctx: &Context, email: &str) -> AuthResult<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email && u.deleted_at.is_none())
            .cloned()
            .ok_or(AuthError::NotFound)
    }
}

impl SessionRepository for MemRepository {
    async fn create(&self, _ctx: &Context, session: &NewSession) -> AuthResult<()> {
        let id = self.next_id();
        self.sessions.lock().unwrap().push(Session {
            id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
            user_id: session.user_id,
            token: session.token.clone(),
            extra: Json(session.extra.clone()),
        });
        Ok(())
    }

    async fn find_by_token(&self, _ctx: &Context, token: &str) -> AuthResult<Session> {
        self.live_session(token).ok_or(AuthError::NotFound)
    }

    async fn delete_by_token(&self, _ctx: &Context, token: &str) -> AuthResult<()> {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions
            .iter_mut()
            .find(|s| s.token == token && s.deleted_at.is_none())
        {
            Some(session) => {
                session.deleted_at = Some(Utc::now());
                session.updated_at = Utc::now();
                Ok(())
            }
            None => Err(AuthError::NotFound),
        }
    }
}

// ============================================================================
// Use case tests
// ============================================================================

mod use_cases {
    use super::*;
    use crate::application::{
        CheckSessionUseCase, LoginInput, LoginUseCase, LogoutUseCase, session_cookie,
    };
    use platform::client::ClientInfo;
    use platform::password::ClearTextPassword;
    use std::sync::Arc;

    const GOOD_PASSWORD: &str = "correct horse battery";

    fn seeded_repo() -> (Arc<MemRepository>, i64) {
        let repo = Arc::new(MemRepository::default());
        let passhash = ClearTextPassword::new(GOOD_PASSWORD.to_string())
            .unwrap()
            .hash()
            .unwrap()
            .as_phc_string()
            .to_string();
        let user_id = repo.seed_user("a@x.com", &passhash);
        (repo, user_id)
    }

    fn login_use_case(repo: &Arc<MemRepository>) -> LoginUseCase<MemRepository, MemRepository> {
        LoginUseCase::new(repo.clone(), repo.clone())
    }

    #[tokio::test]
    async fn test_login_unknown_email_is_not_found_and_persists_nothing() {
        let (repo, _) = seeded_repo();
        let ctx = Context::new();

        let result = login_use_case(&repo)
            .execute(
                &ctx,
                LoginInput {
                    email: "nobody@x.com".into(),
                    password: GOOD_PASSWORD.into(),
                },
                ClientInfo::default(),
            )
            .await;

        assert!(result.unwrap_err().is_not_found());
        assert_eq!(repo.live_session_count(), 0);
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_not_allowed_and_persists_nothing() {
        let (repo, _) = seeded_repo();
        let ctx = Context::new();

        let result = login_use_case(&repo)
            .execute(
                &ctx,
                LoginInput {
                    email: "a@x.com".into(),
                    password: "wrong horse battery".into(),
                },
                ClientInfo::default(),
            )
            .await;

        assert!(result.unwrap_err().is_not_allowed());
        assert_eq!(repo.live_session_count(), 0);
    }

    #[tokio::test]
    async fn test_login_success_persists_one_session_with_matching_token() {
        let (repo, user_id) = seeded_repo();
        let ctx = Context::new();

        let claims = login_use_case(&repo)
            .execute(
                &ctx,
                LoginInput {
                    email: "a@x.com".into(),
                    password: GOOD_PASSWORD.into(),
                },
                ClientInfo::default(),
            )
            .await
            .unwrap();

        assert_eq!(claims.user_id, user_id);
        assert_eq!(repo.live_session_count(), 1);

        let stored = repo.live_session(&claims.token).unwrap();
        assert_eq!(stored.user_id, user_id);
        assert_eq!(stored.token, claims.token);
    }

    #[tokio::test]
    async fn test_concurrent_logins_issue_distinct_tokens() {
        let (repo, _) = seeded_repo();
        let ctx = Context::new();
        let use_case = login_use_case(&repo);

        let input = || LoginInput {
            email: "a@x.com".into(),
            password: GOOD_PASSWORD.into(),
        };

        let first = use_case
            .execute(&ctx, input(), ClientInfo::default())
            .await
            .unwrap();
        let second = use_case
            .execute(&ctx, input(), ClientInfo::default())
            .await
            .unwrap();

        // Multi-session support: both logins stand, tokens never repeat
        assert_eq!(repo.live_session_count(), 2);
        assert_ne!(first.token, second.token);
    }

    #[tokio::test]
    async fn test_check_binds_session_into_derived_context() {
        let (repo, user_id) = seeded_repo();
        let ctx = Context::new();

        let claims = login_use_case(&repo)
            .execute(
                &ctx,
                LoginInput {
                    email: "a@x.com".into(),
                    password: GOOD_PASSWORD.into(),
                },
                ClientInfo::default(),
            )
            .await
            .unwrap();

        let cookie_value = session_cookie::encode(&claims).unwrap();

        let check = CheckSessionUseCase::new(repo.clone());
        let session_ctx = check
            .execute(&ctx, Some(cookie_value.as_str()))
            .await
            .unwrap();

        let session = crate::context::session(&session_ctx).unwrap();
        assert_eq!(session.user_id, user_id);

        // The original context is untouched
        assert!(crate::context::session(&ctx).is_none());
    }

    #[tokio::test]
    async fn test_check_missing_cookie_is_unauthenticated() {
        let (repo, _) = seeded_repo();
        let check = CheckSessionUseCase::new(repo);

        let err = check.execute(&Context::new(), None).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_check_undecodable_cookie_is_unauthenticated() {
        let (repo, _) = seeded_repo();
        let check = CheckSessionUseCase::new(repo);

        let err = check
            .execute(&Context::new(), Some("%%% not a cookie %%%"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_check_unknown_token_is_not_allowed() {
        let (repo, _) = seeded_repo();
        let check = CheckSessionUseCase::new(repo);

        let cookie_value = session_cookie::encode(&session_cookie::SessionClaims {
            token: "syntactically-fine-but-unknown".into(),
            user_id: 1,
        })
        .unwrap();

        let err = check
            .execute(&Context::new(), Some(cookie_value.as_str()))
            .await
            .unwrap_err();

        // The stable kind the gate recognizes as expected noise
        assert!(err.is_not_allowed());
    }

    #[tokio::test]
    async fn test_check_tombstoned_session_never_authenticates() {
        let (repo, _) = seeded_repo();
        let ctx = Context::new();

        let claims = login_use_case(&repo)
            .execute(
                &ctx,
                LoginInput {
                    email: "a@x.com".into(),
                    password: GOOD_PASSWORD.into(),
                },
                ClientInfo::default(),
            )
            .await
            .unwrap();

        repo.tombstone_session(&claims.token);

        let cookie_value = session_cookie::encode(&claims).unwrap();
        let check = CheckSessionUseCase::new(repo.clone());
        let err = check
            .execute(&ctx, Some(cookie_value.as_str()))
            .await
            .unwrap_err();

        assert!(err.is_not_allowed());
    }

    #[tokio::test]
    async fn test_logout_twice_fails_second_time_with_not_found() {
        let (repo, user_id) = seeded_repo();
        let ctx = Context::new();

        SessionRepository::create(
            &*repo,
            &ctx,
            &NewSession {
                user_id,
                token: "token-once".into(),
                extra: SessionExtra::default(),
            },
        )
        .await
        .unwrap();

        let logout = LogoutUseCase::new(repo.clone());

        logout.execute(&ctx, "token-once").await.unwrap();
        assert_eq!(repo.live_session_count(), 0);

        let err = logout.execute(&ctx, "token-once").await.unwrap_err();
        assert!(err.is_not_found());
    }
}

// ============================================================================
// Router tests
// ============================================================================

mod router {
    use super::*;
    use crate::application::config::AuthConfig;
    use crate::application::session_cookie::{self, SessionClaims};
    use crate::infra::tx::Tx;
    use crate::presentation::handlers::AuthAppState;
    use crate::presentation::router::auth_router_generic;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use platform::password::ClearTextPassword;
    use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
    use std::sync::Arc;
    use tower::ServiceExt;

    const GOOD_PASSWORD: &str = "correct horse battery";

    fn test_app() -> (Router, Arc<MemRepository>, i64) {
        let repo = Arc::new(MemRepository::default());
        let passhash = ClearTextPassword::new(GOOD_PASSWORD.to_string())
            .unwrap()
            .hash()
            .unwrap()
            .as_phc_string()
            .to_string();
        let user_id = repo.seed_user("a@x.com", &passhash);

        let state = AuthAppState {
            users: repo.clone(),
            sessions: repo.clone(),
            // Never connects; the in-memory repository ignores executors
            db: Tx::new(PgPoolOptions::new().connect_lazy_with(PgConnectOptions::new())),
            config: Arc::new(AuthConfig::default()),
        };

        (auth_router_generic(state), repo, user_id)
    }

    fn authorize_request(email: &str, pass: &str) -> Request<Body> {
        let body = serde_json::json!({ "email": email, "pass": pass }).to_string();
        Request::builder()
            .method("POST")
            .uri("/user/authorize")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    fn cookie_from_response(set_cookie: &str) -> String {
        let (pair, _attrs) = set_cookie.split_once(';').unwrap_or((set_cookie, ""));
        pair.trim().to_string()
    }

    #[tokio::test]
    async fn test_authorize_sets_cookie_and_user_endpoint_sees_session() {
        let (app, repo, user_id) = test_app();

        let response = app
            .clone()
            .oneshot(authorize_request("a@x.com", GOOD_PASSWORD))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("Path=/"));

        // Cookie payload decodes to the persisted token
        let cookie_pair = cookie_from_response(&set_cookie);
        let (_name, value) = cookie_pair.split_once('=').unwrap();
        let claims = session_cookie::decode(value).unwrap();
        assert_eq!(claims.user_id, user_id);
        assert!(repo.live_session(&claims.token).is_some());

        // A subsequent request with that cookie reaches the protected handler
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/user")
                    .header(header::COOKIE, cookie_pair)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["id"], serde_json::json!(user_id));
    }

    #[tokio::test]
    async fn test_authorize_wrong_password_is_generic_forbidden() {
        let (app, repo, _) = test_app();

        let response = app
            .clone()
            .oneshot(authorize_request("a@x.com", "wrong horse battery"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        // Unknown email gets the same response; nothing to enumerate
        let response = app
            .oneshot(authorize_request("nobody@x.com", GOOD_PASSWORD))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        assert_eq!(repo.live_session_count(), 0);
    }

    #[tokio::test]
    async fn test_user_without_cookie_is_unauthorized() {
        let (app, _, _) = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/user")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_user_with_unknown_token_is_unauthorized() {
        let (app, _, _) = test_app();

        let cookie_value = session_cookie::encode(&SessionClaims {
            token: "unknown-token".into(),
            user_id: 1,
        })
        .unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/user")
                    .header(header::COOKIE, format!("user_session={cookie_value}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_tombstones_session_and_clears_cookie() {
        let (app, repo, _) = test_app();

        let response = app
            .clone()
            .oneshot(authorize_request("a@x.com", GOOD_PASSWORD))
            .await
            .unwrap();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let cookie_pair = cookie_from_response(&set_cookie);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/user/logout")
                    .header(header::COOKIE, cookie_pair.clone())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let cleared = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(cleared.contains("Max-Age=0"));
        assert_eq!(repo.live_session_count(), 0);

        // The old cookie no longer admits requests
        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/user")
                    .header(header::COOKIE, cookie_pair)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
