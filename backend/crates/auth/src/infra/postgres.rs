//! PostgreSQL Repository Implementations
//!
//! Every query obtains its executor through the transaction coordinator, so
//! the same code runs against the pool or inside an ambient transaction.
//! Reads filter tombstoned rows; deletes only set the tombstone.

use std::future::Future;
use std::time::Instant;

use kernel::Context;
use sqlx::PgPool;
use sqlx::types::Json;

use crate::domain::entity::{NewSession, NewUser, Session, User};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::error::{AuthError, AuthResult, metric_label};
use crate::infra::metrics;
use crate::infra::tx::Tx;

/// PostgreSQL-backed user/session repository
#[derive(Clone)]
pub struct PgAuthRepository {
    db: Tx,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { db: Tx::new(pool) }
    }

    /// The transaction coordinator backing this repository.
    ///
    /// Units of work run through this coordinator see the repository's
    /// operations join their transaction.
    pub fn tx(&self) -> Tx {
        self.db.clone()
    }
}

/// Record latency and outcome for one persistence operation
async fn observed<T, F>(name: &'static str, op: F) -> AuthResult<T>
where
    F: Future<Output = AuthResult<T>>,
{
    let start = Instant::now();
    let result = op.await;
    metrics::observe_db(name, metric_label(result.as_ref().err()), start.elapsed());
    result
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn create(&self, ctx: &Context, user: &NewUser) -> AuthResult<i64> {
        observed("user_create", async {
            let id = self
                .db
                .db(ctx)
                .fetch_scalar(
                    sqlx::query_scalar(
                        "INSERT INTO users (email, passhash) VALUES ($1, $2) RETURNING id",
                    )
                    .bind(&user.email)
                    .bind(&user.passhash),
                )
                .await?;

            Ok(id)
        })
        .await
    }

    async fn find_by_email(&self, ctx: &Context, email: &str) -> AuthResult<User> {
        observed("user_get", async {
            let row = self
                .db
                .db(ctx)
                .fetch_optional(
                    sqlx::query_as::<_, User>(
                        r#"
                        SELECT
                            id,
                            created_at,
                            updated_at,
                            deleted_at,
                            email,
                            passhash
                        FROM users
                        WHERE email = $1 AND deleted_at IS NULL
                        "#,
                    )
                    .bind(email),
                )
                .await?;

            row.ok_or(AuthError::NotFound)
        })
        .await
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgAuthRepository {
    async fn create(&self, ctx: &Context, session: &NewSession) -> AuthResult<()> {
        observed("session_create", async {
            self.db
                .db(ctx)
                .execute(
                    sqlx::query("INSERT INTO sessions (user_id, token, extra) VALUES ($1, $2, $3)")
                        .bind(session.user_id)
                        .bind(&session.token)
                        .bind(Json(&session.extra)),
                )
                .await?;

            Ok(())
        })
        .await
    }

    async fn find_by_token(&self, ctx: &Context, token: &str) -> AuthResult<Session> {
        observed("session_get", async {
            let row = self
                .db
                .db(ctx)
                .fetch_optional(
                    sqlx::query_as::<_, Session>(
                        r#"
                        SELECT
                            id,
                            created_at,
                            updated_at,
                            deleted_at,
                            user_id,
                            token,
                            extra
                        FROM sessions
                        WHERE token = $1 AND deleted_at IS NULL
                        "#,
                    )
                    .bind(token),
                )
                .await?;

            row.ok_or(AuthError::NotFound)
        })
        .await
    }

    async fn delete_by_token(&self, ctx: &Context, token: &str) -> AuthResult<()> {
        observed("session_delete", async {
            let result = self
                .db
                .db(ctx)
                .execute(
                    sqlx::query(
                        r#"
                        UPDATE sessions
                        SET deleted_at = now(), updated_at = now()
                        WHERE token = $1 AND deleted_at IS NULL
                        "#,
                    )
                    .bind(token),
                )
                .await?;

            if result.rows_affected() == 0 {
                return Err(AuthError::NotFound);
            }

            Ok(())
        })
        .await
    }
}
