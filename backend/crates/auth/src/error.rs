//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// No matching row, or the row is soft-deleted
    #[error("not found")]
    NotFound,

    /// Credential mismatch or unresolvable session.
    /// Deliberately one kind for both, so responses don't leak which check failed.
    #[error("not allowed")]
    NotAllowed,

    /// No credential presented, or the cookie payload could not be decoded
    #[error("unauthenticated")]
    Unauthenticated,

    /// Uniqueness violation surfaced from storage
    #[error("already exists")]
    AlreadyExists,

    /// Nested transaction attempt. Structural misuse, not a runtime condition.
    #[error("transaction already open")]
    AlreadyInTransaction,

    /// Opening a transaction failed
    #[error("begin transaction: {source}")]
    TxBegin {
        #[source]
        source: sqlx::Error,
    },

    /// Commit failed. The connection rolls the transaction back on drop.
    #[error("commit transaction: {source}")]
    TxCommit {
        #[source]
        source: sqlx::Error,
    },

    /// The unit of work failed and the rollback failed too.
    /// `cause` stays the primary error identity; see [`AuthError::root`].
    #[error("rollback failed ({rollback}) after: {cause}")]
    TxRollback {
        #[source]
        cause: Box<AuthError>,
        rollback: sqlx::Error,
    },

    /// Request validation error
    #[error("validation failed: {0}")]
    Validation(String),

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Unwrap composite transaction errors down to the original cause.
    ///
    /// Callers test error classes against the result of this method, so a
    /// failed rollback never masks what actually went wrong.
    pub fn root(&self) -> &AuthError {
        match self {
            AuthError::TxRollback { cause, .. } => cause.root(),
            other => other,
        }
    }

    /// The root cause is `NotFound`
    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), AuthError::NotFound)
    }

    /// The root cause is the stable `NotAllowed` kind
    pub fn is_not_allowed(&self) -> bool {
        matches!(self.root(), AuthError::NotAllowed)
    }

    /// The root cause is a storage uniqueness violation
    pub fn is_unique_violation(&self) -> bool {
        match self.root() {
            AuthError::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self.root() {
            AuthError::NotFound => ErrorKind::NotFound,
            AuthError::NotAllowed => ErrorKind::Forbidden,
            AuthError::Unauthenticated => ErrorKind::Unauthorized,
            AuthError::AlreadyExists => ErrorKind::Conflict,
            AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::AlreadyInTransaction
            | AuthError::TxBegin { .. }
            | AuthError::TxCommit { .. }
            | AuthError::TxRollback { .. }
            | AuthError::Database(_)
            | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::TxBegin { .. } | AuthError::TxCommit { .. } | AuthError::TxRollback { .. } => {
                tracing::error!(error = %self, "Transaction error");
            }
            AuthError::AlreadyInTransaction => {
                tracing::error!("Nested transaction attempt");
            }
            AuthError::NotAllowed | AuthError::Unauthenticated => {
                tracing::debug!(error = %self, "Auth rejected");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

/// Outcome label for the persistence histogram.
///
/// Stable low-cardinality values; `""` marks success.
pub(crate) fn metric_label(err: Option<&AuthError>) -> &'static str {
    match err.map(AuthError::root) {
        None => "",
        Some(AuthError::NotFound) => "not found",
        Some(AuthError::NotAllowed) => "not allowed",
        Some(AuthError::AlreadyExists) => "already exists",
        Some(_) => "internal error",
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<platform::password::PasswordPolicyError> for AuthError {
    fn from(err: platform::password::PasswordPolicyError) -> Self {
        AuthError::Validation(err.to_string())
    }
}
