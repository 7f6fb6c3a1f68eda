//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database implementations, transaction coordinator, metrics
//! - `presentation/` - HTTP handlers, DTOs, middleware, router
//!
//! ## Features
//! - Email + password login with server-side sessions
//! - Opaque bearer-token cookies (HttpOnly, long-lived)
//! - Ambient transactions: persistence calls join an open transaction
//!   carried in the request [`kernel::Context`] without explicit handles
//! - Soft-deleted rows are tombstones; every read filters them out
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, verified in constant time
//! - Session tokens are 256-bit CSPRNG values; the cookie payload is opaque
//!   and its authority is the server-side token lookup
//! - Login failures never reveal whether the email or the password was wrong

pub mod application;
pub mod context;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgAuthRepository;
pub use infra::tx::{Db, IsolationLevel, Tx, TxOptions};
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}

pub mod router {
    pub use crate::presentation::router::*;
}
