//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in the infrastructure
//! layer. Every method takes the request [`Context`]: implementations select
//! their executor through it, so calls transparently join an ambient
//! transaction when one is open.

use kernel::Context;

use crate::domain::entity::{NewSession, NewUser, Session, User};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a new user row, returning the generated id.
    ///
    /// A duplicate email surfaces as the underlying store error; callers map
    /// it to an already-exists condition.
    async fn create(&self, ctx: &Context, user: &NewUser) -> AuthResult<i64>;

    /// Find a live user by email.
    ///
    /// `NotFound` when no row matches or the row is tombstoned.
    async fn find_by_email(&self, ctx: &Context, email: &str) -> AuthResult<User>;
}

/// Session repository trait
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Insert a new session row
    async fn create(&self, ctx: &Context, session: &NewSession) -> AuthResult<()>;

    /// Find a live session by token.
    ///
    /// `NotFound` when no row matches or the row is tombstoned.
    async fn find_by_token(&self, ctx: &Context, token: &str) -> AuthResult<Session>;

    /// Soft-delete the session matching the token.
    ///
    /// `NotFound` when the token is absent or the session is already deleted.
    async fn delete_by_token(&self, ctx: &Context, token: &str) -> AuthResult<()>;
}
