//! Kernel Crate - Shared Foundations
//!
//! Project-wide building blocks with no business logic:
//! - `error` - unified error classification ([`error::app_error::AppError`])
//! - `context` - request-scoped typed value propagation ([`context::Context`])

pub mod context;
pub mod error;

pub use context::Context;
pub use error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
