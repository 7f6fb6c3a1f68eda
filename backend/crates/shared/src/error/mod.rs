//! Unified error handling
//!
//! - [`kind`] - error classification mapped to HTTP status codes
//! - [`app_error`] - the application-wide [`app_error::AppError`] type
//! - [`conversions`] - `From` implementations for common error types

pub mod app_error;
pub mod conversions;
pub mod kind;
