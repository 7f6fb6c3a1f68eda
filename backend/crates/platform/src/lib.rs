//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Password hashing (Argon2id, salted, adaptive cost)
//! - Session token generation
//! - Cookie management
//! - Client metadata extraction

pub mod client;
pub mod cookie;
pub mod password;
pub mod token;
