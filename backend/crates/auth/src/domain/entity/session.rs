//! Session Entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

/// A single authenticated login instance
///
/// The token is the sole bearer credential: random, globally unique, never
/// reused across sessions. A session authenticates only while `deleted_at`
/// is null; logout sets the tombstone instead of removing the row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub user_id: i64,
    pub token: String,
    /// Audit metadata captured at creation, stored as an opaque JSON blob
    pub extra: Json<SessionExtra>,
}

/// Client metadata recorded with each session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionExtra {
    pub ip: String,
    pub user_agent: String,
}

/// Fields for inserting a new session row
#[derive(Debug, Clone)]
pub struct NewSession {
    pub user_id: i64,
    pub token: String,
    pub extra: SessionExtra,
}
