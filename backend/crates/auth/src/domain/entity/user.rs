//! User Entity

use chrono::{DateTime, Utc};

/// Identity record
///
/// Email is the login key; `passhash` is the Argon2id PHC string and is never
/// transmitted or logged. The auth pipeline only ever reads users; deletion
/// is logical, by setting `deleted_at`.
#[derive(Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub email: String,
    pub passhash: String,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .field("deleted_at", &self.deleted_at)
            .field("email", &self.email)
            .field("passhash", &"[REDACTED]")
            .finish()
    }
}

/// Fields for inserting a new user row
#[derive(Clone)]
pub struct NewUser {
    pub email: String,
    pub passhash: String,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("passhash", &"[REDACTED]")
            .finish()
    }
}
