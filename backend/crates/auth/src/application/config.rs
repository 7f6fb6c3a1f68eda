//! Application Configuration
//!
//! Configuration for the Auth application layer. Plain named fields with
//! documented defaults; construct with struct update syntax to override.

use std::time::Duration;

use platform::cookie::CookieConfig;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session cookie name (default: `user_session`)
    pub session_cookie_name: String,
    /// Cookie lifetime from issuance (default: 90 days)
    pub cookie_ttl: Duration,
    /// Whether to require the Secure cookie attribute (default: true)
    pub cookie_secure: bool,
    /// SameSite policy (default: Lax)
    pub cookie_same_site: SameSite,
    /// Cookie path scope (default: `/`, the whole application)
    pub cookie_path: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "user_session".to_string(),
            cookie_ttl: Duration::from_secs(90 * 24 * 3600),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            cookie_path: "/".to_string(),
        }
    }
}

impl AuthConfig {
    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Default::default()
        }
    }

    /// The session cookie configuration.
    ///
    /// Always HttpOnly: the cookie is a bearer credential and must be
    /// inaccessible to scripts.
    pub fn cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.session_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: self.cookie_path.clone(),
            max_age_secs: Some(self.cookie_ttl.as_secs() as i64),
        }
    }
}
