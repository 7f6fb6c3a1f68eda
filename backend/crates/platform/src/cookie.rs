//! Bearer Cookie Handling
//!
//! Building and parsing of the session credential cookie. The value stored
//! here is an opaque bearer payload; this module only deals with transport
//! attributes (HttpOnly, Secure, SameSite, Path, Max-Age), never with the
//! payload's meaning.

use axum::http::{HeaderMap, HeaderValue, header};

/// SameSite attribute of a cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Transport attributes of the credential cookie
///
/// `max_age_secs: None` yields a session cookie (dropped when the browser
/// closes); a bearer credential normally carries a long explicit lifetime.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub path: String,
    pub max_age_secs: Option<i64>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "session".to_string(),
            secure: true,
            http_only: true,
            same_site: SameSite::Lax,
            path: "/".to_string(),
            max_age_secs: None,
        }
    }
}

impl CookieConfig {
    /// Render a Set-Cookie value carrying `value`
    pub fn build_set_cookie(&self, value: &str) -> String {
        let mut parts = vec![format!("{}={}", self.name, value)];

        parts.push(format!("Path={}", self.path));
        if let Some(max_age) = self.max_age_secs {
            parts.push(format!("Max-Age={max_age}"));
        }
        parts.push(format!("SameSite={}", self.same_site.as_str()));
        if self.secure {
            parts.push("Secure".to_string());
        }
        if self.http_only {
            parts.push("HttpOnly".to_string());
        }

        parts.join("; ")
    }

    /// Render a Set-Cookie value that removes the cookie.
    ///
    /// Empty value, Max-Age=0; user agents drop the cookie immediately.
    pub fn build_delete_cookie(&self) -> String {
        let expired = Self {
            max_age_secs: Some(0),
            ..self.clone()
        };
        expired.build_set_cookie("")
    }
}

/// Find a cookie's value in the request headers.
///
/// `None` when there is no Cookie header, the header is not valid UTF-8, or
/// no pair matches `name`. The first match wins.
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;

    for pair in raw.split(';') {
        if let Some((key, value)) = pair.trim().split_once('=')
            && key == name
        {
            return Some(value.to_string());
        }
    }

    None
}

/// Render a config + value into a Set-Cookie header value
pub fn set_cookie_header(config: &CookieConfig, value: &str) -> HeaderValue {
    HeaderValue::from_str(&config.build_set_cookie(value))
        .unwrap_or_else(|_| HeaderValue::from_static(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bearer_config() -> CookieConfig {
        CookieConfig {
            name: "user_session".to_string(),
            max_age_secs: Some(90 * 24 * 3600),
            ..Default::default()
        }
    }

    #[test]
    fn test_set_cookie_carries_all_attributes() {
        let cookie = bearer_config().build_set_cookie("opaque-payload");

        assert!(cookie.starts_with("user_session=opaque-payload"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=7776000"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("HttpOnly"));
    }

    #[test]
    fn test_session_cookie_has_no_max_age() {
        let config = CookieConfig {
            max_age_secs: None,
            ..bearer_config()
        };

        assert!(!config.build_set_cookie("v").contains("Max-Age"));
    }

    #[test]
    fn test_delete_cookie_empties_value_and_expires() {
        let cookie = bearer_config().build_delete_cookie();

        assert!(cookie.starts_with("user_session=;"));
        assert!(cookie.contains("Max-Age=0"));
        // Deletion keeps the scope attributes so the right cookie is hit
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("HttpOnly"));
    }

    #[test]
    fn test_extract_cookie_picks_the_named_pair() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; user_session=abc123; lang=en"),
        );

        assert_eq!(
            extract_cookie(&headers, "user_session"),
            Some("abc123".to_string())
        );
        assert_eq!(extract_cookie(&headers, "theme"), Some("dark".to_string()));
        assert_eq!(extract_cookie(&headers, "absent"), None);
    }

    #[test]
    fn test_extract_cookie_without_header() {
        assert_eq!(extract_cookie(&HeaderMap::new(), "user_session"), None);
    }
}
