//! Client identification utilities
//!
//! Common functions for capturing client metadata from HTTP headers.

use axum::http::{HeaderMap, header};
use std::net::IpAddr;

/// Client metadata captured from a request
///
/// Recorded alongside sessions for audit purposes.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    /// Client IP address (from X-Forwarded-For or direct connection)
    pub ip: Option<IpAddr>,
    /// Original User-Agent string
    pub user_agent: Option<String>,
}

impl ClientInfo {
    /// Get IP as string (for storage)
    pub fn ip_string(&self) -> String {
        self.ip.map(|ip| ip.to_string()).unwrap_or_default()
    }

    /// Get User-Agent as string (for storage)
    pub fn user_agent_string(&self) -> String {
        self.user_agent.clone().unwrap_or_default()
    }
}

/// Extract client metadata from request headers
///
/// ## Arguments
/// * `headers` - HTTP request headers
/// * `direct_ip` - Direct connection IP address
pub fn extract_client_info(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> ClientInfo {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|ua| ua.to_string());

    ClientInfo {
        ip: extract_client_ip(headers, direct_ip),
        user_agent,
    }
}

/// Extract client IP address from headers
///
/// Checks X-Forwarded-For header first (for reverse proxy setups),
/// then falls back to direct connection IP.
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    // Check X-Forwarded-For header (first IP in the list)
    if let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first_ip) = xff.split(',').next() {
            if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                return Some(ip);
            }
        }
    }
    direct_ip
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_client_ip_prefers_forwarded() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );

        let direct: Option<IpAddr> = Some("127.0.0.1".parse().unwrap());
        let ip = extract_client_ip(&headers, direct);
        assert_eq!(ip, Some("203.0.113.7".parse().unwrap()));
    }

    #[test]
    fn test_extract_client_ip_falls_back_to_direct() {
        let headers = HeaderMap::new();
        let direct: Option<IpAddr> = Some("192.0.2.4".parse().unwrap());
        assert_eq!(extract_client_ip(&headers, direct), direct);
    }

    #[test]
    fn test_extract_client_info() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/8.0"));

        let info = extract_client_info(&headers, Some("192.0.2.4".parse().unwrap()));
        assert_eq!(info.user_agent.as_deref(), Some("curl/8.0"));
        assert_eq!(info.ip_string(), "192.0.2.4");
    }

    #[test]
    fn test_missing_metadata_stores_empty_strings() {
        let info = extract_client_info(&HeaderMap::new(), None);
        assert_eq!(info.ip_string(), "");
        assert_eq!(info.user_agent_string(), "");
    }
}
