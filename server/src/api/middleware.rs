//! HTTP middleware (CORS, 404 handler)

use axum::extract::Request;
use axum::http;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::core::config::is_all_interfaces;

/// Allowed origins configuration
#[derive(Debug, Clone)]
pub struct AllowedOrigins {
    origins: Vec<String>,
}

impl AllowedOrigins {
    /// Create allowed origins from host and port configuration
    pub fn new(host: &str, port: u16) -> Self {
        let mut origins = Vec::new();
        let dev_port = port.saturating_add(1);

        // When binding to all interfaces or localhost, allow both localhost
        // and 127.0.0.1; otherwise use the configured host directly.
        let base_hosts: Vec<&str> =
            if is_all_interfaces(host) || host == "127.0.0.1" || host == "localhost" {
                vec!["localhost", "127.0.0.1"]
            } else {
                vec![host]
            };

        for h in &base_hosts {
            origins.push(format!("http://{}:{}", h, port));
            origins.push(format!("http://{}:{}", h, dev_port));
            origins.push(format!("http://{}", h));
        }

        Self { origins }
    }

    /// Check if an origin is allowed
    pub fn is_allowed(&self, origin: &str) -> bool {
        self.origins.iter().any(|o| o == origin)
    }

    fn as_header_values(&self) -> Vec<http::HeaderValue> {
        self.origins.iter().filter_map(|o| o.parse().ok()).collect()
    }
}

/// Create CORS layer
pub fn cors(allowed: &AllowedOrigins) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed.as_header_values()))
        .allow_methods([
            http::Method::GET,
            http::Method::POST,
            http::Method::PUT,
            http::Method::PATCH,
            http::Method::DELETE,
            http::Method::OPTIONS,
        ])
        .allow_headers([
            http::header::CONTENT_TYPE,
            http::header::AUTHORIZATION,
            http::header::ACCEPT,
            http::header::ORIGIN,
            http::header::CACHE_CONTROL,
        ])
        .allow_credentials(true)
}

/// Handle 404 Not Found with logging
pub async fn handle_404(req: Request) -> impl axum::response::IntoResponse {
    tracing::debug!(method = %req.method(), path = %req.uri().path(), "No route matched");
    (
        http::StatusCode::NOT_FOUND,
        axum::Json(serde_json::json!({
            "error": "not_found",
            "code": "ROUTE_NOT_FOUND",
            "message": format!("No route for {} {}", req.method(), req.uri().path())
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_localhost_origins() {
        let allowed = AllowedOrigins::new("127.0.0.1", 5470);
        assert!(allowed.is_allowed("http://localhost:5470"));
        assert!(allowed.is_allowed("http://127.0.0.1:5470"));
        assert!(allowed.is_allowed("http://localhost:5471"));
        assert!(!allowed.is_allowed("http://evil.test"));
    }

    #[test]
    fn test_max_port_does_not_overflow() {
        let allowed = AllowedOrigins::new("127.0.0.1", u16::MAX);
        assert!(allowed.is_allowed("http://127.0.0.1:65535"));
        assert!(!allowed.is_allowed("http://127.0.0.1:65536"));
    }

    #[test]
    fn test_explicit_host_origins() {
        let allowed = AllowedOrigins::new("ops.internal", 80);
        assert!(allowed.is_allowed("http://ops.internal"));
        assert!(allowed.is_allowed("http://ops.internal:80"));
        assert!(!allowed.is_allowed("http://localhost:80"));
    }
}
