//! API client configuration.
//!
//! Configuration priority: explicit constructor > RISKVIZ_API_URL environment
//! variable > built-in default.

use std::env;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8001";

// Backend calls may be slow (large workbooks, model inference), so the
// per-request timeout is deliberately generous.
const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Connection settings shared by the agent and workbook clients.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the analytics backend, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ApiConfig {
    /// Creates a config with the given base URL and the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Resolves the base URL from `RISKVIZ_API_URL`.
    ///
    /// A value that is not an absolute http(s) URL is ignored and the
    /// default `http://127.0.0.1:8001` is used instead.
    pub fn from_env() -> Self {
        let base_url = match env::var("RISKVIZ_API_URL") {
            Ok(url) if is_absolute_http_url(&url) => url,
            Ok(url) => {
                tracing::debug!("ignoring non-absolute RISKVIZ_API_URL {:?}", url);
                DEFAULT_API_URL.to_string()
            }
            Err(_) => DEFAULT_API_URL.to_string(),
        };
        Self::new(base_url)
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

fn is_absolute_http_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_stripped() {
        let config = ApiConfig::new("http://localhost:9000/");
        assert_eq!(config.base_url, "http://localhost:9000");
    }

    #[test]
    fn test_absolute_url_detection() {
        assert!(is_absolute_http_url("http://localhost:8001"));
        assert!(is_absolute_http_url("HTTPS://api.example.com"));
        assert!(!is_absolute_http_url("/api"));
        assert!(!is_absolute_http_url("localhost:8001"));
    }
}
