use std::env;
use std::time::Duration;

/// API client configuration.
///
/// Reads from the `WAYFARER_API_URL` environment variable, falling back to
/// `http://localhost:5000/api` when unset.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to. Never ends in `/`.
    pub base_url: String,
    /// Per-request timeout. `None` leaves the transport default in place.
    pub timeout: Option<Duration>,
}

impl ApiConfig {
    /// The default base URL used when no environment variable is set.
    pub const DEFAULT_URL: &str = "http://localhost:5000/api";

    /// Environment variable consulted by [`ApiConfig::from_env`].
    pub const ENV_VAR: &str = "WAYFARER_API_URL";

    /// Build a config from the environment.
    ///
    /// Priority: `WAYFARER_API_URL` env var, then the compile-time default.
    pub fn from_env() -> Self {
        let base_url = env::var(Self::ENV_VAR)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| Self::DEFAULT_URL.to_owned());
        Self::new(base_url)
    }

    /// Build a config from an explicit URL (useful for tests and CLI flags).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_owned(),
            timeout: None,
        }
    }

    /// Set a per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Join an endpoint path onto the base URL.
    ///
    /// `endpoint` is expected to start with `/`; one is inserted otherwise.
    pub fn url_for(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
