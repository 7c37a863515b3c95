//! Client configuration types.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the API client and the session layer built on it.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// API base URL, including any deployment prefix
    /// (e.g., "http://localhost:8080/project_track/api").
    #[serde(default = "ClientConfig::default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "ClientConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Connect timeout in seconds.
    #[serde(default = "ClientConfig::default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// Route the UI is sent to when the session ends.
    #[serde(default = "ClientConfig::default_login_path")]
    pub login_path: String,

    /// Route authenticated users land on.
    #[serde(default = "ClientConfig::default_home_path")]
    pub home_path: String,
}

impl ClientConfig {
    fn default_base_url() -> String {
        "http://localhost:8080/project_track/api".to_string()
    }

    const fn default_request_timeout() -> u64 {
        30
    }

    const fn default_connect_timeout() -> u64 {
        5
    }

    fn default_login_path() -> String {
        "/login".to_string()
    }

    fn default_home_path() -> String {
        "/dashboard".to_string()
    }

    /// Create a configuration for `base_url` with every other field defaulted.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Get the connect timeout as a `Duration`.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    /// Join `path` onto the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            request_timeout_seconds: Self::default_request_timeout(),
            connect_timeout_seconds: Self::default_connect_timeout(),
            login_path: Self::default_login_path(),
            home_path: Self::default_home_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080/project_track/api");
        assert_eq!(config.login_path, "/login");
        assert_eq!(config.home_path, "/dashboard");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn endpoint_joins_single_slash() {
        let config = ClientConfig::with_base_url("http://api.local/prefix/");
        assert_eq!(config.endpoint("/login"), "http://api.local/prefix/login");
        assert_eq!(
            config.endpoint("user/current"),
            "http://api.local/prefix/user/current"
        );
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url": "http://example.test/api"}"#).unwrap();
        assert_eq!(config.base_url, "http://example.test/api");
        assert_eq!(config.request_timeout_seconds, 30);
        assert_eq!(config.login_path, "/login");
    }
}
