//! API client configuration.

use std::time::Duration;
use url::Url;

/// Records endpoint of the `fr-en-calendrier-scolaire` dataset.
pub const DEFAULT_ENDPOINT: &str = "https://data.education.gouv.fr/api/explore/v2.1/catalog/datasets/fr-en-calendrier-scolaire/records";

/// Configuration for [`ApiClient`](crate::ApiClient).
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Dataset records endpoint.
    pub endpoint: Url,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("vacances/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ApiConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

    /// Creates a configuration for a custom endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(endpoint: impl AsRef<str>) -> Result<Self, url::ParseError> {
        Ok(Self {
            endpoint: Url::parse(endpoint.as_ref())?,
            ..Self::default()
        })
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Returns the endpoint without a trailing query string.
    pub fn endpoint_str(&self) -> &str {
        let raw = self.endpoint.as_str();
        raw.split_once('?').map_or(raw, |(base, _)| base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.endpoint_str(), DEFAULT_ENDPOINT);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.user_agent.starts_with("vacances/"));
    }

    #[test]
    fn custom_endpoint() {
        let config = ApiConfig::new("http://127.0.0.1:8080/records?foo=bar")
            .unwrap()
            .with_timeout(Duration::from_millis(250))
            .with_user_agent("test-agent");

        assert_eq!(config.endpoint_str(), "http://127.0.0.1:8080/records");
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.user_agent, "test-agent");
    }

    #[test]
    fn invalid_endpoint() {
        assert!(ApiConfig::new("not a url").is_err());
    }
}
