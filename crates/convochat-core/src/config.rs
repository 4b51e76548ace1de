use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::{ConvoChatError, Result};

/// Production API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://sms.convo.chat/api";
/// Per-call HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: i64 = 30;

/// Validated connection settings shared by every resource client.
///
/// Built once, checked eagerly: an invalid key, URL or timeout fails here,
/// before any network call is attempted.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_key: String,
    base_url: String,
    timeout: Duration,
    log_requests: bool,
}

impl ClientConfig {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout_seconds: i64,
    ) -> Result<Self> {
        let api_key = api_key.into();
        let base_url = base_url.into();

        if api_key.trim().is_empty() {
            return Err(ConvoChatError::Configuration(
                "ConvoChat API key is required. Set CONVOCHAT_API_KEY in your environment or config file."
                    .to_string(),
            ));
        }

        if base_url.trim().is_empty() {
            return Err(ConvoChatError::Configuration(
                "ConvoChat base URL is required.".to_string(),
            ));
        }

        let parsed = Url::parse(&base_url).ok().filter(|u| {
            u.has_host() && matches!(u.scheme(), "http" | "https")
        });
        if parsed.is_none() {
            return Err(ConvoChatError::Configuration(
                "ConvoChat base URL must be a valid URL.".to_string(),
            ));
        }

        if timeout_seconds <= 0 {
            return Err(ConvoChatError::Configuration(
                "Timeout must be a positive integer.".to_string(),
            ));
        }

        Ok(Self {
            api_key,
            base_url,
            timeout: Duration::from_secs(timeout_seconds as u64),
            log_requests: false,
        })
    }

    /// Default base URL and timeout.
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self> {
        Self::new(api_key, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS)
    }

    /// Emit an info record for every successful call.
    pub fn log_requests(mut self, enabled: bool) -> Self {
        self.log_requests = enabled;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn logs_requests(&self) -> bool {
        self.log_requests
    }

    /// Absolute URL for an endpoint path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("log_requests", &self.log_requests)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_error(result: Result<ClientConfig>) -> String {
        match result {
            Err(ConvoChatError::Configuration(msg)) => msg,
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn empty_api_key_is_rejected() {
        for key in ["", "   "] {
            let msg = config_error(ClientConfig::new(key, DEFAULT_BASE_URL, 30));
            assert!(msg.contains("API key"), "{}", msg);
        }
    }

    #[test]
    fn malformed_base_url_is_rejected() {
        for url in ["invalid-url", "sms.convo.chat/api", "ftp//nothing", "mailto:ops@convo.chat"] {
            let msg = config_error(ClientConfig::new("test-key", url, 30));
            assert!(msg.contains("base URL"), "{} -> {}", url, msg);
        }
        let msg = config_error(ClientConfig::new("test-key", "", 30));
        assert!(msg.contains("base URL"));
    }

    #[test]
    fn non_positive_timeout_is_rejected() {
        for timeout in [0, -5] {
            let msg = config_error(ClientConfig::new("test-key", DEFAULT_BASE_URL, timeout));
            assert!(msg.contains("Timeout"));
        }
    }

    #[test]
    fn accepts_valid_configuration() {
        let config = ClientConfig::new("test-key", "https://test.convo.chat/api", 60).unwrap();
        assert_eq!(config.api_key(), "test-key");
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert!(!config.logs_requests());
        assert_eq!(config.url_for("/send/sms"), "https://test.convo.chat/api/send/sms");
    }

    #[test]
    fn trailing_slash_is_not_doubled() {
        let config = ClientConfig::new("k", "http://localhost:8080/api/", 5).unwrap();
        assert_eq!(config.url_for("/get/credits"), "http://localhost:8080/api/get/credits");
    }

    #[test]
    fn debug_output_masks_the_key() {
        let config = ClientConfig::with_api_key("super-secret-key").unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret-key"));
        assert!(debug.contains(DEFAULT_BASE_URL));
    }
}
