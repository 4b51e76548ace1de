use std::env;
use std::fmt;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use convochat_core::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use convochat_resources::{SmsDefaults, WhatsAppDefaults};
use serde::{Deserialize, Serialize};

use crate::jobs::JobSettings;

/// Application configuration
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Secret sent with every call (required for real use)
    pub api_key: String,
    /// API root (default: https://sms.convo.chat/api)
    pub base_url: String,
    /// Per-request timeout in seconds (default: 30)
    pub timeout: i64,
    /// Log every successful call at info level (default: false)
    pub log_requests: bool,
    pub sms: SmsDefaults,
    pub whatsapp: WhatsAppDefaults,
    pub queue: QueueConfig,
}

/// Bulk-send job settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Queue the jobs are dispatched on (default: convochat)
    pub name: String,
    /// Pause between two recipients in milliseconds, 0 disables (default: 0)
    pub rate_limit_delay_ms: u64,
    /// Attempts per recipient including the first one (default: 3)
    pub max_attempts: u32,
    /// Delay before a failed recipient is retried (default: 300)
    pub retry_delay_secs: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            name: "convochat".to_string(),
            rate_limit_delay_ms: 0,
            max_attempts: 3,
            retry_delay_secs: 300,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT_SECS,
            log_requests: false,
            sms: SmsDefaults::default(),
            whatsapp: WhatsAppDefaults::default(),
            queue: QueueConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(Self::environment())
    }

    /// Same layering as [`AppConfig::load`] with a caller-built environment
    /// source (tests feed a fixed map through [`Environment::source`]).
    pub fn load_with(environment: Environment) -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // gitignored
            .add_source(File::with_name("config/local").required(false))
            .add_source(environment)
            .build()?;

        s.try_deserialize()
    }

    /// `CONVOCHAT_API_KEY`, `CONVOCHAT_SMS__DEFAULT_MODE`...
    pub fn environment() -> Environment {
        Environment::with_prefix("CONVOCHAT")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Validated connection settings; fails fast on a bad key, URL or timeout.
    pub fn client_config(&self) -> convochat_core::Result<ClientConfig> {
        Ok(ClientConfig::new(&self.api_key, &self.base_url, self.timeout)?
            .log_requests(self.log_requests))
    }

    pub fn job_settings(&self) -> JobSettings {
        JobSettings {
            max_attempts: self.queue.max_attempts,
            rate_limit_delay: Duration::from_millis(self.queue.rate_limit_delay_ms),
            retry_delay: Duration::from_secs(self.queue.retry_delay_secs),
        }
    }

    /// First eight characters of the key followed by `...`.
    pub fn masked_api_key(&self) -> String {
        let prefix: String = self.api_key.chars().take(8).collect();
        format!("{}...", prefix)
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &self.masked_api_key())
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("log_requests", &self.log_requests)
            .field("sms", &self.sms)
            .field("whatsapp", &self.whatsapp)
            .field("queue", &self.queue)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convochat_resources::SmsMode;

    fn env(pairs: &[(&str, &str)]) -> Environment {
        let source = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::environment().source(Some(source))
    }

    #[test]
    fn defaults_without_any_source() {
        let config = AppConfig::load_with(env(&[])).unwrap();
        assert_eq!(config.base_url, "https://sms.convo.chat/api");
        assert_eq!(config.timeout, 30);
        assert!(!config.log_requests);
        assert_eq!(config.sms.default_mode, SmsMode::Devices);
        assert_eq!(config.sms.default_priority, 2);
        assert_eq!(config.whatsapp.default_priority, 2);
        assert_eq!(config.queue.name, "convochat");
        assert_eq!(config.queue.max_attempts, 3);
        assert!(!config.has_api_key());
    }

    #[test]
    fn environment_overrides_nested_keys() {
        let config = AppConfig::load_with(env(&[
            ("CONVOCHAT_API_KEY", "abcdefghijkl"),
            ("CONVOCHAT_TIMEOUT", "45"),
            ("CONVOCHAT_LOG_REQUESTS", "true"),
            ("CONVOCHAT_SMS__DEFAULT_MODE", "credits"),
            ("CONVOCHAT_SMS__DEFAULT_GATEWAY", "gw_9"),
            ("CONVOCHAT_QUEUE__RATE_LIMIT_DELAY_MS", "100"),
        ]))
        .unwrap();

        assert_eq!(config.api_key, "abcdefghijkl");
        assert_eq!(config.timeout, 45);
        assert!(config.log_requests);
        assert_eq!(config.sms.default_mode, SmsMode::Credits);
        assert_eq!(config.sms.default_gateway.as_deref(), Some("gw_9"));
        assert_eq!(
            config.job_settings().rate_limit_delay,
            Duration::from_millis(100)
        );

        let client = config.client_config().unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(45));
        assert!(client.logs_requests());
    }

    #[test]
    fn client_config_fails_fast() {
        let config = AppConfig::default();
        let err = config.client_config().unwrap_err();
        assert!(err.to_string().contains("API key"));

        let config = AppConfig {
            api_key: "key".into(),
            timeout: 0,
            ..AppConfig::default()
        };
        assert!(config.client_config().unwrap_err().to_string().contains("Timeout"));
    }

    #[test]
    fn debug_masks_key() {
        let config = AppConfig {
            api_key: "supersecretkey123".into(),
            ..AppConfig::default()
        };
        let printed = format!("{:?}", config);
        assert!(printed.contains("supersec..."));
        assert!(!printed.contains("supersecretkey123"));
    }
}
