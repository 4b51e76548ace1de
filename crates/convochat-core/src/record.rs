use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;
use tracing::{error, info};

use crate::config::ClientConfig;
use crate::endpoint::Method;
use crate::Payload;

/// Placeholder written over secrets in log records.
pub const REDACTED: &str = "[REDACTED]";

/// Copy of `payload` with `secret` and any `extra` fields masked.
pub fn redact(payload: &Payload, extra: &[&str]) -> Payload {
    let mut masked = payload.clone();
    for key in std::iter::once("secret").chain(extra.iter().copied()) {
        if let Some(value) = masked.get_mut(key) {
            *value = Value::String(REDACTED.to_string());
        }
    }
    masked
}

/// Structured log record for one API call.
#[derive(Debug, Clone, Serialize)]
pub struct RequestRecord {
    pub resource: &'static str,
    pub endpoint: String,
    pub method: Method,
    pub base_url: String,
    pub timeout_secs: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Always redacted.
    pub request_data: Payload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_status: Option<Value>,
}

/// Everything known about a call before the transport is invoked.
#[derive(Debug, Clone, Copy)]
pub struct CallSite<'a> {
    pub resource: &'static str,
    pub config: &'a ClientConfig,
    pub path: &'a str,
    pub method: Method,
    pub payload: &'a Payload,
    pub redact: &'a [&'a str],
}

impl RequestRecord {
    fn base(site: &CallSite<'_>) -> Self {
        Self {
            resource: site.resource,
            endpoint: site.path.to_string(),
            method: site.method,
            base_url: site.config.base_url().to_string(),
            timeout_secs: site.config.timeout().as_secs(),
            timestamp: OffsetDateTime::now_utc(),
            request_data: redact(site.payload, site.redact),
            error_message: None,
            error_code: None,
            response_status: None,
        }
    }

    pub fn failure(site: &CallSite<'_>, message: &str, code: Option<u16>) -> Self {
        Self {
            error_message: Some(message.to_string()),
            error_code: code,
            ..Self::base(site)
        }
    }

    pub fn success(site: &CallSite<'_>, response_status: Option<Value>) -> Self {
        Self {
            response_status,
            ..Self::base(site)
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error_message.is_some()
    }

    /// Error level for failures, info level otherwise.
    pub fn emit(&self) {
        let request_data = Value::Object(self.request_data.clone());
        let timestamp = self
            .timestamp
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default();

        if let Some(message) = &self.error_message {
            error!(
                resource = self.resource,
                endpoint = %self.endpoint,
                method = %self.method,
                error_message = %message,
                error_code = ?self.error_code,
                request_data = %request_data,
                base_url = %self.base_url,
                timeout = self.timeout_secs,
                timestamp = %timestamp,
                "ConvoChat {} API Error",
                self.resource
            );
        } else {
            let status = self
                .response_status
                .as_ref()
                .map(Value::to_string)
                .unwrap_or_else(|| "unknown".to_string());
            info!(
                resource = self.resource,
                endpoint = %self.endpoint,
                method = %self.method,
                response_status = %status,
                request_data = %request_data,
                base_url = %self.base_url,
                timeout = self.timeout_secs,
                timestamp = %timestamp,
                "ConvoChat {} API Request Success",
                self.resource
            );
        }
    }
}
