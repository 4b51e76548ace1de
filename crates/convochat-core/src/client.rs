use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::endpoint::{is_invalid_segment, Endpoint, Method};
use crate::envelope::Envelope;
use crate::error::{ConvoChatError, Result, TransportError};
use crate::record::{CallSite, RequestRecord};
use crate::transport::{HttpRequest, Transport};
use crate::Payload;

const DEFAULT_RESOURCE: &str = "ConvoChat";

/// Generic client every resource facade is built from.
///
/// Cheap to clone: the transport is shared, the configuration is immutable.
#[derive(Clone)]
pub struct ApiClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    resource: &'static str,
}

impl ApiClient {
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            resource: DEFAULT_RESOURCE,
        }
    }

    /// Same connection, errors tagged with `resource` ("SMS", "WhatsApp"...).
    pub fn for_resource(&self, resource: &'static str) -> Self {
        Self {
            resource,
            ..self.clone()
        }
    }

    pub fn resource(&self) -> &'static str {
        self.resource
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Validate `fields` against the descriptor and perform the call.
    pub async fn call(&self, endpoint: &Endpoint, fields: Payload) -> Result<Envelope> {
        endpoint.validate(&fields)?;
        self.send(endpoint.path, endpoint.method, fields, endpoint.redact)
            .await
    }

    /// Like [`ApiClient::call`], with `{id}` in the path replaced by `id`.
    ///
    /// A blank id (or `.`/`..`) fails validation as `id` before any call.
    pub async fn call_with_id(
        &self,
        endpoint: &Endpoint,
        id: &str,
        fields: Payload,
    ) -> Result<Envelope> {
        if is_invalid_segment(id) {
            return Err(ConvoChatError::Validation("id".to_string()));
        }
        endpoint.validate(&fields)?;
        let path = endpoint.path_with_id(id);
        self.send(&path, endpoint.method, fields, endpoint.redact)
            .await
    }

    /// Ad-hoc call without a descriptor; no required-field checks.
    pub async fn request(&self, path: &str, method: Method, fields: Payload) -> Result<Envelope> {
        self.send(path, method, fields, &[]).await
    }

    /// `secret` first, then the caller's fields in order. A caller-supplied
    /// `secret` never overrides the configured key.
    pub fn build_payload(&self, fields: Payload) -> Payload {
        let mut payload = Payload::with_capacity(fields.len() + 1);
        payload.insert(
            "secret".to_string(),
            Value::String(self.config.api_key().to_string()),
        );
        for (key, value) in fields {
            if key != "secret" {
                payload.insert(key, value);
            }
        }
        payload
    }

    fn build_request(&self, path: &str, method: Method, payload: Payload) -> HttpRequest {
        HttpRequest {
            method,
            url: self.config.url_for(path),
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
            ],
            body: payload,
            timeout: self.config.timeout(),
        }
    }

    async fn send(
        &self,
        path: &str,
        method: Method,
        fields: Payload,
        redact: &[&str],
    ) -> Result<Envelope> {
        let payload = self.build_payload(fields);
        let request = self.build_request(path, method, payload.clone());
        let site = CallSite {
            resource: self.resource,
            config: &self.config,
            path,
            method,
            payload: &payload,
            redact,
        };

        debug!(resource = self.resource, %method, path, "calling ConvoChat API");

        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(failure) => {
                RequestRecord::failure(&site, &failure.message, failure.code).emit();
                return Err(TransportError::Request {
                    resource: self.resource,
                    message: failure.message,
                    code: failure.code,
                }
                .into());
            }
        };

        let envelope = match decode(&response.body) {
            Some(envelope) => envelope,
            None => {
                let err = TransportError::InvalidJson {
                    resource: self.resource,
                };
                RequestRecord::failure(&site, &err.to_string(), Some(response.status)).emit();
                return Err(err.into());
            }
        };

        if self.config.logs_requests() {
            RequestRecord::success(&site, envelope.get("status").cloned()).emit();
        }

        Ok(envelope)
    }
}

fn decode(body: &str) -> Option<Envelope> {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(Envelope::from_value)
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("resource", &self.resource)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
