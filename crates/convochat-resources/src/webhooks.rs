use convochat_core::{ApiClient, Envelope, Payload, Result};

pub const RESOURCE: &str = "Webhooks";

pub mod endpoints {
    use convochat_core::Endpoint;

    pub const LIST: Endpoint = Endpoint::get("/api/webhooks");
    pub const CREATE: Endpoint = Endpoint::post("/api/webhooks").requires(&["url", "events"]);
    pub const SHOW: Endpoint = Endpoint::get("/api/webhooks/{id}");
    pub const UPDATE: Endpoint = Endpoint::put("/api/webhooks/{id}");
    pub const DELETE: Endpoint = Endpoint::delete("/api/webhooks/{id}");
}

/// Callback registrations for delivery and inbound events.
#[derive(Debug, Clone)]
pub struct WebhooksService {
    client: ApiClient,
}

impl WebhooksService {
    pub fn new(client: &ApiClient) -> Self {
        Self {
            client: client.for_resource(RESOURCE),
        }
    }

    pub async fn get_webhooks(&self, filters: Payload) -> Result<Envelope> {
        self.client.call(&endpoints::LIST, filters).await
    }

    pub async fn create_webhook(&self, fields: Payload) -> Result<Envelope> {
        self.client.call(&endpoints::CREATE, fields).await
    }

    pub async fn get_webhook(&self, webhook_id: &str) -> Result<Envelope> {
        self.client
            .call_with_id(&endpoints::SHOW, webhook_id, Payload::new())
            .await
    }

    pub async fn update_webhook(&self, webhook_id: &str, fields: Payload) -> Result<Envelope> {
        self.client
            .call_with_id(&endpoints::UPDATE, webhook_id, fields)
            .await
    }

    pub async fn delete_webhook(&self, webhook_id: &str) -> Result<Envelope> {
        self.client
            .call_with_id(&endpoints::DELETE, webhook_id, Payload::new())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convochat_core::testing::StubTransport;
    use convochat_core::{payload, ClientConfig, Method};

    #[tokio::test]
    async fn create_needs_url_and_events() {
        let stub = StubTransport::new();
        let webhooks = WebhooksService::new(&ApiClient::new(
            ClientConfig::with_api_key("k").unwrap(),
            stub.clone(),
        ));

        let err = webhooks
            .create_webhook(payload! { "url" => "https://example.com/hook" })
            .await
            .unwrap_err();
        assert_eq!(err.missing_field(), Some("events"));

        webhooks
            .create_webhook(payload! {
                "url" => "https://example.com/hook",
                "events" => vec!["sms.received"],
            })
            .await
            .unwrap();
        webhooks.delete_webhook("wh_1").await.unwrap();

        let requests = stub.requests();
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[1].method, Method::Delete);
        assert!(requests[1].url.ends_with("/api/webhooks/wh_1"));
    }
}
