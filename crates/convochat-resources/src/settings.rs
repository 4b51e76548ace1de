use convochat_core::{ApiClient, Envelope, Payload, Result};

pub const RESOURCE: &str = "Settings";

pub mod endpoints {
    use convochat_core::Endpoint;

    pub const SHOW: Endpoint = Endpoint::get("/api/settings");
    pub const UPDATE: Endpoint = Endpoint::put("/api/settings");
    pub const BALANCE: Endpoint = Endpoint::get("/api/balance");
}

#[derive(Debug, Clone)]
pub struct SettingsService {
    client: ApiClient,
}

impl SettingsService {
    pub fn new(client: &ApiClient) -> Self {
        Self {
            client: client.for_resource(RESOURCE),
        }
    }

    pub async fn get_settings(&self) -> Result<Envelope> {
        self.client.call(&endpoints::SHOW, Payload::new()).await
    }

    pub async fn update_settings(&self, fields: Payload) -> Result<Envelope> {
        self.client.call(&endpoints::UPDATE, fields).await
    }

    pub async fn get_balance(&self) -> Result<Envelope> {
        self.client.call(&endpoints::BALANCE, Payload::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convochat_core::testing::StubTransport;
    use convochat_core::{payload, ClientConfig, Method};

    #[tokio::test]
    async fn update_uses_put() {
        let stub = StubTransport::new();
        let settings = SettingsService::new(&ApiClient::new(
            ClientConfig::with_api_key("k").unwrap(),
            stub.clone(),
        ));

        settings
            .update_settings(payload! { "timezone" => "America/Bogota" })
            .await
            .unwrap();
        settings.get_balance().await.unwrap();

        let requests = stub.requests();
        assert_eq!(requests[0].method, Method::Put);
        assert_eq!(requests[0].body["timezone"], "America/Bogota");
        assert_eq!(requests[1].method, Method::Get);
        assert!(requests[1].url.ends_with("/api/balance"));
    }
}
