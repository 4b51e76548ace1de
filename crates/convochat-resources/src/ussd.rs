use convochat_core::{payload, ApiClient, Envelope, Payload, Result};

use crate::shared::id_payload;

pub const RESOURCE: &str = "USSD";

pub mod endpoints {
    use convochat_core::Endpoint;

    pub const SEND: Endpoint = Endpoint::post("/send/ussd").requires(&["code", "sim", "device"]);
    pub const REQUESTS: Endpoint = Endpoint::get("/get/ussd");
    pub const DELETE: Endpoint = Endpoint::get("/delete/ussd").identified_by(&["id"]);
}

/// USSD requests executed on a linked device.
#[derive(Debug, Clone)]
pub struct UssdService {
    client: ApiClient,
}

impl UssdService {
    pub fn new(client: &ApiClient) -> Self {
        Self {
            client: client.for_resource(RESOURCE),
        }
    }

    pub async fn send_ussd(&self, code: &str, sim: u8, device: &str) -> Result<Envelope> {
        self.client
            .call(
                &endpoints::SEND,
                payload! { "code" => code, "sim" => sim, "device" => device },
            )
            .await
    }

    pub async fn get_ussd_requests(&self, filters: Payload) -> Result<Envelope> {
        self.client.call(&endpoints::REQUESTS, filters).await
    }

    pub async fn delete_ussd_request(&self, request_id: u64) -> Result<Envelope> {
        self.client
            .call(&endpoints::DELETE, id_payload("id", request_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convochat_core::testing::StubTransport;
    use convochat_core::{ClientConfig, Method};

    #[tokio::test]
    async fn send_carries_code_sim_device() {
        let stub = StubTransport::new();
        let ussd = UssdService::new(&ApiClient::new(
            ClientConfig::with_api_key("k").unwrap(),
            stub.clone(),
        ));

        ussd.send_ussd("*123#", 1, "dev_1").await.unwrap();
        let request = stub.last_request().unwrap();
        assert_eq!(request.method, Method::Post);
        let keys: Vec<&str> = request.body.keys().map(String::as_str).collect();
        assert_eq!(keys, ["secret", "code", "sim", "device"]);

        let err = ussd.send_ussd("", 1, "dev_1").await.unwrap_err();
        assert_eq!(err.missing_field(), Some("code"));
        let err = ussd.send_ussd("*123#", 0, "dev_1").await.unwrap_err();
        assert_eq!(err.missing_field(), Some("sim"));
    }

    #[tokio::test]
    async fn delete_uses_get() {
        let stub = StubTransport::new();
        let ussd = UssdService::new(&ApiClient::new(
            ClientConfig::with_api_key("k").unwrap(),
            stub.clone(),
        ));

        ussd.delete_ussd_request(5).await.unwrap();
        let request = stub.last_request().unwrap();
        assert_eq!(request.method, Method::Get);
        assert!(request.url.ends_with("/delete/ussd"));
        assert_eq!(request.body["id"], 5);
    }
}
