use convochat_core::{ApiClient, Envelope, Payload, Result};

use crate::shared::id_payload;

pub const RESOURCE: &str = "OTP";

pub mod endpoints {
    use convochat_core::Endpoint;

    pub const SEND: Endpoint = Endpoint::post("/send/otp").requires(&["type", "message", "phone"]);
    /// The code itself never reaches the logs.
    pub const VERIFY: Endpoint = Endpoint::get("/get/otp")
        .requires(&["otp"])
        .redacting(&["otp"]);
}

/// One-time passwords over SMS or WhatsApp.
#[derive(Debug, Clone)]
pub struct OtpService {
    client: ApiClient,
}

impl OtpService {
    pub fn new(client: &ApiClient) -> Self {
        Self {
            client: client.for_resource(RESOURCE),
        }
    }

    /// `type` selects the channel (`sms` or `whatsapp`); `message` must
    /// contain the `{{otp}}` placeholder.
    pub async fn send_otp(&self, fields: Payload) -> Result<Envelope> {
        self.client.call(&endpoints::SEND, fields).await
    }

    pub async fn verify_otp(&self, otp: &str) -> Result<Envelope> {
        self.client
            .call(&endpoints::VERIFY, id_payload("otp", otp))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convochat_core::testing::StubTransport;
    use convochat_core::{payload, ClientConfig, Method};
    use serde_json::json;

    #[tokio::test]
    async fn send_requires_type_message_phone_in_order() {
        let stub = StubTransport::new();
        let otp = OtpService::new(&ApiClient::new(
            ClientConfig::with_api_key("k").unwrap(),
            stub.clone(),
        ));

        let err = otp
            .send_otp(payload! { "message" => "Code {{otp}}", "phone" => "+57300" })
            .await
            .unwrap_err();
        assert_eq!(err.missing_field(), Some("type"));

        otp.send_otp(payload! {
            "type" => "sms",
            "message" => "Code {{otp}}",
            "phone" => "+57300",
        })
        .await
        .unwrap();
        let request = stub.last_request().unwrap();
        assert_eq!(request.method, Method::Post);
        assert!(request.url.ends_with("/send/otp"));
    }

    #[tokio::test]
    async fn verify_sends_otp_via_get() {
        let stub = StubTransport::new();
        stub.respond_json(200, json!({"status": 200, "message": "OTP has been verified!"}));
        let otp = OtpService::new(&ApiClient::new(
            ClientConfig::with_api_key("k").unwrap().log_requests(true),
            stub.clone(),
        ));

        let envelope = otp.verify_otp("123456").await.unwrap();
        assert!(envelope.is_success());

        let request = stub.last_request().unwrap();
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.body["otp"], "123456");
    }

    #[test]
    fn verify_descriptor_redacts_code() {
        assert_eq!(endpoints::VERIFY.redact, &["otp"]);
        let payload = payload! { "secret" => "k", "otp" => "123456" };
        let masked = convochat_core::redact(&payload, endpoints::VERIFY.redact);
        assert_eq!(masked["otp"], convochat_core::REDACTED);
    }
}
