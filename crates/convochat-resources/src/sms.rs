use std::fmt;

use convochat_core::{is_blank, payload, ApiClient, Envelope, Payload, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shared::{id_payload, merge, send_with_defaults};

pub const RESOURCE: &str = "SMS";

pub mod endpoints {
    use convochat_core::Endpoint;

    pub const SEND: Endpoint = Endpoint::post("/send/sms").requires(&["phone", "message"]);
    pub const SEND_BULK: Endpoint =
        Endpoint::post("/send/sms.bulk").requires(&["recipients", "message"]);
    pub const PENDING: Endpoint = Endpoint::get("/get/sms.pending");
    pub const RECEIVED: Endpoint = Endpoint::get("/get/sms.received");
    pub const SENT: Endpoint = Endpoint::get("/get/sms.sent");
    pub const MESSAGE: Endpoint =
        Endpoint::get("/get/sms.message").identified_by(&["id"]).requires(&["type"]);
    pub const CAMPAIGNS: Endpoint = Endpoint::get("/get/sms.campaigns");
    pub const DELETE_RECEIVED: Endpoint =
        Endpoint::get("/delete/sms.received").identified_by(&["id"]);
    pub const DELETE_SENT: Endpoint = Endpoint::get("/delete/sms.sent").identified_by(&["id"]);
    pub const DELETE_CAMPAIGN: Endpoint =
        Endpoint::get("/delete/sms.campaign").identified_by(&["id"]);
    pub const START_CAMPAIGN: Endpoint =
        Endpoint::get("/remote/start.sms").identified_by(&["campaign"]);
    pub const STOP_CAMPAIGN: Endpoint =
        Endpoint::get("/remote/stop.sms").identified_by(&["campaign"]);
    pub const DEVICES: Endpoint = Endpoint::get("/get/devices");
    pub const CREDITS: Endpoint = Endpoint::post("/get/credits");
    pub const RATES: Endpoint = Endpoint::get("/get/rates");
    pub const SUBSCRIPTION: Endpoint = Endpoint::get("/get/subscription");
    pub const EARNINGS: Endpoint = Endpoint::get("/get/earnings");
    pub const DELETE_NOTIFICATION: Endpoint =
        Endpoint::get("/delete/notification").identified_by(&["id"]);
}

/// How an SMS leaves the platform: through one of the account's linked
/// Android devices, or through a paid gateway billed in credits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmsMode {
    #[default]
    Devices,
    Credits,
}

impl SmsMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SmsMode::Devices => "devices",
            SmsMode::Credits => "credits",
        }
    }
}

impl fmt::Display for SmsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values applied to `send_sms` when the caller leaves them out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmsDefaults {
    pub default_mode: SmsMode,
    /// 1 = high, 2 = normal.
    pub default_priority: u8,
    pub default_device: Option<String>,
    pub default_gateway: Option<String>,
    pub default_sim: u8,
}

impl Default for SmsDefaults {
    fn default() -> Self {
        Self {
            default_mode: SmsMode::Devices,
            default_priority: 2,
            default_device: None,
            default_gateway: None,
            default_sim: 1,
        }
    }
}

/// SMS sending, inbox/outbox listings, campaigns and account info.
#[derive(Debug, Clone)]
pub struct SmsService {
    client: ApiClient,
    defaults: SmsDefaults,
}

impl SmsService {
    pub fn new(client: &ApiClient) -> Self {
        Self::with_defaults(client, SmsDefaults::default())
    }

    pub fn with_defaults(client: &ApiClient, defaults: SmsDefaults) -> Self {
        Self {
            client: client.for_resource(RESOURCE),
            defaults,
        }
    }

    pub fn defaults(&self) -> &SmsDefaults {
        &self.defaults
    }

    /// Generic send. Requires `phone` and `message`; `mode` and `priority`
    /// fall back to the configured defaults, and so does the device (devices
    /// mode) or gateway (credits mode) when one is configured.
    pub async fn send_sms(&self, fields: Payload) -> Result<Envelope> {
        let mode = match fields.get("mode").and_then(Value::as_str) {
            Some("credits") => SmsMode::Credits,
            Some(_) => SmsMode::Devices,
            None => self.defaults.default_mode,
        };

        let mut defaults = vec![
            ("mode", Value::from(mode.as_str())),
            ("priority", Value::from(self.defaults.default_priority)),
        ];
        match mode {
            SmsMode::Devices if !fields.contains_key("device") => {
                if let Some(device) = &self.defaults.default_device {
                    defaults.push(("device", Value::from(device.as_str())));
                    defaults.push(("sim", Value::from(self.defaults.default_sim)));
                }
            }
            SmsMode::Credits if !fields.contains_key("gateway") => {
                if let Some(gateway) = &self.defaults.default_gateway {
                    defaults.push(("gateway", Value::from(gateway.as_str())));
                }
            }
            _ => {}
        }

        send_with_defaults(&self.client, &endpoints::SEND, fields, defaults).await
    }

    /// Send through a specific linked device. `options` override the
    /// generated fields.
    pub async fn send_sms_with_device(
        &self,
        phone: &str,
        message: &str,
        device_id: &str,
        options: Payload,
    ) -> Result<Envelope> {
        let fields = payload! {
            "phone" => phone,
            "message" => message,
            "device" => device_id,
            "mode" => SmsMode::Devices.as_str(),
        };
        self.send_sms(merge(fields, options)).await
    }

    /// Send billed in credits. `gateway` is only added when an id is given.
    pub async fn send_sms_with_credits(
        &self,
        phone: &str,
        message: &str,
        gateway_id: Option<&str>,
        options: Payload,
    ) -> Result<Envelope> {
        let mut fields = merge(
            payload! {
                "phone" => phone,
                "message" => message,
                "mode" => SmsMode::Credits.as_str(),
            },
            options,
        );
        if let Some(gateway) = gateway_id.filter(|g| !is_blank(&Value::from(*g))) {
            fields.insert("gateway".to_string(), Value::from(gateway));
        }
        self.send_sms(fields).await
    }

    pub async fn send_bulk_sms<S: AsRef<str>>(
        &self,
        recipients: &[S],
        message: &str,
        options: Payload,
    ) -> Result<Envelope> {
        let recipients: Vec<&str> = recipients.iter().map(|r| r.as_ref()).collect();
        let fields = merge(
            options,
            payload! { "recipients" => recipients, "message" => message },
        );
        self.client.call(&endpoints::SEND_BULK, fields).await
    }

    pub async fn get_sms_pending(&self, filters: Payload) -> Result<Envelope> {
        self.client.call(&endpoints::PENDING, filters).await
    }

    pub async fn get_sms_received(&self, filters: Payload) -> Result<Envelope> {
        self.client.call(&endpoints::RECEIVED, filters).await
    }

    pub async fn get_sms_sent(&self, filters: Payload) -> Result<Envelope> {
        self.client.call(&endpoints::SENT, filters).await
    }

    /// `message_type` is `"sent"` or `"received"`.
    pub async fn get_sms_message(&self, message_id: u64, message_type: &str) -> Result<Envelope> {
        self.client
            .call(
                &endpoints::MESSAGE,
                payload! { "id" => message_id, "type" => message_type },
            )
            .await
    }

    pub async fn get_sms_campaigns(&self, filters: Payload) -> Result<Envelope> {
        self.client.call(&endpoints::CAMPAIGNS, filters).await
    }

    pub async fn delete_sms_received(&self, message_id: u64) -> Result<Envelope> {
        self.client
            .call(&endpoints::DELETE_RECEIVED, id_payload("id", message_id))
            .await
    }

    pub async fn delete_sms_sent(&self, message_id: u64) -> Result<Envelope> {
        self.client
            .call(&endpoints::DELETE_SENT, id_payload("id", message_id))
            .await
    }

    pub async fn delete_sms_campaign(&self, campaign_id: u64) -> Result<Envelope> {
        self.client
            .call(&endpoints::DELETE_CAMPAIGN, id_payload("id", campaign_id))
            .await
    }

    pub async fn start_sms_campaign(&self, campaign_id: u64) -> Result<Envelope> {
        self.client
            .call(&endpoints::START_CAMPAIGN, id_payload("campaign", campaign_id))
            .await
    }

    pub async fn stop_sms_campaign(&self, campaign_id: u64) -> Result<Envelope> {
        self.client
            .call(&endpoints::STOP_CAMPAIGN, id_payload("campaign", campaign_id))
            .await
    }

    /// Linked devices, paginated. The vendor's defaults are `limit = 10`,
    /// `page = 1`.
    pub async fn get_devices(&self, limit: u32, page: u32) -> Result<Envelope> {
        self.client
            .call(&endpoints::DEVICES, payload! { "limit" => limit, "page" => page })
            .await
    }

    pub async fn get_credits(&self) -> Result<Envelope> {
        self.client.call(&endpoints::CREDITS, Payload::new()).await
    }

    pub async fn get_rates(&self) -> Result<Envelope> {
        self.client.call(&endpoints::RATES, Payload::new()).await
    }

    pub async fn get_subscription(&self) -> Result<Envelope> {
        self.client.call(&endpoints::SUBSCRIPTION, Payload::new()).await
    }

    pub async fn get_earnings(&self) -> Result<Envelope> {
        self.client.call(&endpoints::EARNINGS, Payload::new()).await
    }

    pub async fn delete_notification(&self, notification_id: u64) -> Result<Envelope> {
        self.client
            .call(&endpoints::DELETE_NOTIFICATION, id_payload("id", notification_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convochat_core::testing::StubTransport;
    use convochat_core::{ClientConfig, Method};
    use serde_json::json;
    use std::sync::Arc;

    fn service(stub: &Arc<StubTransport>) -> SmsService {
        let config = ClientConfig::with_api_key("test-key").unwrap();
        SmsService::new(&ApiClient::new(config, stub.clone()))
    }

    #[tokio::test]
    async fn send_with_credits_round_trip() {
        let stub = StubTransport::new();
        stub.respond_json(200, json!({"status": "success", "id": "sms_123"}));

        let envelope = service(&stub)
            .send_sms_with_credits("+573001234567", "hi", None, Payload::new())
            .await
            .unwrap();

        assert_eq!(envelope["id"], "sms_123");
        let body = stub.last_request().unwrap().body;
        assert_eq!(body["mode"], "credits");
        assert_eq!(body["priority"], 2);
        assert!(!body.contains_key("gateway"));
    }

    #[tokio::test]
    async fn gateway_is_added_only_when_given() {
        let stub = StubTransport::new();
        let sms = service(&stub);

        sms.send_sms_with_credits("+57300", "hi", Some("gw_1"), Payload::new())
            .await
            .unwrap();
        assert_eq!(stub.last_request().unwrap().body["gateway"], "gw_1");

        sms.send_sms_with_credits("+57300", "hi", Some(""), Payload::new())
            .await
            .unwrap();
        assert!(!stub.last_request().unwrap().body.contains_key("gateway"));
    }

    #[tokio::test]
    async fn missing_phone_or_message_is_rejected() {
        let stub = StubTransport::new();
        let sms = service(&stub);

        let err = sms
            .send_sms(payload! { "message" => "Test", "device" => "1" })
            .await
            .unwrap_err();
        assert_eq!(err.missing_field(), Some("phone"));

        let err = sms
            .send_sms(payload! { "phone" => "+573001234567" })
            .await
            .unwrap_err();
        assert_eq!(err.missing_field(), Some("message"));
        assert!(stub.requests().is_empty());
    }

    #[tokio::test]
    async fn generic_send_defaults_to_devices_mode() {
        let stub = StubTransport::new();
        service(&stub)
            .send_sms(payload! { "phone" => "+57300", "message" => "hi" })
            .await
            .unwrap();

        let body = stub.last_request().unwrap().body;
        assert_eq!(body["mode"], "devices");
        assert_eq!(body["priority"], 2);
        assert!(!body.contains_key("device"));
    }

    #[tokio::test]
    async fn configured_device_and_gateway_fill_gaps() {
        let stub = StubTransport::new();
        let config = ClientConfig::with_api_key("test-key").unwrap();
        let defaults = SmsDefaults {
            default_device: Some("dev_7".into()),
            default_gateway: Some("gw_3".into()),
            default_sim: 2,
            default_priority: 1,
            ..SmsDefaults::default()
        };
        let sms = SmsService::with_defaults(&ApiClient::new(config, stub.clone()), defaults);

        sms.send_sms(payload! { "phone" => "+57300", "message" => "hi" })
            .await
            .unwrap();
        let body = stub.last_request().unwrap().body;
        assert_eq!(body["device"], "dev_7");
        assert_eq!(body["sim"], 2);
        assert_eq!(body["priority"], 1);

        sms.send_sms_with_credits("+57300", "hi", None, Payload::new())
            .await
            .unwrap();
        let body = stub.last_request().unwrap().body;
        assert_eq!(body["gateway"], "gw_3");
        assert!(!body.contains_key("device"));

        sms.send_sms_with_device("+57300", "hi", "dev_1", Payload::new())
            .await
            .unwrap();
        let body = stub.last_request().unwrap().body;
        assert_eq!(body["device"], "dev_1");
        assert!(!body.contains_key("sim"));
    }

    #[tokio::test]
    async fn options_override_generated_fields() {
        let stub = StubTransport::new();
        service(&stub)
            .send_sms_with_device("+57300", "hi", "dev_1", payload! { "sim" => 2, "priority" => 1 })
            .await
            .unwrap();

        let body = stub.last_request().unwrap().body;
        assert_eq!(body["device"], "dev_1");
        assert_eq!(body["sim"], 2);
        assert_eq!(body["priority"], 1);
    }

    #[tokio::test]
    async fn id_operations_use_get_with_id_in_body() {
        let stub = StubTransport::new();
        let sms = service(&stub);

        sms.delete_sms_received(42).await.unwrap();
        let request = stub.last_request().unwrap();
        assert_eq!(request.method, Method::Get);
        assert!(request.url.ends_with("/delete/sms.received"));
        assert_eq!(request.body["id"], 42);

        sms.start_sms_campaign(7).await.unwrap();
        let request = stub.last_request().unwrap();
        assert!(request.url.ends_with("/remote/start.sms"));
        assert_eq!(request.body["campaign"], 7);

        sms.get_sms_message(9, "sent").await.unwrap();
        let body = stub.last_request().unwrap().body;
        assert_eq!(body["id"], 9);
        assert_eq!(body["type"], "sent");
    }

    #[tokio::test]
    async fn zero_ids_are_sent_as_given() {
        let stub = StubTransport::new();
        let sms = service(&stub);

        sms.delete_sms_received(0).await.unwrap();
        assert_eq!(stub.last_request().unwrap().body["id"], 0);

        sms.stop_sms_campaign(0).await.unwrap();
        assert_eq!(stub.last_request().unwrap().body["campaign"], 0);
        assert_eq!(stub.requests().len(), 2);
    }

    #[tokio::test]
    async fn account_info_verbs() {
        let stub = StubTransport::new();
        let sms = service(&stub);

        sms.get_devices(10, 1).await.unwrap();
        sms.get_credits().await.unwrap();
        sms.get_rates().await.unwrap();

        let requests = stub.requests();
        assert_eq!(requests[0].method, Method::Get);
        assert_eq!(requests[0].body["limit"], 10);
        assert_eq!(requests[0].body["page"], 1);
        assert_eq!(requests[1].method, Method::Post);
        assert!(requests[1].url.ends_with("/get/credits"));
        assert_eq!(requests[2].method, Method::Get);
    }

    #[tokio::test]
    async fn bulk_send_carries_recipient_list() {
        let stub = StubTransport::new();
        service(&stub)
            .send_bulk_sms(&["+1", "+2"], "hello", payload! { "mode" => "credits" })
            .await
            .unwrap();

        let body = stub.last_request().unwrap().body;
        assert_eq!(body["recipients"], json!(["+1", "+2"]));
        assert_eq!(body["mode"], "credits");
    }

    #[test]
    fn mode_deserializes_lowercase() {
        let defaults: SmsDefaults =
            serde_json::from_value(json!({"default_mode": "credits"})).unwrap();
        assert_eq!(defaults.default_mode, SmsMode::Credits);
        assert_eq!(defaults.default_priority, 2);
        assert_eq!(defaults.default_sim, 1);
    }
}
