use convochat_core::{ApiClient, Endpoint, Envelope, Payload, Result};
use serde_json::Value;
use tracing::trace;

/// Insert `value` under `key` unless the caller already supplied a non-null one.
pub fn fill_default(fields: &mut Payload, key: &str, value: impl Into<Value>) {
    match fields.get(key) {
        Some(existing) if !existing.is_null() => {}
        _ => {
            fields.insert(key.to_string(), value.into());
        }
    }
}

/// `base` overlaid with `options`; option values win on collision.
pub(crate) fn merge(mut base: Payload, options: Payload) -> Payload {
    base.extend(options);
    base
}

/// The send shape SMS and WhatsApp share: defaults fill the gaps, then the
/// descriptor is validated and called.
pub(crate) async fn send_with_defaults(
    client: &ApiClient,
    endpoint: &Endpoint,
    mut fields: Payload,
    defaults: Vec<(&'static str, Value)>,
) -> Result<Envelope> {
    for (key, value) in defaults {
        fill_default(&mut fields, key, value);
    }
    trace!(resource = client.resource(), path = endpoint.path, "defaults applied");
    client.call(endpoint, fields).await
}

pub(crate) fn id_payload(key: &str, id: impl Into<Value>) -> Payload {
    let mut payload = Payload::new();
    payload.insert(key.to_string(), id.into());
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use convochat_core::testing::StubTransport;
    use convochat_core::{payload, ClientConfig};
    use serde_json::json;

    const SEND: Endpoint = Endpoint::post("/send/any").requires(&["to", "message"]);

    #[test]
    fn fill_default_respects_caller_values() {
        let mut fields = payload! { "mode" => "credits", "sim" => json!(null) };
        fill_default(&mut fields, "mode", "devices");
        fill_default(&mut fields, "sim", 1);
        fill_default(&mut fields, "priority", 2);
        assert_eq!(fields["mode"], "credits");
        assert_eq!(fields["sim"], 1);
        assert_eq!(fields["priority"], 2);
    }

    #[test]
    fn merge_lets_options_win_in_place() {
        let merged = merge(
            payload! { "phone" => "+57300", "mode" => "devices" },
            payload! { "mode" => "credits", "sim" => 2 },
        );
        let keys: Vec<&str> = merged.keys().map(String::as_str).collect();
        assert_eq!(keys, ["phone", "mode", "sim"]);
        assert_eq!(merged["mode"], "credits");
    }

    async fn send(client: &ApiClient, fields: Payload) -> Result<Envelope> {
        send_with_defaults(client, &SEND, fields, vec![("priority", json!(2))]).await
    }

    #[tokio::test]
    async fn facades_sharing_the_send_shape_behave_identically() {
        let config = ClientConfig::with_api_key("shared-key").unwrap();
        let sms_stub = StubTransport::new();
        let wa_stub = StubTransport::new();
        let sms = ApiClient::new(config.clone(), sms_stub.clone()).for_resource("SMS");
        let wa = ApiClient::new(config, wa_stub.clone()).for_resource("WhatsApp");
        let fields = payload! { "to" => "+57300", "message" => "hi" };

        let a = send(&sms, fields.clone()).await.unwrap();
        let b = send(&wa, fields.clone()).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(sms_stub.last_request(), wa_stub.last_request());
        assert_eq!(sms_stub.last_request().unwrap().body["priority"], 2);

        let err_a = send(&sms, payload! { "to" => "+57300" }).await.unwrap_err();
        let err_b = send(&wa, payload! { "to" => "+57300" }).await.unwrap_err();
        assert_eq!(err_a.to_string(), err_b.to_string());

        sms_stub.fail("Connection refused");
        wa_stub.fail("Connection refused");
        let err_a = send(&sms, fields.clone()).await.unwrap_err();
        let err_b = send(&wa, fields).await.unwrap_err();
        assert_eq!(err_a.to_string(), "SMS API Error: Connection refused");
        assert_eq!(err_b.to_string(), "WhatsApp API Error: Connection refused");
    }
}
