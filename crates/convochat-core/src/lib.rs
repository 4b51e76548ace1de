//! # ConvoChat Core
//!
//! Core types for the ConvoChat messaging API.
//!
//! Every ConvoChat resource (SMS, WhatsApp, OTP, USSD, contacts, campaigns...)
//! speaks the same wire contract: a flat JSON body carrying a `secret`, sent
//! with JSON headers, answered by a JSON envelope whose `status` semantics
//! vary by endpoint family. This crate provides the pieces that contract is
//! built from:
//! - [`ClientConfig`]: validated API key, base URL and timeout
//! - [`Endpoint`]: static path / verb / required-field descriptor
//! - [`ApiClient`]: builds the payload, invokes the [`Transport`], decodes the
//!   [`Envelope`] and wraps failures in [`ConvoChatError`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use convochat_core::{payload, ApiClient, ClientConfig, Endpoint};
//!
//! const SEND: Endpoint = Endpoint::post("/send/sms").requires(&["phone", "message"]);
//!
//! let client = ApiClient::new(ClientConfig::with_api_key("key")?, transport).for_resource("SMS");
//! let envelope = client
//!     .call(&SEND, payload! { "phone" => "+573001234567", "message" => "hi" })
//!     .await?;
//! ```

pub mod client;
pub mod config;
pub mod endpoint;
pub mod envelope;
pub mod error;
pub mod record;
pub mod transport;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use client::ApiClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
pub use endpoint::{is_blank, Endpoint, Method};
pub use envelope::{Envelope, EnvelopeStatus};
pub use error::{ConvoChatError, Result, TransportError};
pub use record::{redact, CallSite, RequestRecord, REDACTED};
pub use transport::{Headers, HttpRequest, HttpResponse, Transport, TransportFailure};

#[doc(hidden)]
pub use serde_json;

/// Flat, insertion-ordered request body sent to the vendor.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Build a [`Payload`] from `"key" => value` pairs, preserving their order.
///
/// Values go through `serde_json::Value::from`, so strings, integers,
/// booleans, vectors and `Option`s are all accepted.
#[macro_export]
macro_rules! payload {
    () => {
        $crate::Payload::new()
    };
    ($($key:literal => $value:expr),+ $(,)?) => {{
        let mut map = $crate::Payload::new();
        $(
            map.insert(
                ::std::string::String::from($key),
                $crate::serde_json::Value::from($value),
            );
        )+
        map
    }};
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    #[test]
    fn payload_macro_keeps_insertion_order() {
        let p = payload! { "phone" => "+573001234567", "message" => "hi", "priority" => 2 };
        let keys: Vec<&str> = p.keys().map(String::as_str).collect();
        assert_eq!(keys, ["phone", "message", "priority"]);
        assert_eq!(p["priority"], json!(2));
    }

    #[test]
    fn payload_macro_accepts_optional_and_list_values() {
        let none: Option<String> = None;
        let p = payload! { "sid" => none, "recipients" => vec!["a", "b"] };
        assert!(p["sid"].is_null());
        assert_eq!(p["recipients"], json!(["a", "b"]));
        assert!(payload! {}.is_empty());
    }
}
