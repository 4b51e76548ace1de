use std::ops::Index;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Decoded vendor response, returned verbatim.
///
/// Always a JSON object or array. The vendor reports application errors
/// inside the body, so an envelope may well describe a failure; inspect
/// [`Envelope::status`] rather than assuming success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Envelope(Value);

/// Normalized view over the envelope's `status` field.
///
/// Some endpoint families answer `"success"`/`"error"`, others an HTTP-like
/// integer. The raw value stays untouched in the envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeStatus {
    Success,
    Error,
    Code(i64),
    Other(String),
    Missing,
}

impl EnvelopeStatus {
    pub fn is_success(&self) -> bool {
        match self {
            EnvelopeStatus::Success => true,
            EnvelopeStatus::Code(code) => (200..300).contains(code),
            _ => false,
        }
    }
}

impl Envelope {
    /// `None` for JSON scalars.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(_) | Value::Array(_) => Some(Self(value)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn status(&self) -> EnvelopeStatus {
        match self.0.get("status") {
            None | Some(Value::Null) => EnvelopeStatus::Missing,
            Some(Value::String(s)) if s == "success" => EnvelopeStatus::Success,
            Some(Value::String(s)) if s == "error" => EnvelopeStatus::Error,
            Some(Value::String(s)) => EnvelopeStatus::Other(s.clone()),
            Some(Value::Number(n)) => match n.as_i64() {
                Some(code) => EnvelopeStatus::Code(code),
                None => EnvelopeStatus::Other(n.to_string()),
            },
            Some(other) => EnvelopeStatus::Other(other.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status().is_success()
    }

    /// The vendor's human-readable `message`, when present.
    pub fn message(&self) -> Option<&str> {
        self.0.get("message").and_then(Value::as_str)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl TryFrom<Value> for Envelope {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(_) | Value::Array(_) => Ok(Self(value)),
            scalar => Err(scalar),
        }
    }
}

impl Index<&str> for Envelope {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        &self.0[key]
    }
}
