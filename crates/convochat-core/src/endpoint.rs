use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::form_urlencoded::byte_serialize;

use crate::error::{ConvoChatError, Result};
use crate::Payload;

/// HTTP verb used by an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of one vendor operation.
///
/// Defined as `const` tables by each resource and never mutated. `{id}` in
/// the path is substituted by [`Endpoint::path_with_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub path: &'static str,
    pub method: Method,
    /// Identifier fields; only their presence is checked, so `0` is a valid id.
    pub identifiers: &'static [&'static str],
    /// Checked in declaration order; the first blank one is reported.
    pub required: &'static [&'static str],
    /// Fields masked in log records, on top of `secret`.
    pub redact: &'static [&'static str],
}

impl Endpoint {
    pub const fn new(method: Method, path: &'static str) -> Self {
        Self {
            path,
            method,
            identifiers: &[],
            required: &[],
            redact: &[],
        }
    }

    pub const fn get(path: &'static str) -> Self {
        Self::new(Method::Get, path)
    }

    pub const fn post(path: &'static str) -> Self {
        Self::new(Method::Post, path)
    }

    pub const fn put(path: &'static str) -> Self {
        Self::new(Method::Put, path)
    }

    pub const fn delete(path: &'static str) -> Self {
        Self::new(Method::Delete, path)
    }

    pub const fn requires(self, fields: &'static [&'static str]) -> Self {
        Self {
            required: fields,
            ..self
        }
    }

    pub const fn identified_by(self, fields: &'static [&'static str]) -> Self {
        Self {
            identifiers: fields,
            ..self
        }
    }

    pub const fn redacting(self, fields: &'static [&'static str]) -> Self {
        Self {
            redact: fields,
            ..self
        }
    }

    /// `{id}` replaced by `id`, percent-encoded as a single path segment.
    pub fn path_with_id(&self, id: &str) -> String {
        self.path.replace("{id}", &encode_segment(id))
    }

    /// Fail on the first identifier that is absent or null, then on the first
    /// required field that is absent or blank.
    pub fn validate(&self, fields: &Payload) -> Result<()> {
        for name in self.identifiers {
            match fields.get(*name) {
                Some(value) if !value.is_null() => {}
                _ => return Err(ConvoChatError::Validation((*name).to_string())),
            }
        }
        for name in self.required {
            match fields.get(*name) {
                Some(value) if !is_blank(value) => {}
                _ => return Err(ConvoChatError::Validation((*name).to_string())),
            }
        }
        Ok(())
    }
}

/// Ids that cannot name a single resource: blank, `.` or `..`.
pub fn is_invalid_segment(id: &str) -> bool {
    matches!(id.trim(), "" | "." | "..")
}

fn encode_segment(segment: &str) -> String {
    // form encoding writes spaces as '+'; a literal '+' is already %2B
    byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Falsy values the vendor treats as "not supplied": null, `false`, zero,
/// `""`, `"0"` and empty collections.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}
