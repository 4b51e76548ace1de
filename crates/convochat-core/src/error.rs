use thiserror::Error;

/// Errors that can occur during ConvoChat operations
#[derive(Debug, Error)]
pub enum ConvoChatError {
    /// Invalid or missing API key, base URL or timeout. Never retried.
    #[error("{0}")]
    Configuration(String),
    /// A required request field is missing or empty
    #[error("Missing required parameter: {0}")]
    Validation(String),
    /// The call did not produce a usable JSON envelope
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// A job could not be handed over to the queue
    #[error("queue error: {0}")]
    Queue(String),
}

impl ConvoChatError {
    /// Only transport failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Name of the field that failed validation, if this is a validation error.
    pub fn missing_field(&self) -> Option<&str> {
        match self {
            Self::Validation(field) => Some(field),
            _ => None,
        }
    }
}

/// Transport-level failures, tagged with the resource that issued the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connection refused, timeout, DNS or TLS failure
    #[error("{resource} API Error: {message}")]
    Request {
        resource: &'static str,
        message: String,
        code: Option<u16>,
    },
    /// The body was not JSON, or was a JSON scalar
    #[error("Invalid JSON response from ConvoChat API")]
    InvalidJson { resource: &'static str },
}

impl TransportError {
    pub fn resource(&self) -> &'static str {
        match self {
            Self::Request { resource, .. } | Self::InvalidJson { resource } => resource,
        }
    }
}

pub type Result<T, E = ConvoChatError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_message_names_the_resource() {
        let err = ConvoChatError::from(TransportError::Request {
            resource: "SMS",
            message: "Connection timeout".into(),
            code: None,
        });
        assert_eq!(err.to_string(), "SMS API Error: Connection timeout");
        assert!(err.is_retryable());
    }

    #[test]
    fn validation_is_not_retryable() {
        let err = ConvoChatError::Validation("phone".into());
        assert_eq!(err.to_string(), "Missing required parameter: phone");
        assert_eq!(err.missing_field(), Some("phone"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn invalid_json_keeps_resource_tag() {
        let err = TransportError::InvalidJson { resource: "OTP" };
        assert_eq!(err.resource(), "OTP");
        assert_eq!(err.to_string(), "Invalid JSON response from ConvoChat API");
    }
}
