use thiserror::Error;

/// Top-level error type for Sigma.
#[derive(Debug, Error)]
pub enum SigmaError {
    /// Error from an AI provider.
    #[error("provider error: {0}")]
    Provider(String),

    /// Error from a messaging channel.
    #[error("channel error: {0}")]
    Channel(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of a single round trip to the generative backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AiError {
    /// The per-call deadline elapsed.
    #[error("AI backend timed out after {0}s")]
    Timeout(u64),

    /// Connectivity, DNS, or TLS failure before a response arrived.
    #[error("AI transport error: {0}")]
    Transport(String),

    /// Non-success status, malformed body, or an empty/blocked answer.
    #[error("AI backend error: {detail}")]
    Backend { status: Option<u16>, detail: String },

    /// Missing or invalid credential. Raised at construction, never per call.
    #[error("AI configuration error: {0}")]
    Configuration(String),
}

impl AiError {
    /// Whether a retry could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Transport(_))
    }

    /// Short machine-friendly label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
            Self::Transport(_) => "transport",
            Self::Backend { .. } => "backend",
            Self::Configuration(_) => "configuration",
        }
    }
}

impl From<AiError> for SigmaError {
    fn from(e: AiError) -> Self {
        match e {
            AiError::Configuration(msg) => SigmaError::Config(msg),
            other => SigmaError::Provider(other.to_string()),
        }
    }
}

/// Failure to hand a reply to the messaging platform.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The outgoing message had no routable target.
    #[error("no reply target for outgoing message")]
    MissingTarget,

    /// The platform rejected or never received the message.
    #[error("delivery failed: {0}")]
    Send(String),
}

impl From<SigmaError> for DeliveryError {
    fn from(e: SigmaError) -> Self {
        DeliveryError::Send(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_kinds() {
        assert!(AiError::Timeout(60).is_retryable());
        assert!(AiError::Transport("dns".into()).is_retryable());
        assert!(!AiError::Backend {
            status: Some(500),
            detail: "boom".into()
        }
        .is_retryable());
        assert!(!AiError::Configuration("no key".into()).is_retryable());
    }

    #[test]
    fn test_io_error_converts() {
        let err: SigmaError =
            std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken").into();
        assert!(matches!(err, SigmaError::Io(_)));
        assert_eq!(err.to_string(), "io error: port taken");
    }

    #[test]
    fn test_configuration_maps_to_config_error() {
        let err: SigmaError = AiError::Configuration("GEMINI_API_KEY is empty".into()).into();
        assert!(matches!(err, SigmaError::Config(_)));
        let err: SigmaError = AiError::Timeout(5).into();
        assert!(err.to_string().contains("timed out after 5s"));
    }
}
