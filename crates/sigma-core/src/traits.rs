use crate::{
    error::{AiError, SigmaError},
    message::{IncomingMessage, OutgoingMessage},
    prompt::{AiResponse, PromptRequest},
};
use async_trait::async_trait;

/// AI Provider trait — the brain.
///
/// One unary round trip per call. Implementations hold no per-call mutable
/// state and are safe to share across in-flight messages, which is what
/// lets decorators such as retry wrap any provider transparently.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Send a built prompt and get the textual answer or a typed failure.
    async fn complete(&self, request: &PromptRequest) -> Result<AiResponse, AiError>;

    /// Check if the provider is reachable with the configured credential.
    async fn is_available(&self) -> bool;
}

/// Messaging Channel trait — the nervous system.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Start listening for incoming messages.
    /// Returns a receiver that yields incoming messages.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<IncomingMessage>, SigmaError>;

    /// Send a message. Returns the platform id of the (first) posted message.
    async fn send(&self, message: OutgoingMessage) -> Result<i64, SigmaError>;

    /// Remove a previously posted message.
    async fn delete(&self, target: &str, message_id: i64) -> Result<(), SigmaError>;

    /// Resolve an opaque file handle to its bytes.
    async fn download(&self, file_id: &str) -> Result<Vec<u8>, SigmaError>;

    /// Send a typing indicator to show the bot is processing.
    async fn send_typing(&self, _target: &str) -> Result<(), SigmaError> {
        Ok(())
    }

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), SigmaError>;
}
