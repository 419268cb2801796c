use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An incoming message from a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub id: Uuid,
    /// Channel name (e.g. "telegram").
    pub channel: String,
    /// Platform-specific user ID. This is what the allow-list is checked against.
    pub sender_id: i64,
    /// Human-readable sender name.
    pub sender_name: Option<String>,
    pub payload: Payload,
    pub timestamp: DateTime<Utc>,
    /// Platform-specific target for routing the response (e.g. Telegram chat_id).
    #[serde(default)]
    pub reply_target: Option<String>,
}

/// What the sender actually sent.
///
/// Photos are carried as an opaque platform handle; the bytes are only
/// fetched once the sender has been authorized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Payload {
    Text(String),
    Photo {
        file_id: String,
        #[serde(default)]
        caption: Option<String>,
    },
}

impl Payload {
    /// Short description for log lines.
    pub fn preview(&self, max_chars: usize) -> String {
        let text = match self {
            Payload::Text(t) => t.as_str(),
            Payload::Photo { caption, .. } => caption.as_deref().unwrap_or("[Photo]"),
        };
        if text.chars().count() > max_chars {
            let truncated: String = text.chars().take(max_chars).collect();
            format!("{truncated}...")
        } else {
            text.to_string()
        }
    }
}

/// An outgoing message to send back through a channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub text: String,
    pub metadata: MessageMetadata,
    /// Platform-specific target for routing (e.g. Telegram chat_id).
    #[serde(default)]
    pub reply_target: Option<String>,
}

/// Metadata about how a message was generated.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MessageMetadata {
    /// Which provider produced this response (empty for fast-path replies).
    pub provider_used: String,
    /// Token count (if available from the provider).
    pub tokens_used: Option<u64>,
    /// Wall-clock processing time in milliseconds.
    pub processing_time_ms: u64,
    /// Model identifier (if applicable).
    pub model: Option<String>,
}

/// A final reply addressed to one sender.
///
/// `supersedes_notice` names the interim "working..." message that must be
/// removed once this reply has been accepted by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundReply {
    pub target: String,
    pub text: String,
    pub supersedes_notice: Option<i64>,
}

impl OutboundReply {
    pub fn new(target: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            text: text.into(),
            supersedes_notice: None,
        }
    }

    /// Mark this reply as replacing an interim notice.
    pub fn superseding(mut self, notice_id: Option<i64>) -> Self {
        self.supersedes_notice = notice_id;
        self
    }
}
