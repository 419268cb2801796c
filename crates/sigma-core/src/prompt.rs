//! Provider-agnostic request/response types for the generative backend.

use serde::{Deserialize, Serialize};

/// Which instruction template a request was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateId {
    GeneralQuery,
    ChartAnalysis,
}

/// User-supplied half of a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptContent {
    Text(String),
    Image { bytes: Vec<u8>, mime_type: String },
}

/// A fully formed request: instruction template plus user content.
///
/// Built per message, consumed once by a provider, then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub template: TemplateId,
    pub instruction: String,
    pub content: PromptContent,
    /// Override the provider's default model.
    pub model: Option<String>,
}

/// Successful answer from the generative backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiResponse {
    pub text: String,
    pub model: String,
    pub tokens_used: Option<u64>,
    pub processing_time_ms: u64,
}

/// Guess an image MIME type from its magic bytes. Telegram photos are JPEG,
/// so that is the fallback.
pub fn sniff_image_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        _ => "image/jpeg",
    }
}
