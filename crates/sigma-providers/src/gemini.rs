//! Google Gemini API provider.
//!
//! Calls the Gemini `generateContent` endpoint, one unary request per prompt.
//! Images travel inline as base64 `inlineData` parts.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use sigma_core::{
    config::GeminiConfig,
    error::AiError,
    prompt::{AiResponse, PromptContent, PromptRequest},
    traits::Provider,
};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Google Gemini API provider.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiProvider {
    /// Create from config. An empty API key is rejected here so that a
    /// misconfigured process never starts polling.
    pub fn new(config: &GeminiConfig) -> Result<Self, AiError> {
        let api_key = config.api_key.trim();
        if api_key.is_empty() {
            return Err(AiError::Configuration("Gemini API key is empty".into()));
        }
        if config.timeout_secs == 0 {
            return Err(AiError::Configuration(
                "Gemini timeout must be greater than zero".into(),
            ));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> AiError {
        if e.is_timeout() {
            AiError::Timeout(self.timeout.as_secs())
        } else if e.is_decode() || e.is_body() {
            AiError::Backend {
                status: None,
                detail: format!("failed to read response: {e}"),
            }
        } else {
            AiError::Transport(e.to_string())
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    usage_metadata: Option<GeminiUsage>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    total_token_count: u64,
}

impl GeminiPart {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }
}

/// Translate a provider-agnostic request into the Gemini wire shape.
fn build_body(request: &PromptRequest) -> GeminiRequest {
    let system_instruction = if request.instruction.is_empty() {
        None
    } else {
        Some(GeminiContent {
            role: None,
            parts: vec![GeminiPart::text(request.instruction.clone())],
        })
    };

    let part = match &request.content {
        PromptContent::Text(text) => GeminiPart::text(text.clone()),
        PromptContent::Image { bytes, mime_type } => GeminiPart {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.clone(),
                data: BASE64.encode(bytes),
            }),
        },
    };

    GeminiRequest {
        contents: vec![GeminiContent {
            role: Some("user".to_string()),
            parts: vec![part],
        }],
        system_instruction,
    }
}

/// Pull the answer text out of a parsed response, or explain why there is none.
fn extract_text(parsed: &GeminiResponse) -> Result<String, AiError> {
    if let Some(reason) = parsed
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        return Err(AiError::Backend {
            status: None,
            detail: format!("prompt blocked: {reason}"),
        });
    }

    let candidate = parsed
        .candidates
        .as_ref()
        .and_then(|c| c.first())
        .ok_or_else(|| AiError::Backend {
            status: None,
            detail: "response has no candidates".into(),
        })?;

    let text: String = candidate
        .content
        .as_ref()
        .map(|c| {
            c.parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(AiError::Backend {
            status: None,
            detail: format!(
                "empty answer (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ),
        });
    }
    Ok(text)
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, request: &PromptRequest) -> Result<AiResponse, AiError> {
        let effective_model = request.model.as_deref().unwrap_or(&self.model);
        let start = Instant::now();
        let body = build_body(request);

        // Key goes in a header: reqwest errors embed the request URL.
        let url = format!("{}/models/{effective_model}:generateContent", self.base_url);
        debug!(
            "gemini: POST models/{effective_model}:generateContent ({:?})",
            request.template
        );

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(AiError::Backend {
                status: Some(status.as_u16()),
                detail: format!("gemini returned {status}: {text}"),
            });
        }

        let raw = resp.text().await.map_err(|e| self.map_send_error(e))?;
        let parsed: GeminiResponse = serde_json::from_str(&raw).map_err(|e| AiError::Backend {
            status: Some(status.as_u16()),
            detail: format!("gemini: failed to parse response: {e}"),
        })?;

        let text = extract_text(&parsed)?;
        let tokens = parsed.usage_metadata.as_ref().map(|u| u.total_token_count);

        Ok(AiResponse {
            text,
            model: effective_model.to_string(),
            tokens_used: tokens,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/models", self.base_url);
        match self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                warn!("gemini not available: {e}");
                false
            }
        }
    }
}
