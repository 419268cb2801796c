use serde::{Deserialize, Serialize};

use super::defaults::*;

/// AI provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProviderConfig {
    #[serde(default)]
    pub gemini: GeminiConfig,
}

/// Google Gemini settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    /// Model used for chart screenshots. Unset = `model`.
    #[serde(default)]
    pub chart_model: Option<String>,
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    /// Hard deadline for one `generateContent` round trip.
    #[serde(default = "default_ai_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra attempts on timeout/transport errors. 0 disables retrying.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_gemini_model(),
            chart_model: None,
            base_url: default_gemini_base_url(),
            timeout_secs: default_ai_timeout_secs(),
            max_retries: default_max_retries(),
            retry_base_ms: default_retry_base_ms(),
        }
    }
}
