//! Telegram Bot API channel.
//!
//! Uses long polling via `getUpdates`, `sendMessage`/`deleteMessage` for
//! replies and `getFile` for photo downloads.
//! Docs: <https://core.telegram.org/bots/api>

mod polling;
mod send;
pub(crate) mod types;


use sigma_core::config::TelegramConfig;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Telegram channel using the Bot API with long polling.
pub struct TelegramChannel {
    config: TelegramConfig,
    client: reqwest::Client,
    /// `{api_url}/bot{token}`.
    base_url: String,
    /// `{api_url}/file/bot{token}`.
    file_url: String,
    /// Tracks the last update_id to avoid reprocessing.
    last_update_id: Arc<Mutex<Option<i64>>>,
}

impl TelegramChannel {
    /// Create a new Telegram channel from config.
    pub fn new(config: TelegramConfig) -> Self {
        let api_url = config.api_url.trim_end_matches('/');
        let base_url = format!("{api_url}/bot{}", config.bot_token);
        let file_url = format!("{api_url}/file/bot{}", config.bot_token);
        Self {
            config,
            client: reqwest::Client::new(),
            base_url,
            file_url,
            last_update_id: Arc::new(Mutex::new(None)),
        }
    }
}
