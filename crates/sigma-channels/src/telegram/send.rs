//! Message sending: text, deletion, chat actions, and command registration.

use super::types::{TgResponse, TgSentMessage};
use super::TelegramChannel;
use crate::utils::split_message;
use sigma_core::error::SigmaError;
use tracing::{info, warn};

/// Telegram's per-message limit, in bytes of UTF-8.
const MAX_MESSAGE_LEN: usize = 4096;

impl TelegramChannel {
    /// Send a text message to a specific chat, splitting long texts.
    ///
    /// Returns the id of the first posted chunk.
    pub(crate) async fn send_text(&self, chat_id: i64, text: &str) -> Result<i64, SigmaError> {
        let mut first_id = None;

        for chunk in split_message(text, MAX_MESSAGE_LEN) {
            let id = self.send_chunk(chat_id, chunk).await?;
            first_id.get_or_insert(id);
        }

        first_id.ok_or_else(|| SigmaError::Channel("telegram send: empty message".into()))
    }

    /// Post one chunk as Markdown, retrying as plain text if Telegram cannot
    /// parse the entities (model output is not always valid Markdown).
    async fn send_chunk(&self, chat_id: i64, chunk: &str) -> Result<i64, SigmaError> {
        let url = format!("{}/sendMessage", self.base_url);
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": chunk,
            "parse_mode": "Markdown",
        });

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SigmaError::Channel(format!("telegram send failed: {}", e.without_url())))?;

        let status = resp.status();
        if status.is_success() {
            return parse_sent(resp).await;
        }

        let error_text = resp.text().await.unwrap_or_default();
        if !error_text.contains("can't parse entities") {
            return Err(SigmaError::Channel(format!(
                "telegram send failed ({status}): {error_text}"
            )));
        }

        warn!("Markdown parse failed, retrying as plain text: {error_text}");
        let plain_body = serde_json::json!({
            "chat_id": chat_id,
            "text": chunk,
        });
        let plain_resp = self
            .client
            .post(&url)
            .json(&plain_body)
            .send()
            .await
            .map_err(|e| {
                SigmaError::Channel(format!("telegram send (plain) failed: {}", e.without_url()))
            })?;
        if !plain_resp.status().is_success() {
            let plain_err = plain_resp.text().await.unwrap_or_default();
            return Err(SigmaError::Channel(format!(
                "telegram send (plain fallback) failed: {plain_err}"
            )));
        }
        parse_sent(plain_resp).await
    }

    /// Delete a message previously posted by the bot.
    pub(crate) async fn delete_message(
        &self,
        chat_id: i64,
        message_id: i64,
    ) -> Result<(), SigmaError> {
        let url = format!("{}/deleteMessage", self.base_url);
        let body = serde_json::json!({
            "chat_id": chat_id,
            "message_id": message_id,
        });

        let resp = self.client.post(&url).json(&body).send().await.map_err(|e| {
            SigmaError::Channel(format!("telegram deleteMessage failed: {}", e.without_url()))
        })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            return Err(SigmaError::Channel(format!(
                "telegram deleteMessage failed ({status}): {error_text}"
            )));
        }
        Ok(())
    }

    /// Register bot commands with Telegram so users see an autocomplete menu.
    /// Best-effort: logs failures but does not propagate errors.
    pub(crate) async fn register_commands(&self) {
        let commands = serde_json::json!({
            "commands": [
                { "command": "start", "description": "Что умеет бот" },
            ]
        });

        let url = format!("{}/setMyCommands", self.base_url);
        match self.client.post(&url).json(&commands).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!("registered Telegram bot commands");
            }
            Ok(resp) => {
                let body = resp.text().await.unwrap_or_default();
                warn!("failed to register Telegram bot commands: {body}");
            }
            Err(e) => {
                warn!(
                    "failed to register Telegram bot commands: {}",
                    e.without_url()
                );
            }
        }
    }

    /// Send a chat action (e.g. "typing") to a chat.
    pub(crate) async fn send_chat_action(
        &self,
        chat_id: i64,
        action: &str,
    ) -> Result<(), SigmaError> {
        let url = format!("{}/sendChatAction", self.base_url);
        let body = serde_json::json!({
            "chat_id": chat_id,
            "action": action,
        });

        self.client.post(&url).json(&body).send().await.map_err(|e| {
            SigmaError::Channel(format!("telegram sendChatAction failed: {}", e.without_url()))
        })?;

        Ok(())
    }
}

async fn parse_sent(resp: reqwest::Response) -> Result<i64, SigmaError> {
    let body: TgResponse<TgSentMessage> = resp.json().await.map_err(|e| {
        SigmaError::Channel(format!("telegram send parse failed: {}", e.without_url()))
    })?;
    body.result.map(|m| m.message_id).ok_or_else(|| {
        SigmaError::Channel(format!(
            "telegram send returned no message: {}",
            body.description.unwrap_or_default()
        ))
    })
}
