//! Long-polling update loop and Channel trait implementation.

use super::types::{TgFile, TgMessage, TgResponse, TgUpdate};
use super::TelegramChannel;
use async_trait::async_trait;
use sigma_core::{
    error::SigmaError,
    message::{IncomingMessage, OutgoingMessage, Payload},
    traits::Channel,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use uuid::Uuid;

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<mpsc::Receiver<IncomingMessage>, SigmaError> {
        self.register_commands().await;

        let (tx, rx) = mpsc::channel(64);
        let client = self.client.clone();
        let base_url = self.base_url.clone();
        let poll_timeout = self.config.poll_timeout_secs;
        let last_update_id = self.last_update_id.clone();

        info!("Telegram channel starting long polling...");

        tokio::spawn(async move {
            let mut backoff_secs: u64 = 1;

            loop {
                let offset = last_update_id.lock().await.map(|id| id + 1);

                let mut url = format!("{base_url}/getUpdates?timeout={poll_timeout}");
                if let Some(off) = offset {
                    url.push_str(&format!("&offset={off}"));
                }

                let resp = match client
                    .get(&url)
                    .timeout(Duration::from_secs(poll_timeout + 5))
                    .send()
                    .await
                {
                    Ok(r) => r,
                    Err(e) => {
                        error!(
                            "telegram poll error (retry in {backoff_secs}s): {}",
                            e.without_url()
                        );
                        tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                let body: TgResponse<Vec<TgUpdate>> = match resp.json().await {
                    Ok(b) => b,
                    Err(e) => {
                        error!(
                            "telegram parse error (retry in {backoff_secs}s): {}",
                            e.without_url()
                        );
                        tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                if !body.ok {
                    error!(
                        "telegram API error (retry in {backoff_secs}s): {}",
                        body.description.unwrap_or_default()
                    );
                    tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                    backoff_secs = (backoff_secs * 2).min(60);
                    continue;
                }

                // Successful poll -- reset backoff.
                backoff_secs = 1;

                let updates = body.result.unwrap_or_default();

                if let Some(last_update) = updates.last() {
                    *last_update_id.lock().await = Some(last_update.update_id);
                }

                for update in updates {
                    let Some(msg) = update.message else {
                        continue;
                    };
                    let Some(incoming) = to_incoming(msg) else {
                        continue;
                    };

                    if tx.send(incoming).await.is_err() {
                        info!("telegram channel receiver dropped, stopping poll");
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn send(&self, message: OutgoingMessage) -> Result<i64, SigmaError> {
        let chat_id = parse_chat_id(message.reply_target.as_deref())?;
        self.send_text(chat_id, &message.text).await
    }

    async fn delete(&self, target: &str, message_id: i64) -> Result<(), SigmaError> {
        let chat_id = parse_chat_id(Some(target))?;
        self.delete_message(chat_id, message_id).await
    }

    async fn download(&self, file_id: &str) -> Result<Vec<u8>, SigmaError> {
        download_telegram_file(&self.client, &self.base_url, &self.file_url, file_id).await
    }

    async fn send_typing(&self, target: &str) -> Result<(), SigmaError> {
        let chat_id = parse_chat_id(Some(target))?;
        self.send_chat_action(chat_id, "typing").await
    }

    async fn stop(&self) -> Result<(), SigmaError> {
        info!("Telegram channel stopped");
        Ok(())
    }
}

fn parse_chat_id(target: Option<&str>) -> Result<i64, SigmaError> {
    let target =
        target.ok_or_else(|| SigmaError::Channel("no reply_target on outgoing message".into()))?;
    target
        .parse()
        .map_err(|e| SigmaError::Channel(format!("invalid telegram chat_id '{target}': {e}")))
}

/// Convert a raw Telegram message into a pipeline message.
///
/// Only text and photo messages are forwarded. For photos only the handle of
/// the largest size is kept; nothing is downloaded here.
pub(crate) fn to_incoming(msg: TgMessage) -> Option<IncomingMessage> {
    let user = msg.from?;

    let payload = if let Some(text) = msg.text {
        Payload::Text(text)
    } else if let Some(photos) = msg.photo {
        // Telegram sends multiple sizes; the last is the largest.
        let largest = photos.into_iter().last()?;
        debug!(
            "telegram: photo from {} ({}x{})",
            user.id, largest.width, largest.height
        );
        Payload::Photo {
            file_id: largest.file_id,
            caption: msg.caption,
        }
    } else {
        debug!("telegram: skipping unsupported message from {}", user.id);
        return None;
    };

    let sender_name = if let Some(ref un) = user.username {
        format!("@{un}")
    } else if let Some(ref ln) = user.last_name {
        format!("{} {ln}", user.first_name)
    } else {
        user.first_name.clone()
    };

    Some(IncomingMessage {
        id: Uuid::new_v4(),
        channel: "telegram".to_string(),
        sender_id: user.id,
        sender_name: Some(sender_name),
        payload,
        timestamp: chrono::Utc::now(),
        reply_target: Some(msg.chat.id.to_string()),
    })
}

/// Download a file from Telegram servers by file_id.
async fn download_telegram_file(
    client: &reqwest::Client,
    base_url: &str,
    file_url: &str,
    file_id: &str,
) -> Result<Vec<u8>, SigmaError> {
    // Step 1: getFile to obtain file_path.
    let url = format!("{base_url}/getFile?file_id={file_id}");
    let resp: TgResponse<TgFile> = client
        .get(&url)
        .send()
        .await
        .map_err(|e| SigmaError::Channel(format!("telegram getFile failed: {}", e.without_url())))?
        .json()
        .await
        .map_err(|e| {
            SigmaError::Channel(format!("telegram getFile parse failed: {}", e.without_url()))
        })?;

    if !resp.ok {
        return Err(SigmaError::Channel(format!(
            "telegram getFile rejected: {}",
            resp.description.unwrap_or_default()
        )));
    }

    let file_path = resp
        .result
        .and_then(|f| f.file_path)
        .ok_or_else(|| SigmaError::Channel("telegram getFile returned no file_path".into()))?;

    // Step 2: Download the actual file bytes.
    let download = client
        .get(format!("{file_url}/{file_path}"))
        .send()
        .await
        .map_err(|e| {
            SigmaError::Channel(format!("telegram file download failed: {}", e.without_url()))
        })?;

    if !download.status().is_success() {
        return Err(SigmaError::Channel(format!(
            "telegram file download failed ({})",
            download.status()
        )));
    }

    let bytes = download.bytes().await.map_err(|e| {
        SigmaError::Channel(format!("telegram file read failed: {}", e.without_url()))
    })?;

    Ok(bytes.to_vec())
}
