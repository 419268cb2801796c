//! Message processing pipeline: gate, resolve, classify, answer, deliver.

use super::intent::classify;
use super::prompt;
use super::Gateway;
use sigma_core::{
    config::Prompts,
    error::AiError,
    intent::{Content, Intent},
    message::{IncomingMessage, MessageMetadata, OutboundReply, Payload},
    prompt::PromptRequest,
    traits::Provider,
};
use sigma_quant::{RiskCalculator, RiskError};
use std::time::Duration;
use tracing::{error, info, warn};

/// How often the typing indicator is refreshed while waiting on the backend.
const TYPING_INTERVAL: Duration = Duration::from_secs(5);

impl Gateway {
    /// Process a single incoming message through the full pipeline.
    ///
    /// Every failure ends in a log line and, where a reply is still possible,
    /// an apology to the sender. Nothing here propagates to the receive loop.
    pub(super) async fn handle_message(&self, incoming: IncomingMessage) {
        info!(
            "[{}] {} ({}) says: {}",
            incoming.channel,
            incoming.sender_name.as_deref().unwrap_or("unknown"),
            incoming.sender_id,
            incoming.payload.preview(60)
        );

        let Some(target) = incoming.reply_target.clone() else {
            warn!("message {} has no reply target, dropping", incoming.id);
            return;
        };

        // --- 1. ACCESS GATE ---
        // Runs before anything else: no download, no AI call for strangers.
        if !self.access.authorize(incoming.sender_id) {
            warn!(
                "access denied for {} on {}",
                incoming.sender_id, incoming.channel
            );
            self.reply(OutboundReply::new(&target, &self.auth_config.deny_message))
                .await;
            return;
        }

        // --- 2. RESOLVE CONTENT ---
        let mut notice = None;
        let content = match incoming.payload {
            Payload::Text(text) => Content::Text(text),
            Payload::Photo { file_id, .. } => {
                notice = self.post_notice(&target, &self.prompts.chart_notice).await;
                match self.channel.download(&file_id).await {
                    Ok(bytes) => Content::Image(bytes),
                    Err(e) => {
                        error!("photo download failed for {}: {e}", incoming.sender_id);
                        self.reply(
                            OutboundReply::new(&target, &self.prompts.download_error)
                                .superseding(notice),
                        )
                        .await;
                        return;
                    }
                }
            }
        };

        // --- 3. CLASSIFY ---
        let intent = classify(content);
        info!("intent for {}: {}", incoming.sender_id, intent.label());

        // --- 4. FAST PATH ---
        if let Some(text) = fast_reply(&intent, &self.prompts, &self.risk) {
            self.reply(OutboundReply::new(&target, text).superseding(notice))
                .await;
            return;
        }

        let chart_model = self.chart_model.as_deref();
        let Some(request) = prompt::build(intent, &self.prompts, chart_model) else {
            error!("no prompt template for a non-fast-path intent");
            return;
        };

        // --- 5. AI BACKEND ---
        if notice.is_none() {
            notice = self
                .post_notice(&target, &self.prompts.thinking_notice)
                .await;
        }

        let typing_handle = {
            let channel = self.channel.clone();
            let target = target.clone();
            tokio::spawn(async move {
                loop {
                    if channel.send_typing(&target).await.is_err() {
                        break;
                    }
                    tokio::time::sleep(TYPING_INTERVAL).await;
                }
            })
        };

        let (text, metadata) = ai_reply(self.provider.as_ref(), &request, &self.prompts).await;
        typing_handle.abort();

        // --- 6. DELIVER ---
        let reply = OutboundReply::new(&target, text).superseding(notice);
        if let Err(e) = self.dispatcher.deliver_with(reply, metadata).await {
            error!("failed to deliver reply to {}: {e}", incoming.sender_id);
        }
    }

    /// Deliver a reply, logging instead of propagating failures.
    async fn reply(&self, reply: OutboundReply) {
        let target = reply.target.clone();
        if let Err(e) = self.dispatcher.deliver(reply).await {
            error!("failed to send reply to {target}: {e}");
        }
    }

    /// Post an interim notice. A failure only costs the notice.
    async fn post_notice(&self, target: &str, text: &str) -> Option<i64> {
        match self.dispatcher.notify(target, text).await {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("failed to post notice to {target}: {e}");
                None
            }
        }
    }
}

/// Answer a fast-path intent locally. `None` means the intent needs the backend.
pub(super) fn fast_reply(intent: &Intent, prompts: &Prompts, risk: &RiskCalculator) -> Option<String> {
    match intent {
        Intent::Welcome => Some(prompts.welcome.clone()),
        Intent::Gratitude => Some(prompts.gratitude.clone()),
        Intent::RiskQuery { balance } => Some(match risk.compute(*balance) {
            Ok(advice) => prompts
                .risk_reply
                .replace("{balance}", &advice.balance.to_string())
                .replace("{percent}", &advice.percent().to_string())
                .replace("{risk}", &advice.risk_amount.to_string()),
            Err(RiskError::NonPositiveBalance(b)) => {
                warn!("rejected risk query with balance {b}");
                prompts.risk_invalid.clone()
            }
        }),
        Intent::GeneralQuery { .. } | Intent::ChartAnalysis { .. } => None,
    }
}

/// Run one backend round trip and turn the outcome into reply text.
///
/// Failures become the configured apology; a timeout gets its own wording.
pub(super) async fn ai_reply(
    provider: &dyn Provider,
    request: &PromptRequest,
    prompts: &Prompts,
) -> (String, MessageMetadata) {
    match provider.complete(request).await {
        Ok(resp) => {
            info!(
                "{} answered {:?} in {}ms",
                provider.name(),
                request.template,
                resp.processing_time_ms
            );
            let metadata = MessageMetadata {
                provider_used: provider.name().to_string(),
                tokens_used: resp.tokens_used,
                processing_time_ms: resp.processing_time_ms,
                model: Some(resp.model),
            };
            (resp.text, metadata)
        }
        Err(e @ AiError::Timeout(_)) => {
            error!("{} timed out: {e}", provider.name());
            (prompts.ai_timeout.clone(), MessageMetadata::default())
        }
        Err(e) => {
            error!("{} failed ({}): {e}", provider.name(), e.kind());
            (prompts.ai_error.clone(), MessageMetadata::default())
        }
    }
}

/// Answer a single text message without a channel (used by `sigma ask`).
pub async fn ask(
    provider: &dyn Provider,
    prompts: &Prompts,
    risk: &RiskCalculator,
    text: String,
) -> String {
    let intent = classify(Content::Text(text));
    if let Some(reply) = fast_reply(&intent, prompts, risk) {
        return reply;
    }
    match prompt::build(intent, prompts, None) {
        Some(request) => ai_reply(provider, &request, prompts).await.0,
        None => prompts.ai_error.clone(),
    }
}
