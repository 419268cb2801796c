//! Final reply delivery and interim notice lifecycle.

use sigma_core::{
    error::DeliveryError,
    message::{MessageMetadata, OutboundReply, OutgoingMessage},
    traits::Channel,
};
use std::sync::Arc;
use tracing::warn;

/// Sends replies through a channel and cleans up superseded notices.
#[derive(Clone)]
pub(crate) struct ResponseDispatcher {
    channel: Arc<dyn Channel>,
}

impl ResponseDispatcher {
    pub(crate) fn new(channel: Arc<dyn Channel>) -> Self {
        Self { channel }
    }

    /// Post an interim "working..." notice and return its message id.
    pub(crate) async fn notify(&self, target: &str, text: &str) -> Result<i64, DeliveryError> {
        self.send(target, text, MessageMetadata::default()).await
    }

    /// Deliver a final reply.
    ///
    /// The superseded notice is deleted only after the reply was accepted;
    /// a failed deletion is logged and otherwise ignored. A failed send is
    /// returned as-is and the notice stays up.
    pub(crate) async fn deliver(&self, reply: OutboundReply) -> Result<(), DeliveryError> {
        self.deliver_with(reply, MessageMetadata::default()).await
    }

    /// [`deliver`](Self::deliver), attaching generation metadata.
    pub(crate) async fn deliver_with(
        &self,
        reply: OutboundReply,
        metadata: MessageMetadata,
    ) -> Result<(), DeliveryError> {
        self.send(&reply.target, &reply.text, metadata).await?;

        if let Some(notice_id) = reply.supersedes_notice {
            if let Err(e) = self.channel.delete(&reply.target, notice_id).await {
                warn!("failed to delete notice {notice_id} in {}: {e}", reply.target);
            }
        }
        Ok(())
    }

    async fn send(
        &self,
        target: &str,
        text: &str,
        metadata: MessageMetadata,
    ) -> Result<i64, DeliveryError> {
        if target.is_empty() {
            return Err(DeliveryError::MissingTarget);
        }
        let message = OutgoingMessage {
            text: text.to_string(),
            metadata,
            reply_target: Some(target.to_string()),
        };
        Ok(self.channel.send(message).await?)
    }
}
