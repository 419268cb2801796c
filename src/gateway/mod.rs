//! Gateway: the receive loop connecting the channel, the access policy, the
//! intent router and the AI provider.
//!
//! Each inbound message is handled in its own task. Components are built
//! once at startup and shared read-only, so concurrent messages never see
//! each other's state.

mod dispatch;
mod intent;
mod keywords;
mod pipeline;
mod prompt;


pub use pipeline::ask;

use dispatch::ResponseDispatcher;
use sigma_core::{
    auth::AccessPolicy,
    config::{AuthConfig, HealthConfig, Prompts},
    traits::{Channel, Provider},
};
use sigma_quant::RiskCalculator;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// The central gateway that routes messages between the channel and the provider.
pub struct Gateway {
    pub(super) provider: Arc<dyn Provider>,
    pub(super) channel: Arc<dyn Channel>,
    pub(super) access: Arc<AccessPolicy>,
    pub(super) dispatcher: ResponseDispatcher,
    pub(super) auth_config: AuthConfig,
    pub(super) health_config: HealthConfig,
    pub(super) prompts: Prompts,
    pub(super) risk: RiskCalculator,
    /// Model override for chart analysis.
    pub(super) chart_model: Option<String>,
}

impl Gateway {
    /// Create a new gateway.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        provider: Arc<dyn Provider>,
        channel: Arc<dyn Channel>,
        access: Arc<AccessPolicy>,
        auth_config: AuthConfig,
        health_config: HealthConfig,
        prompts: Prompts,
        risk: RiskCalculator,
        chart_model: Option<String>,
    ) -> Self {
        let dispatcher = ResponseDispatcher::new(channel.clone());
        Self {
            provider,
            channel,
            access,
            dispatcher,
            auth_config,
            health_config,
            prompts,
            risk,
            chart_model,
        }
    }

    /// Run the main event loop until Ctrl-C or until the channel closes.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        info!(
            "Sigma gateway running | provider: {} | channel: {} | authorized senders: {}",
            self.provider.name(),
            self.channel.name(),
            self.access.len(),
        );

        // The sidecar has its own failure domain: if it dies, messages still flow.
        let api_handle = if self.health_config.enabled {
            let health_config = self.health_config.clone();
            Some(tokio::spawn(async move {
                if let Err(e) = crate::api::serve(health_config).await {
                    error!("liveness sidecar stopped: {e}");
                }
            }))
        } else {
            None
        };

        let mut rx = match self.channel.start().await {
            Ok(rx) => rx,
            Err(e) => {
                if let Some(h) = api_handle {
                    h.abort();
                }
                anyhow::bail!("failed to start channel {}: {e}", self.channel.name());
            }
        };
        info!("Channel started: {}", self.channel.name());

        loop {
            tokio::select! {
                maybe = rx.recv() => match maybe {
                    Some(incoming) => {
                        let gw = self.clone();
                        tokio::spawn(async move {
                            gw.handle_message(incoming).await;
                        });
                    }
                    None => {
                        warn!("channel {} closed its inbound stream", self.channel.name());
                        break;
                    }
                },
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        self.shutdown(api_handle).await;
        Ok(())
    }

    /// Graceful shutdown: stop the sidecar, then the channel.
    async fn shutdown(&self, api_handle: Option<JoinHandle<()>>) {
        info!("Shutting down...");

        if let Some(h) = api_handle {
            h.abort();
        }

        if let Err(e) = self.channel.stop().await {
            warn!("failed to stop channel {}: {e}", self.channel.name());
        }

        info!("Shutdown complete.");
    }
}
