use std::sync::Arc;
use std::time::Duration;

use lexi_types::{MessageResponse, PageMessage, TabId};

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("no tab with id {0}")]
    UnknownTab(TabId),

    #[error("receiving end does not exist in {0}")]
    NotInitialized(TabId),

    #[error("cannot inject renderer into {0}")]
    InjectionBlocked(TabId),

    #[error("renderer in {0} dropped the message without replying")]
    NoResponse(TabId),
}

/// Transport to page renderers
#[async_trait::async_trait]
pub trait TabMessenger: Send + Sync {
    /// Hand `message` to the renderer in `tab` and wait for its reply
    async fn send(&self, tab: TabId, message: PageMessage) -> Result<MessageResponse, DeliveryError>;

    /// Load the renderer into `tab`
    async fn inject(&self, tab: TabId) -> Result<(), DeliveryError>;
}

/// Delivers popup messages, loading the renderer once if the page lacks one
#[derive(Clone)]
pub struct MessageRouter {
    messenger: Arc<dyn TabMessenger>,
    grace: Duration,
}

impl MessageRouter {
    pub fn new(messenger: Arc<dyn TabMessenger>, grace: Duration) -> Self {
        Self { messenger, grace }
    }

    /// Send, or inject + wait + resend once. Failures are logged, never returned.
    pub async fn deliver(&self, tab: TabId, message: PageMessage) -> Option<MessageResponse> {
        let action = message.action();

        match self.messenger.send(tab, message.clone()).await {
            Ok(response) => return Some(log_response(tab, action, response)),
            Err(DeliveryError::NotInitialized(_)) => {
                tracing::debug!("[ROUTER] No renderer in {}, injecting", tab);
            }
            Err(e) => {
                tracing::warn!("[ROUTER] Could not deliver {} to {}: {}", action, tab, e);
                return None;
            }
        }

        if let Err(e) = self.messenger.inject(tab).await {
            tracing::warn!("[ROUTER] Injection into {} failed: {}", tab, e);
            return None;
        }

        tokio::time::sleep(self.grace).await;

        match self.messenger.send(tab, message).await {
            Ok(response) => Some(log_response(tab, action, response)),
            Err(e) => {
                tracing::error!(
                    "[ROUTER] Retry of {} to {} failed, dropping it: {}",
                    action,
                    tab,
                    e
                );
                None
            }
        }
    }
}

fn log_response(tab: TabId, action: &str, response: MessageResponse) -> MessageResponse {
    if !response.success {
        tracing::warn!(
            "[ROUTER] {} in {} reported: {}",
            action,
            tab,
            response.error.as_deref().unwrap_or("unknown error")
        );
    }
    response
}
