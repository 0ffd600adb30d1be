use kanal::AsyncReceiver;
use lexi_config::popup::PopupConfig;
use lexi_types::{MessageResponse, PageMessage};
use tokio::sync::oneshot;

use crate::page::Page;
use crate::popup::PopupManager;

/// Everything that reaches a page renderer, in arrival order
#[derive(Debug)]
pub enum PageEvent {
    /// A router message; the handler's reply goes back through `reply`
    Message {
        message: PageMessage,
        reply: Option<oneshot::Sender<MessageResponse>>,
    },
    KeyDown {
        key: String,
    },
    /// Click at page coordinates
    Click {
        x: f64,
        y: f64,
    },
    /// The popup's close button was activated
    CloseClicked,
    Unload,
}

/// The page-side renderer: one per page, fed by a channel
pub struct ContentScript<P: Page> {
    popups: PopupManager<P>,
}

impl<P: Page> ContentScript<P> {
    pub fn new(page: P, config: PopupConfig, search_base: impl Into<String>) -> Self {
        Self {
            popups: PopupManager::new(page, config, search_base),
        }
    }

    pub fn popups(&self) -> &PopupManager<P> {
        &self.popups
    }

    /// Apply one event; returns false once the page is gone
    pub fn dispatch(&mut self, event: PageEvent) -> bool {
        match event {
            PageEvent::Message { message, reply } => {
                let response = self.popups.handle_message(message);
                if let Some(reply) = reply {
                    // Sender may have given up waiting
                    let _ = reply.send(response);
                }
            }
            PageEvent::KeyDown { key } => self.popups.handle_key(&key),
            PageEvent::Click { x, y } => self.popups.handle_click(x, y),
            PageEvent::CloseClicked => self.popups.close(),
            PageEvent::Unload => {
                self.popups.close();
                return false;
            }
        }
        true
    }

    /// Process events until the page unloads or every sender is gone
    pub async fn run(mut self, events: AsyncReceiver<PageEvent>) {
        tracing::debug!("[CONTENT] Renderer started");
        while let Ok(event) = events.recv().await {
            if !self.dispatch(event) {
                break;
            }
        }
        self.popups.close();
        tracing::debug!("[CONTENT] Renderer stopped");
    }
}
