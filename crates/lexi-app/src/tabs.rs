use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use kanal::AsyncSender;
use lexi_config::Config;
use lexi_config::popup::PopupConfig;
use lexi_page::{ContentScript, HeadlessPage, Page, PageEvent};
use lexi_types::{MessageResponse, PageMessage, TabId};
use tokio::sync::oneshot;

use crate::router::{DeliveryError, TabMessenger};

/// Reads the live selection out of a page
#[async_trait]
pub trait SelectionSource: Send + Sync {
    async fn selected_text(&self, tab: TabId) -> Result<Option<String>, DeliveryError>;
}

struct Tab {
    page: HeadlessPage,
    renderer: Option<AsyncSender<PageEvent>>,
    /// Pages that refuse script injection (browser-internal pages)
    injectable: bool,
}

/// The set of open pages and their renderers
pub struct TabHub {
    tabs: Mutex<HashMap<TabId, Tab>>,
    next_id: AtomicU32,
    popup: PopupConfig,
    search_base: String,
    capacity: usize,
}

impl TabHub {
    pub fn new(config: &Config) -> Self {
        Self {
            tabs: Mutex::new(HashMap::new()),
            next_id: AtomicU32::new(1),
            popup: config.popup.clone(),
            search_base: config.fallback_search_url.clone(),
            capacity: config.router.channel_capacity,
        }
    }

    /// Open a page with no renderer loaded yet
    pub fn open(&self, page: HeadlessPage) -> TabId {
        self.insert(page, true)
    }

    /// Open a page that rejects renderer injection
    pub fn open_restricted(&self, page: HeadlessPage) -> TabId {
        self.insert(page, false)
    }

    pub fn page(&self, tab: TabId) -> Option<HeadlessPage> {
        self.tabs().get(&tab).map(|t| t.page.clone())
    }

    /// Forward a DOM event to the tab's renderer
    pub async fn dispatch(&self, tab: TabId, event: PageEvent) -> Result<(), DeliveryError> {
        let renderer = self.renderer(tab)?;
        renderer
            .send(event)
            .await
            .map_err(|_| DeliveryError::NotInitialized(tab))
    }

    /// Unload the page's renderer; a later message needs a fresh injection
    pub async fn unload(&self, tab: TabId) -> Result<(), DeliveryError> {
        let renderer = self.renderer(tab)?;
        if let Some(t) = self.tabs().get_mut(&tab) {
            t.renderer = None;
        }
        // Renderer may already be gone
        let _ = renderer.send(PageEvent::Unload).await;
        Ok(())
    }

    fn insert(&self, page: HeadlessPage, injectable: bool) -> TabId {
        let id = TabId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.tabs().insert(
            id,
            Tab {
                page,
                renderer: None,
                injectable,
            },
        );
        tracing::debug!("[TABS] Opened {}", id);
        id
    }

    fn renderer(&self, tab: TabId) -> Result<AsyncSender<PageEvent>, DeliveryError> {
        let tabs = self.tabs();
        let entry = tabs.get(&tab).ok_or(DeliveryError::UnknownTab(tab))?;
        match &entry.renderer {
            Some(renderer) if !renderer.is_closed() => Ok(renderer.clone()),
            _ => Err(DeliveryError::NotInitialized(tab)),
        }
    }

    fn tabs(&self) -> MutexGuard<'_, HashMap<TabId, Tab>> {
        self.tabs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TabMessenger for TabHub {
    async fn send(&self, tab: TabId, message: PageMessage) -> Result<MessageResponse, DeliveryError> {
        let renderer = self.renderer(tab)?;
        let (reply, response) = oneshot::channel();

        renderer
            .send(PageEvent::Message {
                message,
                reply: Some(reply),
            })
            .await
            .map_err(|_| DeliveryError::NotInitialized(tab))?;

        response.await.map_err(|_| DeliveryError::NoResponse(tab))
    }

    async fn inject(&self, tab: TabId) -> Result<(), DeliveryError> {
        let mut tabs = self.tabs();
        let entry = tabs.get_mut(&tab).ok_or(DeliveryError::UnknownTab(tab))?;
        if !entry.injectable {
            return Err(DeliveryError::InjectionBlocked(tab));
        }

        let (tx, rx) = kanal::bounded_async(self.capacity);
        let script = ContentScript::new(entry.page.clone(), self.popup.clone(), self.search_base.clone());
        tokio::spawn(script.run(rx));
        entry.renderer = Some(tx);

        tracing::info!("[TABS] Renderer injected into {}", tab);
        Ok(())
    }
}

#[async_trait]
impl SelectionSource for TabHub {
    async fn selected_text(&self, tab: TabId) -> Result<Option<String>, DeliveryError> {
        let page = self.page(tab).ok_or(DeliveryError::UnknownTab(tab))?;
        Ok(page.selection().map(|s| s.text))
    }
}
