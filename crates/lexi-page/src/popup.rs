use lexi_config::popup::PopupConfig;
use lexi_types::{LookupId, LookupResult, MessageResponse, PageMessage, Rect, Selection};
use serde::Serialize;

use crate::page::{ListenerId, ListenerKind, NodeId, Page, PageError};
use crate::placement::{self, Placement, Spacing};
use crate::render::PopupContent;
use crate::theme::{PageTone, ThemeColors};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PopupKind {
    Loading,
    Definition,
    Error,
}

/// The one live popup and the page resources it holds
#[derive(Debug)]
struct Popup {
    kind: PopupKind,
    node: NodeId,
    listeners: [ListenerId; 2],
    theme: ThemeColors,
    placement: Placement,
}

/// Owns the page's popup; at most one exists at any time.
///
/// Every message replaces the current popup, and every way of closing it goes
/// through [`PopupManager::teardown`].
pub struct PopupManager<P: Page> {
    page: P,
    config: PopupConfig,
    search_base: String,
    popup: Option<Popup>,
    /// Selection captured by the last `showLoading`; positions later popups
    anchor: Option<Selection>,
    latest_lookup: Option<LookupId>,
    last_query: Option<String>,
}

impl<P: Page> PopupManager<P> {
    pub fn new(page: P, config: PopupConfig, search_base: impl Into<String>) -> Self {
        Self {
            page,
            config,
            search_base: search_base.into(),
            popup: None,
            anchor: None,
            latest_lookup: None,
            last_query: None,
        }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn kind(&self) -> Option<PopupKind> {
        self.popup.as_ref().map(|p| p.kind)
    }

    pub fn placement(&self) -> Option<Placement> {
        self.popup.as_ref().map(|p| p.placement)
    }

    pub fn theme(&self) -> Option<ThemeColors> {
        self.popup.as_ref().map(|p| p.theme)
    }

    pub fn handle_message(&mut self, message: PageMessage) -> MessageResponse {
        tracing::debug!("[POPUP] {} received", message.action());

        let result = match message {
            PageMessage::ShowLoading {
                selected_text,
                lookup_id,
            } => self.show_loading(selected_text, lookup_id),
            PageMessage::ShowDefinition {
                selected_text,
                definition,
                lookup_id,
            } => {
                if self.is_stale(lookup_id) {
                    return MessageResponse::ok();
                }
                match definition {
                    LookupResult::Success(entry) => {
                        let content = PopupContent::definition(&entry, self.config.max_definitions);
                        self.show(PopupKind::Definition, &content)
                    }
                    LookupResult::Failure { reason } => self.show_error(&selected_text, &reason),
                }
            }
            PageMessage::ShowError {
                error,
                selected_text,
                lookup_id,
            } => {
                if self.is_stale(lookup_id) {
                    return MessageResponse::ok();
                }
                let query = selected_text
                    .or_else(|| self.last_query.clone())
                    .unwrap_or_default();
                self.show_error(&query, &error)
            }
        };

        match result {
            Ok(()) => MessageResponse::ok(),
            Err(e) => {
                tracing::error!("[POPUP] Failed to render popup: {}", e);
                MessageResponse::err(e.to_string())
            }
        }
    }

    /// Escape closes a visible popup
    pub fn handle_key(&mut self, key: &str) {
        if self.popup.is_some() && key == "Escape" {
            self.close();
        }
    }

    /// A click outside the popup closes it
    pub fn handle_click(&mut self, x: f64, y: f64) {
        let Some(node) = self.popup.as_ref().map(|p| p.node) else {
            return;
        };
        if self.page.hit_test(x, y) != Some(node) {
            self.close();
        }
    }

    /// Dismiss by user action or unload; drops the captured selection too
    pub fn close(&mut self) {
        self.teardown();
        self.anchor = None;
    }

    /// Release the popup's listeners and node. Calling it with no popup does nothing.
    pub fn teardown(&mut self) {
        let Some(popup) = self.popup.take() else {
            return;
        };

        for listener in popup.listeners {
            self.page.remove_listener(listener);
        }
        self.page.remove(popup.node);
        tracing::debug!("[POPUP] {:?} popup removed", popup.kind);
    }

    fn is_stale(&self, lookup_id: Option<LookupId>) -> bool {
        match (lookup_id, self.latest_lookup) {
            (Some(id), Some(latest)) if id != latest => {
                tracing::debug!("[POPUP] Ignoring result of superseded lookup {}", id);
                true
            }
            _ => false,
        }
    }

    fn show_loading(&mut self, query: String, lookup_id: Option<LookupId>) -> Result<(), PageError> {
        self.teardown();

        let Some(selection) = self.page.selection() else {
            tracing::debug!("[POPUP] No live selection, skipping loading popup");
            return Ok(());
        };

        self.anchor = Some(selection);
        self.latest_lookup = lookup_id;
        let content = PopupContent::loading(&query);
        self.last_query = Some(query);
        self.show(PopupKind::Loading, &content)
    }

    fn show_error(&mut self, query: &str, reason: &str) -> Result<(), PageError> {
        let content = PopupContent::error(query, reason, &self.search_base);
        self.show(PopupKind::Error, &content)
    }

    /// Where popups attach: the captured selection, else the live one, else the
    /// top center of the viewport
    fn anchor_rect(&self) -> Rect {
        if let Some(anchor) = &self.anchor {
            return anchor.bounds;
        }
        if let Some(live) = self.page.selection() {
            return live.bounds;
        }
        let viewport = self.page.viewport();
        Rect::new(viewport.width / 2.0, 0.0, 0.0, 0.0)
    }

    fn show(&mut self, kind: PopupKind, content: &PopupContent) -> Result<(), PageError> {
        self.teardown();

        let theme = PageTone::measure(&self.page).colors();
        let node = self.page.mount(&content.to_html(), &theme)?;

        let placement = match self.position(node) {
            Ok(placement) => placement,
            Err(e) => {
                self.page.remove(node);
                return Err(e);
            }
        };

        let listeners = [
            self.page.add_listener(ListenerKind::KeyDown),
            self.page.add_listener(ListenerKind::Click),
        ];

        tracing::debug!(
            "[POPUP] {:?} popup at ({:.0}, {:.0}) {:?}",
            kind,
            placement.left,
            placement.top,
            placement.side
        );

        self.popup = Some(Popup {
            kind,
            node,
            listeners,
            theme,
            placement,
        });
        Ok(())
    }

    fn position(&mut self, node: NodeId) -> Result<Placement, PageError> {
        let size = self.page.measure(node)?;
        let spacing = Spacing {
            margin: self.config.margin,
            inset: self.config.edge_inset,
        };
        let placement = placement::place(self.anchor_rect(), size, self.page.viewport(), spacing);
        self.page.place(node, placement.top, placement.left)?;
        Ok(placement)
    }
}
