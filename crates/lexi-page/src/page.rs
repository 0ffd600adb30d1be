use lexi_types::{Selection, Size, Viewport};
use serde::Serialize;

use crate::theme::ThemeColors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ListenerId(pub u64);

/// Page-level listeners a live popup holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ListenerKind {
    KeyDown,
    Click,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Element {
    Body,
    Root,
}

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("node {0:?} is not attached to the page")]
    UnknownNode(NodeId),

    #[error("page has been unloaded")]
    Unloaded,
}

/// What the renderer needs from the host document.
///
/// Coordinates returned by [`Page::selection`] are viewport-relative; coordinates
/// passed to [`Page::place`] and [`Page::hit_test`] are page-relative.
pub trait Page: Send {
    /// Current non-collapsed selection, if any
    fn selection(&self) -> Option<Selection>;

    fn viewport(&self) -> Viewport;

    /// Computed `background-color` of an element, as the browser reports it
    fn background_color(&self, element: Element) -> String;

    fn has_class(&self, element: Element, class: &str) -> bool;

    /// Attach a popup node, laid out but invisible
    fn mount(&mut self, html: &str, theme: &ThemeColors) -> Result<NodeId, PageError>;

    /// Rendered size of an attached node
    fn measure(&self, node: NodeId) -> Result<Size, PageError>;

    /// Move a node to page coordinates and make it visible
    fn place(&mut self, node: NodeId, top: f64, left: f64) -> Result<(), PageError>;

    /// Detach a node. Detaching an unknown node does nothing.
    fn remove(&mut self, node: NodeId);

    /// Topmost popup node under a page-coordinate point
    fn hit_test(&self, x: f64, y: f64) -> Option<NodeId>;

    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId;

    fn remove_listener(&mut self, id: ListenerId);
}
