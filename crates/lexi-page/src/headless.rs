use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lexi_types::{Rect, Selection, Size, Viewport};
use serde::Serialize;
use tokio::sync::watch;

use crate::page::{Element, ListenerId, ListenerKind, NodeId, Page, PageError};
use crate::theme::ThemeColors;

const CHAR_WIDTH: f64 = 7.0;
const LINE_HEIGHT: f64 = 18.0;
const PADDING: f64 = 32.0;
const MIN_WIDTH: f64 = 160.0;
const MAX_WIDTH: f64 = 360.0;

/// A popup node as the headless page holds it
#[derive(Debug, Clone, Serialize)]
pub struct MountedNode {
    pub id: NodeId,
    pub html: String,
    pub theme: ThemeColors,
    /// Page coordinates; origin until placed
    pub rect: Rect,
    pub visible: bool,
}

#[derive(Debug)]
struct HeadlessDom {
    viewport: Viewport,
    selection: Option<Selection>,
    body_background: String,
    root_background: String,
    body_classes: Vec<String>,
    root_classes: Vec<String>,
    popup_size: Option<Size>,
    nodes: BTreeMap<NodeId, MountedNode>,
    listeners: BTreeMap<ListenerId, ListenerKind>,
    next_id: u64,
}

/// In-memory document used by the CLI and tests.
///
/// Clones share one document, so a test can keep a handle while the renderer
/// task owns another.
#[derive(Clone)]
pub struct HeadlessPage {
    dom: Arc<Mutex<HeadlessDom>>,
    revision: Arc<watch::Sender<u64>>,
}

impl Default for HeadlessPage {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessPage {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            dom: Arc::new(Mutex::new(HeadlessDom {
                viewport: Viewport::default(),
                selection: None,
                body_background: "rgba(0, 0, 0, 0)".to_string(),
                root_background: "rgb(255, 255, 255)".to_string(),
                body_classes: Vec::new(),
                root_classes: Vec::new(),
                popup_size: None,
                nodes: BTreeMap::new(),
                listeners: BTreeMap::new(),
                next_id: 1,
            })),
            revision: Arc::new(revision),
        }
    }

    pub fn with_viewport(self, viewport: Viewport) -> Self {
        self.dom().viewport = viewport;
        self
    }

    pub fn with_selection(self, text: &str, bounds: Rect) -> Self {
        self.set_selection(Some(Selection {
            text: text.to_string(),
            bounds,
        }));
        self
    }

    pub fn with_background(self, css: &str) -> Self {
        self.dom().body_background = css.to_string();
        self
    }

    pub fn with_root_background(self, css: &str) -> Self {
        self.dom().root_background = css.to_string();
        self
    }

    pub fn with_class(self, element: Element, class: &str) -> Self {
        {
            let mut dom = self.dom();
            match element {
                Element::Body => dom.body_classes.push(class.to_string()),
                Element::Root => dom.root_classes.push(class.to_string()),
            }
        }
        self
    }

    /// Report this size for every popup instead of estimating from text
    pub fn with_popup_size(self, size: Size) -> Self {
        self.dom().popup_size = Some(size);
        self
    }

    pub fn set_selection(&self, selection: Option<Selection>) {
        self.dom().selection = selection;
    }

    /// Popup nodes currently attached, in mount order
    pub fn popups(&self) -> Vec<MountedNode> {
        self.dom().nodes.values().cloned().collect()
    }

    pub fn listener_count(&self) -> usize {
        self.dom().listeners.len()
    }

    /// Resolve once `done` holds for the attached popups
    pub async fn wait_for<F>(&self, mut done: F)
    where
        F: FnMut(&[MountedNode]) -> bool,
    {
        let mut changes = self.revision.subscribe();
        loop {
            if done(&self.popups()) {
                return;
            }
            if changes.changed().await.is_err() {
                return;
            }
        }
    }

    fn dom(&self) -> MutexGuard<'_, HeadlessDom> {
        self.dom.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn bump(&self) {
        self.revision.send_modify(|r| *r += 1);
    }
}

/// Rough layout: fixed-width glyphs wrapped inside a bounded box
fn estimate_size(html: &str) -> Size {
    let mut in_tag = false;
    let text_len = html
        .chars()
        .filter(|&c| match c {
            '<' => {
                in_tag = true;
                false
            }
            '>' => {
                in_tag = false;
                false
            }
            _ => !in_tag,
        })
        .count() as f64;

    let width = (text_len * CHAR_WIDTH + PADDING).clamp(MIN_WIDTH, MAX_WIDTH);
    let per_line = ((width - PADDING) / CHAR_WIDTH).max(1.0);
    let lines = (text_len / per_line).ceil().max(1.0);

    Size {
        width,
        height: lines * LINE_HEIGHT + PADDING,
    }
}

impl Page for HeadlessPage {
    fn selection(&self) -> Option<Selection> {
        self.dom().selection.clone()
    }

    fn viewport(&self) -> Viewport {
        self.dom().viewport
    }

    fn background_color(&self, element: Element) -> String {
        let dom = self.dom();
        match element {
            Element::Body => dom.body_background.clone(),
            Element::Root => dom.root_background.clone(),
        }
    }

    fn has_class(&self, element: Element, class: &str) -> bool {
        let dom = self.dom();
        let classes = match element {
            Element::Body => &dom.body_classes,
            Element::Root => &dom.root_classes,
        };
        classes.iter().any(|c| c == class)
    }

    fn mount(&mut self, html: &str, theme: &ThemeColors) -> Result<NodeId, PageError> {
        let id = {
            let mut dom = self.dom();
            let id = NodeId(dom.next_id);
            dom.next_id += 1;

            let size = dom.popup_size.unwrap_or_else(|| estimate_size(html));
            dom.nodes.insert(
                id,
                MountedNode {
                    id,
                    html: html.to_string(),
                    theme: *theme,
                    rect: Rect::new(0.0, 0.0, size.width, size.height),
                    visible: false,
                },
            );
            id
        };
        self.bump();
        Ok(id)
    }

    fn measure(&self, node: NodeId) -> Result<Size, PageError> {
        let dom = self.dom();
        let node = dom.nodes.get(&node).ok_or(PageError::UnknownNode(node))?;
        Ok(Size {
            width: node.rect.width,
            height: node.rect.height,
        })
    }

    fn place(&mut self, node: NodeId, top: f64, left: f64) -> Result<(), PageError> {
        {
            let mut dom = self.dom();
            let node = dom.nodes.get_mut(&node).ok_or(PageError::UnknownNode(node))?;
            node.rect.y = top;
            node.rect.x = left;
            node.visible = true;
        }
        self.bump();
        Ok(())
    }

    fn remove(&mut self, node: NodeId) {
        let removed = self.dom().nodes.remove(&node).is_some();
        if removed {
            self.bump();
        }
    }

    fn hit_test(&self, x: f64, y: f64) -> Option<NodeId> {
        self.dom()
            .nodes
            .values()
            .rev()
            .find(|n| n.visible && n.rect.contains(x, y))
            .map(|n| n.id)
    }

    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId {
        let mut dom = self.dom();
        let id = ListenerId(dom.next_id);
        dom.next_id += 1;
        dom.listeners.insert(id, kind);
        id
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.dom().listeners.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Band;

    #[test]
    fn mount_measure_place_remove() {
        let mut page = HeadlessPage::new().with_popup_size(Size {
            width: 200.0,
            height: 80.0,
        });
        let node = page.mount("<div>hi</div>", &Band::Light.palette()).unwrap();
        assert!(!page.popups()[0].visible);
        assert_eq!(page.measure(node).unwrap().height, 80.0);

        page.place(node, 100.0, 50.0).unwrap();
        assert_eq!(page.hit_test(60.0, 120.0), Some(node));
        assert_eq!(page.hit_test(10.0, 10.0), None);

        page.remove(node);
        page.remove(node);
        assert!(page.popups().is_empty());
        assert!(matches!(page.measure(node), Err(PageError::UnknownNode(_))));
    }

    #[test]
    fn estimate_grows_with_text() {
        let short = estimate_size("<b>hi</b>");
        let long = estimate_size(&"word ".repeat(100));
        assert_eq!(short.width, MIN_WIDTH);
        assert_eq!(long.width, MAX_WIDTH);
        assert!(long.height > short.height);
    }

    #[test]
    fn clones_share_the_document() {
        let page = HeadlessPage::new();
        let mut other = page.clone();
        other.add_listener(ListenerKind::Click);
        assert_eq!(page.listener_count(), 1);
    }
}
