pub mod content;
pub mod headless;
pub mod page;
pub mod placement;
pub mod popup;
pub mod render;
pub mod theme;

pub use content::{ContentScript, PageEvent};
pub use headless::HeadlessPage;
pub use page::{ListenerId, ListenerKind, NodeId, Page, PageError};
pub use popup::{PopupKind, PopupManager};
pub use theme::ThemeColors;
