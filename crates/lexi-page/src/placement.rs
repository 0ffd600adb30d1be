use lexi_types::{Rect, Size, Viewport};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    Above,
    Below,
}

/// Popup position in page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub top: f64,
    pub left: f64,
    pub side: Side,
}

#[derive(Debug, Clone, Copy)]
pub struct Spacing {
    /// Gap between selection and popup
    pub margin: f64,
    /// Minimum distance from the viewport edges
    pub inset: f64,
}

impl Default for Spacing {
    fn default() -> Self {
        Self {
            margin: 10.0,
            inset: 10.0,
        }
    }
}

/// Place a popup of `popup` size next to `anchor` (viewport coordinates).
///
/// Above wins when it fits, then below; otherwise the roomier side is used and
/// clamped inside the viewport.
pub fn place(anchor: Rect, popup: Size, viewport: Viewport, spacing: Spacing) -> Placement {
    let Spacing { margin, inset } = spacing;

    let space_above = anchor.top() - margin;
    let space_below = viewport.height - anchor.bottom() - margin;

    let (side, top) = if space_above >= popup.height {
        (Side::Above, anchor.top() - popup.height - margin)
    } else if space_below >= popup.height {
        (Side::Below, anchor.bottom() + margin)
    } else if space_above > space_below {
        (Side::Above, (anchor.top() - popup.height - margin).max(inset))
    } else {
        let lowest = viewport.height - popup.height - inset;
        (Side::Below, (anchor.bottom() + margin).min(lowest).max(inset))
    };

    let max_left = (viewport.width - popup.width - inset).max(inset);
    let left = (anchor.center_x() - popup.width / 2.0).clamp(inset, max_left);

    Placement {
        top: top + viewport.scroll_y,
        left: left + viewport.scroll_x,
        side,
    }
}
