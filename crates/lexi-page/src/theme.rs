use serde::Serialize;

use crate::page::{Element, Page};

/// Brightness assumed when the page color can't be read
pub const DEFAULT_BRIGHTNESS: f64 = 255.0;

const DARK_CLASSES: [&str; 3] = ["dark", "dark-mode", "dark-theme"];

// Computed styles some popular dark themes report
const NEAR_BLACK: [&str; 6] = [
    "rgb(0,0,0)",
    "rgb(17,17,17)",
    "rgb(18,18,18)",
    "rgb(24,24,24)",
    "rgb(30,30,30)",
    "rgb(32,33,36)",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Colors the popup is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeColors {
    pub background: &'static str,
    pub text: &'static str,
    pub border: &'static str,
    pub shadow: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Band {
    Light,
    Medium,
    Dark,
}

impl Band {
    pub fn palette(self) -> ThemeColors {
        match self {
            Band::Light => ThemeColors {
                background: "#ffffff",
                text: "#1f2328",
                border: "#d0d7de",
                shadow: "0 8px 24px rgba(0, 0, 0, 0.15)",
            },
            Band::Medium => ThemeColors {
                background: "#f6f8fa",
                text: "#1f2328",
                border: "#8c959f",
                shadow: "0 8px 24px rgba(0, 0, 0, 0.25)",
            },
            Band::Dark => ThemeColors {
                background: "#1e1e1e",
                text: "#e6edf3",
                border: "#3d444d",
                shadow: "0 8px 24px rgba(0, 0, 0, 0.6)",
            },
        }
    }
}

/// Luma of an sRGB triple, 0..=255
pub fn brightness(r: u8, g: u8, b: u8) -> f64 {
    0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)
}

/// Parse `rgb()`, `rgba()` and `#rgb`/`#rrggbb`. Returns the color and its alpha.
pub fn parse_color(css: &str) -> Option<(Rgb, f64)> {
    let css = css.trim().to_ascii_lowercase();

    if css == "transparent" {
        return Some((Rgb { r: 0, g: 0, b: 0 }, 0.0));
    }

    if let Some(hex) = css.strip_prefix('#') {
        if !hex.is_ascii() {
            return None;
        }
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return None,
        };
        let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
        return Some((
            Rgb {
                r: channel(0)?,
                g: channel(2)?,
                b: channel(4)?,
            },
            1.0,
        ));
    }

    let args = css
        .strip_prefix("rgba(")
        .or_else(|| css.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    let parts: Vec<&str> = args
        .split([',', ' ', '/'])
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() < 3 {
        return None;
    }

    let channel = |s: &str| s.parse::<f64>().ok().map(|v| v.clamp(0.0, 255.0).round() as u8);
    let alpha = match parts.get(3) {
        Some(a) => a.parse::<f64>().ok()?,
        None => 1.0,
    };

    Some((
        Rgb {
            r: channel(parts[0])?,
            g: channel(parts[1])?,
            b: channel(parts[2])?,
        },
        alpha,
    ))
}

/// Brightness of a CSS color, or [`DEFAULT_BRIGHTNESS`] when it isn't RGB
pub fn color_brightness(css: &str) -> f64 {
    match parse_color(css) {
        Some((rgb, _)) => brightness(rgb.r, rgb.g, rgb.b),
        None => DEFAULT_BRIGHTNESS,
    }
}

fn is_transparent(css: &str) -> bool {
    matches!(parse_color(css), Some((_, alpha)) if alpha == 0.0)
}

fn is_near_black(css: &str) -> bool {
    let compact: String = css
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    NEAR_BLACK.contains(&compact.as_str())
}

/// Tone of the page behind the popup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageTone {
    pub brightness: f64,
    pub dark: bool,
}

impl PageTone {
    pub fn measure<P: Page + ?Sized>(page: &P) -> Self {
        let body = page.background_color(Element::Body);
        // A transparent body shows the root element's background
        let background = if is_transparent(&body) {
            let root = page.background_color(Element::Root);
            if is_transparent(&root) { None } else { Some(root) }
        } else {
            Some(body)
        };

        let brightness = background
            .as_deref()
            .map(color_brightness)
            .unwrap_or(DEFAULT_BRIGHTNESS);

        let marked_dark = [Element::Body, Element::Root]
            .into_iter()
            .any(|el| DARK_CLASSES.iter().any(|class| page.has_class(el, class)));
        let near_black = background.as_deref().is_some_and(is_near_black);

        Self {
            brightness,
            dark: brightness < 128.0 || marked_dark || near_black,
        }
    }

    pub fn band(&self) -> Band {
        if self.dark {
            Band::Dark
        } else if self.brightness > 200.0 {
            Band::Light
        } else {
            Band::Medium
        }
    }

    pub fn colors(&self) -> ThemeColors {
        self.band().palette()
    }
}
