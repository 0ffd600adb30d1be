use serde::{Deserialize, Serialize};

fn default_max_selection_chars() -> usize {
    50
}

fn default_max_definitions() -> usize {
    3
}

fn default_margin() -> f64 {
    10.0
}

fn default_edge_inset() -> f64 {
    10.0
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PopupConfig {
    /// Selections are cut to this many characters before sanitizing
    #[serde(default = "default_max_selection_chars")]
    pub max_selection_chars: usize,
    /// Definitions shown per meaning block
    #[serde(default = "default_max_definitions")]
    pub max_definitions: usize,
    /// Gap between the selection and the popup
    #[serde(default = "default_margin")]
    pub margin: f64,
    /// Minimum distance kept from the viewport edges
    #[serde(default = "default_edge_inset")]
    pub edge_inset: f64,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            max_selection_chars: default_max_selection_chars(),
            max_definitions: default_max_definitions(),
            margin: default_margin(),
            edge_inset: default_edge_inset(),
        }
    }
}
