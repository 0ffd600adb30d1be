use std::env;

use serde::{Deserialize, Serialize};

use self::dictionary::DictionaryConfig;
use self::popup::PopupConfig;
use self::router::RouterConfig;

pub mod dictionary;
pub mod popup;
pub mod router;
pub mod settings;

pub use settings::{Settings, SettingsError, SettingsStore};

fn default_fallback_search_url() -> String {
    "https://www.google.com/search".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dictionary: DictionaryConfig,
    pub router: RouterConfig,
    pub popup: PopupConfig,

    /// Search page the error popup links to, queried with `?q=`
    #[serde(default = "default_fallback_search_url")]
    pub fallback_search_url: String,
    /// Overrides the default settings file location
    pub settings_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dictionary: DictionaryConfig::default(),
            router: RouterConfig::default(),
            popup: PopupConfig::default(),
            fallback_search_url: default_fallback_search_url(),
            settings_path: None,
        }
    }
}

impl Config {
    /// Defaults with environment overrides applied
    pub fn new() -> Self {
        let settings_path = env::var("LEXI_SETTINGS_PATH").ok();

        Config {
            dictionary: DictionaryConfig::new(),
            router: RouterConfig::new(),
            popup: PopupConfig::default(),
            fallback_search_url: default_fallback_search_url(),
            settings_path,
        }
    }
}

/// Parse an env var, ignoring values that don't parse
pub(crate) fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
