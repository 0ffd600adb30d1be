use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::env_parse;

fn default_api_base() -> String {
    "https://api.dictionaryapi.dev/api/v2/entries/en".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DictionaryConfig {
    /// Entries endpoint; the looked-up text is appended as one path segment
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl DictionaryConfig {
    pub fn new() -> Self {
        Self {
            api_base: std::env::var("LEXI_API_BASE").unwrap_or_else(|_| default_api_base()),
            timeout_ms: env_parse("LEXI_FETCH_TIMEOUT_MS").unwrap_or_else(default_timeout_ms),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
