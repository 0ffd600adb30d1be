use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::env_parse;

fn default_redelivery_grace_ms() -> u64 {
    100
}

fn default_channel_capacity() -> usize {
    32
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct RouterConfig {
    /// Wait between injecting a renderer and retrying the send
    #[serde(default = "default_redelivery_grace_ms")]
    pub redelivery_grace_ms: u64,
    /// Per-page message queue size
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            redelivery_grace_ms: default_redelivery_grace_ms(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl RouterConfig {
    pub fn new() -> Self {
        Self {
            redelivery_grace_ms: env_parse("LEXI_REDELIVERY_GRACE_MS")
                .unwrap_or_else(default_redelivery_grace_ms),
            channel_capacity: default_channel_capacity(),
        }
    }

    pub fn redelivery_grace(&self) -> Duration {
        Duration::from_millis(self.redelivery_grace_ms)
    }
}
