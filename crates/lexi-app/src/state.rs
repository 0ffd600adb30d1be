use std::sync::Arc;

use lexi_config::{Config, SettingsStore};
use tokio::sync::RwLock;

pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    pub settings: SettingsStore,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let settings = SettingsStore::locate(config.settings_path.as_deref())?;
        tracing::debug!("Settings file: {}", settings.path().display());

        Ok(Self::with_settings(config, settings))
    }

    pub fn with_settings(config: Config, settings: SettingsStore) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            settings,
        }
    }
}
