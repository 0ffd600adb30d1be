use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

/// User-toggled state that survives restarts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_enabled")]
    pub extension_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            extension_enabled: default_enabled(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("no config directory available on this platform")]
    NoConfigDir,

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// JSON file holding [`Settings`]
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/lexi/settings.json`, or `override_path` when given
    pub fn locate(override_path: Option<&str>) -> Result<Self, SettingsError> {
        if let Some(path) = override_path {
            return Ok(Self::new(path));
        }

        let dir = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
        Ok(Self::new(dir.join("lexi").join("settings.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings; a missing file means first run and yields the defaults
    pub fn load(&self) -> Result<Settings, SettingsError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No settings at {}, using defaults", self.path.display());
                return Ok(Settings::default());
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str(&data).map_err(|source| SettingsError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let io_err = |source: std::io::Error| SettingsError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let data = serde_json::to_string_pretty(settings).map_err(|source| {
            SettingsError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, data).map_err(io_err)?;

        tracing::info!("Saved settings to {}", self.path.display());
        Ok(())
    }

    pub fn is_enabled(&self) -> Result<bool, SettingsError> {
        Ok(self.load()?.extension_enabled)
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<(), SettingsError> {
        let mut settings = self.load()?;
        settings.extension_enabled = enabled;
        self.save(&settings)
    }
}
