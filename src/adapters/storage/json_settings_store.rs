//! JSON file implementation of [`SettingsStore`].

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::errors::StoreError;
use crate::domain::models::{FlagValue, RuntimeSettings};
use crate::domain::ports::SettingsStore;

/// Agent selected when no settings file exists yet.
pub const DEFAULT_AGENT: &str = "Python Expert";

/// Persists [`RuntimeSettings`] as pretty-printed JSON.
///
/// A missing file is not an error: [`JsonSettingsStore::defaults`] is
/// returned instead. Unknown keys are carried through load/save unchanged.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Settings used before the first save.
    pub fn defaults() -> RuntimeSettings {
        let mut settings = RuntimeSettings::default();
        settings.flags.temperature = Some(FlagValue::Float(0.5));
        settings.flags.max_tokens = Some(FlagValue::Int(1024));
        settings.selected_agent = Some(DEFAULT_AGENT.to_string());
        settings
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> Result<RuntimeSettings, StoreError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no settings file, using defaults");
            return Ok(Self::defaults());
        }

        let raw = std::fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;

        serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, settings: &RuntimeSettings) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, json).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;

        info!(path = %self.path.display(), "saved settings");
        Ok(())
    }
}
