//! Settings store port - persistence owned by the settings collaborator.

use crate::domain::errors::StoreError;
use crate::domain::models::RuntimeSettings;

/// Loads and saves runtime settings.
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Result<RuntimeSettings, StoreError>;

    fn save(&self, settings: &RuntimeSettings) -> Result<(), StoreError>;
}
