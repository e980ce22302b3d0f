//! File-backed collaborators: runtime settings and agent definitions.

pub mod agent_catalog;
pub mod json_settings_store;

pub use agent_catalog::AgentCatalog;
pub use json_settings_store::JsonSettingsStore;
