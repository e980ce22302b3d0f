//! Port trait definitions (Hexagonal Architecture)
//!
//! Interfaces that adapters implement:
//! - ProcessSpawner: creating the external Codex process
//! - ExecutableProbe: checking discovery candidates
//! - SettingsStore: persisting runtime settings

pub mod executable_probe;
pub mod process_spawner;
pub mod settings_store;

pub use executable_probe::ExecutableProbe;
pub use process_spawner::ProcessSpawner;
pub use settings_store::SettingsStore;
