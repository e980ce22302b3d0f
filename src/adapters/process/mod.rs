//! Process adapters: spawning, probing, and signalling the Codex CLI.

pub mod probe;
pub mod shim;
pub mod signal;
pub mod spawner;

pub use probe::CommandProbe;
pub use shim::{path_in_env, write_npx_shim};
pub use spawner::TokioProcessSpawner;
