//! Process spawner port - how the controller creates OS processes.

use std::path::Path;

use tokio::process::Child;

use crate::domain::models::CommandVector;

/// Creates the external process for a command vector.
///
/// The returned child must have piped stdout and stderr. Implementations are
/// swapped in tests to observe (or forbid) process creation.
pub trait ProcessSpawner: Send + Sync {
    fn spawn(&self, command: &CommandVector, cwd: Option<&Path>) -> std::io::Result<Child>;
}
