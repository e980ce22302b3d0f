//! Executable probe port - checks whether a candidate command runs.

use async_trait::async_trait;

/// Runs a candidate argv with output discarded and reports success.
#[async_trait]
pub trait ExecutableProbe: Send + Sync {
    /// `true` when the command started and exited with status zero.
    async fn probe(&self, argv: &[String]) -> bool;
}
