//! Liveness probe for candidate executables.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::spawner::resolve_program;
use crate::domain::ports::ExecutableProbe;

/// Runs a candidate command with all stdio discarded and reports whether it
/// exited successfully within the timeout.
#[derive(Debug, Clone, Copy)]
pub struct CommandProbe {
    timeout: Duration,
}

impl CommandProbe {
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl ExecutableProbe for CommandProbe {
    async fn probe(&self, argv: &[String]) -> bool {
        let Some((program, args)) = argv.split_first() else {
            return false;
        };

        let mut child = match Command::new(resolve_program(program))
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                debug!(program = %program, error = %e, "probe could not launch candidate");
                return false;
            }
        };

        match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(Ok(status)) => {
                debug!(program = %program, ?status, "probe finished");
                status.success()
            }
            Ok(Err(e)) => {
                debug!(program = %program, error = %e, "probe wait failed");
                false
            }
            Err(_) => {
                debug!(program = %program, timeout = ?self.timeout, "probe timed out");
                if let Err(e) = child.kill().await {
                    debug!(program = %program, error = %e, "could not kill timed out probe");
                }
                false
            }
        }
    }
}
