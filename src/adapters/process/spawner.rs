//! Tokio-backed process spawner.

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;

use tokio::process::{Child, Command};
use tracing::debug;

use crate::domain::models::CommandVector;
use crate::domain::ports::ProcessSpawner;

/// Spawns the Codex CLI with piped stdout/stderr.
///
/// Children are killed if their handle is dropped, so an abandoned session
/// can never outlive the launcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessSpawner;

impl TokioProcessSpawner {
    pub const fn new() -> Self {
        Self
    }
}

impl ProcessSpawner for TokioProcessSpawner {
    fn spawn(&self, command: &CommandVector, cwd: Option<&Path>) -> std::io::Result<Child> {
        let program = command.program().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "command line is empty")
        })?;

        let mut cmd = Command::new(resolve_program(program));
        cmd.args(command.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        debug!(program = %program, cwd = ?cwd, "spawning process");
        cmd.spawn()
    }
}

/// Unix resolves `PATH` and shebang scripts natively.
#[cfg(unix)]
pub fn resolve_program(program: &str) -> OsString {
    OsString::from(program)
}

/// Windows cannot run `.cmd` shims without their extension, so resolve the
/// full path through `PATHEXT` first.
#[cfg(windows)]
pub fn resolve_program(program: &str) -> OsString {
    match which::which(program) {
        Ok(resolved) => {
            debug!(program = %program, resolved = ?resolved, "resolved program");
            resolved.into_os_string()
        }
        Err(_) => OsString::from(program),
    }
}
