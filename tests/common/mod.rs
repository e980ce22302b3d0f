//! Common test utilities for integration tests
//!
//! Provides shared fixtures and helpers used across multiple integration
//! test files. Process fixtures are `sh` scripts passed through `cli_path`.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use codex_launcher::adapters::process::TokioProcessSpawner;
use codex_launcher::domain::models::{AgentConfig, CommandVector, RuntimeSettings, SessionRequest};
use codex_launcher::domain::ports::ProcessSpawner;
use codex_launcher::SessionController;
use tempfile::TempDir;
use tokio::process::Child;

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Setup test logging
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Wait for a condition to be true with timeout
///
/// Polls the predicate every 50ms until it returns true or timeout is reached.
pub async fn wait_for<F>(mut predicate: F, timeout_ms: u64) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(timeout_ms);

    while start.elapsed() < timeout {
        if predicate() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    false
}

/// Settings whose `cli_path` runs `script` under `sh`; the prompt becomes `$1`.
pub fn sh_settings(script: &str) -> RuntimeSettings {
    let quoted = shlex::try_quote(script).expect("script contains no NUL bytes");
    RuntimeSettings::default().with_cli_path(format!("sh -c {quoted} codex"))
}

/// Streaming request that runs `script` under `sh`.
pub fn sh_request(script: &str) -> SessionRequest {
    SessionRequest::new("prompt", AgentConfig::default(), sh_settings(script))
}

/// A raw `sh -c script` command vector.
pub fn sh_command(script: &str) -> CommandVector {
    CommandVector::new(vec!["sh".to_string(), "-c".to_string(), script.to_string()])
}

/// Controller with a custom grace period so escalation tests stay fast.
pub fn controller_with_grace(grace: Duration) -> SessionController {
    SessionController::new(Arc::new(TokioProcessSpawner::new()), grace)
}

/// Spawner that counts calls and delegates to the real one.
#[derive(Default)]
pub struct CountingSpawner {
    calls: AtomicUsize,
    inner: TokioProcessSpawner,
}

impl CountingSpawner {
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProcessSpawner for CountingSpawner {
    fn spawn(&self, command: &CommandVector, cwd: Option<&Path>) -> std::io::Result<Child> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.spawn(command, cwd)
    }
}

/// Whether a process with this pid still exists.
#[cfg(unix)]
pub fn process_alive(pid: i32) -> bool {
    nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid), None).is_ok()
}

/// Read a pid written by a fixture script, waiting for the file to appear.
pub async fn read_pid(path: &Path) -> i32 {
    assert!(
        wait_for(
            || std::fs::read_to_string(path).is_ok_and(|s| s.trim().parse::<i32>().is_ok()),
            5_000
        )
        .await,
        "fixture never wrote its pid"
    );
    std::fs::read_to_string(path).unwrap().trim().parse().unwrap()
}
