//! Domain errors for the Codex launcher.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building, launching, or supervising a Codex CLI process.
#[derive(Debug, Error)]
pub enum CodexError {
    /// A start was attempted while another session holds the process slot.
    #[error("A Codex session is already running")]
    AlreadyRunning,

    /// Discovery exhausted every candidate executable.
    #[error("Codex CLI is missing. {remediation}")]
    CliNotFound { remediation: String },

    /// The process exited non-zero without a user-requested stop.
    #[error("Codex CLI exited with code {exit_code}")]
    CliExit { exit_code: i32, stderr: String },

    /// A one-shot command outlived its allotted time and was killed.
    #[error("Codex CLI did not finish within {timeout_secs}s")]
    CliTimeout { timeout_secs: f64 },

    /// A non-positive (or non-finite) timeout was requested.
    #[error("Invalid timeout: {0}. Must be a positive number of seconds")]
    InvalidTimeout(f64),

    /// The OS refused to start the executable.
    #[error("Failed to launch '{program}': {source}")]
    LaunchFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The command vector had no program token.
    #[error("Command line is empty")]
    EmptyCommand,

    /// I/O failure while talking to a running process.
    #[error("Process I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl CodexError {
    /// Captured standard error of a failed process, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::CliExit { stderr, .. } => Some(stderr),
            _ => None,
        }
    }

    /// Whether the error was caused by the single-slot policy.
    pub const fn is_already_running(&self) -> bool {
        matches!(self, Self::AlreadyRunning)
    }
}

pub type CodexResult<T> = Result<T, CodexError>;

/// Errors raised by the settings/agent persistence collaborators.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
