//! Domain models for supervised Codex CLI sessions.
//!
//! A session is one supervised lifetime of a single external process. The
//! controller owns at most one at a time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle phase reported by the session controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No process handle held
    Idle,
    /// Process spawned, output not yet handed to the caller
    Starting,
    /// Output lines are being produced
    Streaming,
    /// Standard output closed; draining stderr and waiting for exit
    Finalizing,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Starting => write!(f, "starting"),
            Self::Streaming => write!(f, "streaming"),
            Self::Finalizing => write!(f, "finalizing"),
        }
    }
}

/// How a session that did not fail came to an end.
///
/// Failures are reported as `CodexError::CliExit`; a user-requested stop is
/// never a failure and surfaces here as `Cancelled` whatever the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum SessionOutcome {
    Completed { exit_code: i32 },
    Cancelled { exit_code: i32 },
}

impl SessionOutcome {
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Completed { exit_code } | Self::Cancelled { exit_code } => *exit_code,
        }
    }

    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Auxiliary commands that run to completion without streaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OneShotCommand {
    Login,
    RedeemCredits,
}

impl OneShotCommand {
    /// Flag appended to the base command line.
    pub const fn flag(self) -> &'static str {
        match self {
            Self::Login => "--login",
            Self::RedeemCredits => "--free",
        }
    }
}

impl fmt::Display for OneShotCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login => write!(f, "login"),
            Self::RedeemCredits => write!(f, "redeem credits"),
        }
    }
}
