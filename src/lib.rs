//! Codex Launcher - agent-driven launcher for the Codex CLI
//!
//! Builds Codex command lines from a named agent and the user's runtime
//! settings, runs the CLI as a supervised child process, and streams its
//! output back line by line.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): flag values, agent/settings models, errors, ports
//! - **Service Layer** (`services`): command line resolution and CLI discovery
//! - **Application Layer** (`application`): the single-slot session controller
//! - **Adapters** (`adapters`): process spawning and signalling, JSON files
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use codex_launcher::{AgentConfig, RuntimeSettings, SessionController, SessionRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let controller = SessionController::default();
//!     let request = SessionRequest::new("fix the tests", AgentConfig::default(), RuntimeSettings::default());
//!     let mut stream = controller.start(&request)?;
//!     while let Some(line) = stream.next_line().await? {
//!         println!("{line}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::{
    spawn_one_shot, spawn_session, SessionController, SessionEvent, SessionStream, SessionWorker,
};
pub use domain::models::{
    AgentConfig, AppConfig, CommandExtras, CommandVector, FlagSet, FlagValue, OneShotCommand,
    RuntimeSettings, SessionOutcome, SessionRequest, SessionState,
};
pub use domain::{CodexError, CodexResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{build_command, CliDiscovery};
