pub mod agent;
pub mod command;
pub mod config;
pub mod flags;
pub mod session;
pub mod settings;

pub use agent::AgentConfig;
pub use command::{CommandExtras, CommandVector, SessionRequest};
pub use config::{
    AppConfig, DiscoveryConfig, LogFormat, LoggingConfig, PathsConfig, RotationPolicy,
    SessionConfig,
};
pub use flags::{FlagSet, FlagValue, PATH_LIST_SEPARATOR};
pub use session::{OneShotCommand, SessionOutcome, SessionState};
pub use settings::{RuntimeSettings, DEFAULT_CLI, DEFAULT_REDEEM_TIMEOUT_SECS};
