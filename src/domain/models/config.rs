use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for the launcher
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Locations of collaborator-owned files
    #[serde(default)]
    pub paths: PathsConfig,

    /// Session supervision settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Executable discovery settings
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for the console sink
    #[serde(default)]
    pub format: LogFormat,

    /// Directory for rolling JSON log files (console only when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Enable console logging (always written to stderr)
    #[serde(default = "default_true")]
    pub enable_console: bool,

    /// Log file rotation policy
    #[serde(default)]
    pub rotation: RotationPolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    Never,
}

fn default_log_level() -> String {
    "warn".to_string()
}

const fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            log_dir: None,
            enable_console: true,
            rotation: RotationPolicy::default(),
        }
    }
}

/// Paths of the files owned by the settings and agent collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PathsConfig {
    /// Runtime settings JSON file
    #[serde(default = "default_settings_file")]
    pub settings_file: PathBuf,

    /// Directory holding one JSON file per agent
    #[serde(default = "default_agents_dir")]
    pub agents_dir: PathBuf,
}

fn default_settings_file() -> PathBuf {
    PathBuf::from(".codex-launcher/settings.json")
}

fn default_agents_dir() -> PathBuf {
    PathBuf::from(".codex-launcher/agents")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            settings_file: default_settings_file(),
            agents_dir: default_agents_dir(),
        }
    }
}

/// Session supervision configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SessionConfig {
    /// Seconds to wait after SIGTERM before killing the process
    #[serde(default = "default_grace_period_secs")]
    pub grace_period_secs: f64,

    /// Timeout for `login`; unlimited when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_timeout_secs: Option<f64>,
}

const fn default_grace_period_secs() -> f64 {
    5.0
}

impl SessionConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_secs_f64(self.grace_period_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            grace_period_secs: default_grace_period_secs(),
            login_timeout_secs: None,
        }
    }
}

/// Executable discovery configuration
///
/// Installation layouts differ per machine, so every location the discovery
/// walk consults can be overridden here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DiscoveryConfig {
    /// Canonical tool name looked up on `PATH`
    #[serde(default = "default_executable_name")]
    pub executable_name: String,

    /// Harmless flag used to probe candidates
    #[serde(default = "default_probe_flag")]
    pub probe_flag: String,

    /// Seconds a single probe may take before the candidate is rejected
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: f64,

    /// Consult `PATH` for the canonical name
    #[serde(default = "default_true")]
    pub system_lookup: bool,

    /// Installation directories to search; platform defaults when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_dirs: Option<Vec<PathBuf>>,

    /// Last-resort package-runner invocation; empty disables it
    #[serde(default = "default_package_runner")]
    pub package_runner: Vec<String>,
}

fn default_executable_name() -> String {
    "codex".to_string()
}

fn default_probe_flag() -> String {
    "--help".to_string()
}

const fn default_probe_timeout_secs() -> f64 {
    10.0
}

fn default_package_runner() -> Vec<String> {
    vec!["npx".to_string(), "codex".to_string()]
}

impl DiscoveryConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.probe_timeout_secs)
    }

    /// File name of the executable inside an installation directory.
    pub fn executable_file_name(&self) -> String {
        if cfg!(windows) {
            format!("{}.cmd", self.executable_name)
        } else {
            self.executable_name.clone()
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            executable_name: default_executable_name(),
            probe_flag: default_probe_flag(),
            probe_timeout_secs: default_probe_timeout_secs(),
            system_lookup: true,
            search_dirs: None,
            package_runner: default_package_runner(),
        }
    }
}
