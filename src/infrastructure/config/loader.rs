use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::AppConfig;

/// Directory holding the launcher's project-local configuration.
pub const CONFIG_DIR: &str = ".codex-launcher";

/// Prefix of environment overrides; nested keys are split on `__`.
pub const ENV_PREFIX: &str = "CODEX_LAUNCHER_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid grace period: {0}. Must be a positive number of seconds")]
    InvalidGracePeriod(f64),

    #[error("Invalid {name}: {value}. Must be a positive number of seconds")]
    InvalidTimeout { name: &'static str, value: f64 },

    #[error("Discovery executable name cannot be empty")]
    EmptyExecutableName,

    #[error("Discovery probe flag cannot be empty")]
    EmptyProbeFlag,

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for the current directory
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .codex-launcher/config.yaml
    /// 3. .codex-launcher/local.yaml (optional overrides)
    /// 4. Environment variables (CODEX_LAUNCHER_* prefix)
    pub fn load() -> Result<AppConfig> {
        Self::load_from_dir(Path::new("."))
    }

    /// Same layering as [`ConfigLoader::load`], rooted at `root`.
    pub fn load_from_dir(root: &Path) -> Result<AppConfig> {
        let config_dir = root.join(CONFIG_DIR);
        let config: AppConfig = Figment::new()
            .merge(Serialized::defaults(AppConfig::default()))
            .merge(Yaml::file(config_dir.join("config.yaml")))
            .merge(Yaml::file(config_dir.join("local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring env overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<AppConfig> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let config: AppConfig = Figment::new()
            .merge(Serialized::defaults(AppConfig::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let grace = config.session.grace_period_secs;
        if !(grace.is_finite() && grace > 0.0) {
            return Err(ConfigError::InvalidGracePeriod(grace));
        }

        if let Some(login) = config.session.login_timeout_secs {
            if !(login.is_finite() && login > 0.0) {
                return Err(ConfigError::InvalidTimeout {
                    name: "login_timeout_secs",
                    value: login,
                });
            }
        }

        let discovery = &config.discovery;
        if !(discovery.probe_timeout_secs.is_finite() && discovery.probe_timeout_secs > 0.0) {
            return Err(ConfigError::InvalidTimeout {
                name: "probe_timeout_secs",
                value: discovery.probe_timeout_secs,
            });
        }

        if discovery.executable_name.trim().is_empty() {
            return Err(ConfigError::EmptyExecutableName);
        }

        if discovery.probe_flag.trim().is_empty() {
            return Err(ConfigError::EmptyProbeFlag);
        }

        if discovery.package_runner.iter().any(|t| t.trim().is_empty()) {
            return Err(ConfigError::ValidationFailed(
                "package_runner tokens cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
