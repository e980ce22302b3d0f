//! CLI Discovery Service
//!
//! Finds a runnable Codex CLI and remembers it in the runtime settings.
//!
//! Candidates are tried in order and the first one whose probe succeeds wins:
//! the configured `cli_path`, the canonical name on `PATH`, the installation
//! directories, and finally the package-runner invocation.
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::errors::{CodexError, CodexResult};
use crate::domain::models::{DiscoveryConfig, RuntimeSettings};
use crate::domain::ports::{ExecutableProbe, SettingsStore};
use crate::services::command_builder::tokenize_cli_path;

/// Shown to the user when no candidate works.
pub const INSTALL_HINT: &str = "Install it globally with 'npm install -g @openai/codex' \
     or set 'cli_path' in the settings to the full path of the executable.";

/// Where a working executable was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    Configured,
    SystemPath,
    SearchDir,
    PackageRunner,
}

impl std::fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configured => write!(f, "configured"),
            Self::SystemPath => write!(f, "system path"),
            Self::SearchDir => write!(f, "search directory"),
            Self::PackageRunner => write!(f, "package runner"),
        }
    }
}

/// Result of a successful discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredCli {
    pub source: CandidateSource,
    /// Command tokens without the probe flag
    pub argv: Vec<String>,
    /// Shell-quoted form stored in `cli_path`
    pub cli_path: String,
    /// Whether the settings were written back
    pub persisted: bool,
}

#[derive(Debug, Clone)]
struct Candidate {
    source: CandidateSource,
    argv: Vec<String>,
}

/// Locates the Codex CLI using a configurable search order.
pub struct CliDiscovery {
    config: DiscoveryConfig,
    probe: Arc<dyn ExecutableProbe>,
}

impl CliDiscovery {
    pub fn new(config: DiscoveryConfig, probe: Arc<dyn ExecutableProbe>) -> Self {
        Self { config, probe }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Probe candidates and return the first working one without touching
    /// any settings file.
    pub async fn discover(&self, settings: &RuntimeSettings) -> CodexResult<DiscoveredCli> {
        let candidates = self.candidates(settings);
        debug!(count = candidates.len(), "probing Codex CLI candidates");

        for candidate in candidates {
            let mut probe_argv = candidate.argv.clone();
            probe_argv.push(self.config.probe_flag.clone());

            if self.probe.probe(&probe_argv).await {
                let cli_path = if candidate.source == CandidateSource::Configured {
                    settings.cli_command().to_string()
                } else {
                    quote_command(&candidate.argv)
                };
                info!(source = %candidate.source, cli_path = %cli_path, "found Codex CLI");
                return Ok(DiscoveredCli {
                    source: candidate.source,
                    argv: candidate.argv,
                    cli_path,
                    persisted: false,
                });
            }
            debug!(source = %candidate.source, argv = ?candidate.argv, "candidate rejected");
        }

        warn!("no working Codex CLI found");
        Err(CodexError::CliNotFound {
            remediation: INSTALL_HINT.to_string(),
        })
    }

    /// Discover the CLI and, when the result differs from `settings.cli_path`,
    /// update `settings` and save them through `store`.
    ///
    /// A failed save is logged and does not fail discovery.
    pub async fn ensure_available(
        &self,
        settings: &mut RuntimeSettings,
        store: &dyn SettingsStore,
    ) -> CodexResult<DiscoveredCli> {
        let mut found = self.discover(settings).await?;

        let current = settings.cli_path.as_deref().map(str::trim);
        if current == Some(found.cli_path.as_str()) {
            return Ok(found);
        }

        settings.cli_path = Some(found.cli_path.clone());
        match store.save(settings) {
            Ok(()) => {
                info!(cli_path = %found.cli_path, "remembered Codex CLI location");
                found.persisted = true;
            }
            Err(e) => warn!(error = %e, "could not persist discovered Codex CLI location"),
        }
        Ok(found)
    }

    fn candidates(&self, settings: &RuntimeSettings) -> Vec<Candidate> {
        let mut candidates = Vec::new();

        if settings.has_cli_path() {
            candidates.push(Candidate {
                source: CandidateSource::Configured,
                argv: tokenize_cli_path(settings.cli_command()),
            });
        }

        if self.config.system_lookup {
            match which::which(&self.config.executable_name) {
                Ok(path) => candidates.push(Candidate {
                    source: CandidateSource::SystemPath,
                    argv: vec![path.to_string_lossy().into_owned()],
                }),
                Err(e) => debug!(name = %self.config.executable_name, error = %e, "not on PATH"),
            }
        }

        let file_name = self.config.executable_file_name();
        let dirs = self
            .config
            .search_dirs
            .clone()
            .unwrap_or_else(default_search_dirs);
        for dir in dirs {
            let path = dir.join(&file_name);
            if path.is_file() {
                candidates.push(Candidate {
                    source: CandidateSource::SearchDir,
                    argv: vec![path.to_string_lossy().into_owned()],
                });
            }
        }

        if !self.config.package_runner.is_empty() {
            candidates.push(Candidate {
                source: CandidateSource::PackageRunner,
                argv: self.config.package_runner.clone(),
            });
        }

        let mut seen: Vec<Vec<String>> = Vec::new();
        candidates.retain(|candidate| {
            if seen.contains(&candidate.argv) {
                false
            } else {
                seen.push(candidate.argv.clone());
                true
            }
        });
        candidates
    }
}

/// Installation directories used when none are configured.
pub fn default_search_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    if let Some(pnpm_home) = std::env::var_os("PNPM_HOME").filter(|v| !v.is_empty()) {
        dirs.push(PathBuf::from(pnpm_home));
    }

    if cfg!(windows) {
        if let Some(profile) = std::env::var_os("USERPROFILE").filter(|v| !v.is_empty()) {
            dirs.push(
                PathBuf::from(profile)
                    .join("AppData")
                    .join("Local")
                    .join("pnpm"),
            );
        }
        if let Some(appdata) = std::env::var_os("APPDATA").filter(|v| !v.is_empty()) {
            dirs.push(PathBuf::from(appdata).join("npm"));
        }
    } else {
        if let Some(home) = dirs::home_dir() {
            dirs.push(home.join(".local").join("share").join("pnpm"));
            dirs.push(home.join(".npm-global").join("bin"));
        }
        dirs.push(PathBuf::from("/usr/local/bin"));
    }

    dirs
}

/// Quote tokens so that [`tokenize_cli_path`] yields them back unchanged.
fn quote_command(argv: &[String]) -> String {
    shlex::try_join(argv.iter().map(String::as_str)).unwrap_or_else(|_| argv.join(" "))
}
