//! Subcommand implementations and the state they share.

pub mod agents;
pub mod command;
pub mod discover;
pub mod login;
pub mod run;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::adapters::storage::{AgentCatalog, JsonSettingsStore};
use crate::domain::models::{AgentConfig, AppConfig, RuntimeSettings, SessionRequest};
use crate::domain::ports::SettingsStore;

/// Settings, agents and configuration loaded for one CLI invocation.
pub struct Workspace {
    pub config: AppConfig,
    pub store: JsonSettingsStore,
    pub settings: RuntimeSettings,
    pub catalog: AgentCatalog,
}

impl Workspace {
    pub fn open(config: AppConfig) -> Result<Self> {
        let store = JsonSettingsStore::new(&config.paths.settings_file);
        let settings = store.load().context("Failed to load runtime settings")?;

        let mut catalog = AgentCatalog::load_dir(&config.paths.agents_dir);
        if let Some(name) = settings.selected_agent.as_deref() {
            if !catalog.select(name) {
                tracing::debug!(agent = %name, "selected agent not found in catalog");
            }
        }

        Ok(Self {
            config,
            store,
            settings,
            catalog,
        })
    }

    /// The named agent, or the active one. An empty catalog yields an agent
    /// with no overrides.
    pub fn agent(&self, name: Option<&str>) -> Result<AgentConfig> {
        match name {
            Some(name) => self.catalog.find(name).cloned().ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown agent '{name}'. Available: {}",
                    self.catalog.names().join(", ")
                )
            }),
            None => Ok(self.catalog.active().cloned().unwrap_or_default()),
        }
    }
}

/// Prompt and attachments shared by `run` and `command`.
#[derive(Args, Debug, Clone)]
pub struct PromptArgs {
    /// Prompt text passed to Codex
    #[arg(default_value = "")]
    pub prompt: String,

    /// Agent to use instead of the selected one
    #[arg(short, long)]
    pub agent: Option<String>,

    /// Inspect a previous session rollout instead of running a prompt
    #[arg(long)]
    pub view: Option<String>,

    /// Image to attach (repeatable)
    #[arg(short, long = "image")]
    pub images: Vec<String>,

    /// File to attach (repeatable)
    #[arg(short, long = "file")]
    pub files: Vec<String>,

    /// Working directory for the Codex process
    #[arg(long)]
    pub cwd: Option<PathBuf>,
}

impl PromptArgs {
    pub fn into_request(self, agent: AgentConfig, settings: RuntimeSettings) -> SessionRequest {
        let mut request = SessionRequest::new(self.prompt, agent, settings)
            .with_images(self.images)
            .with_files(self.files);
        if let Some(view) = self.view {
            request = request.with_view(view);
        }
        if let Some(cwd) = self.cwd {
            request = request.with_cwd(cwd);
        }
        request
    }
}
