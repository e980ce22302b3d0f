//! Agent CLI commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use super::Workspace;
use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::models::{AgentConfig, AppConfig, FlagValue};
use crate::domain::ports::SettingsStore;

#[derive(Args, Debug)]
pub struct AgentsArgs {
    #[command(subcommand)]
    pub command: AgentsCommands,
}

#[derive(Subcommand, Debug)]
pub enum AgentsCommands {
    /// List available agents
    List,
    /// Show an agent's settings
    Show {
        /// Agent name
        name: String,
    },
    /// Make an agent the default for future runs
    Select {
        /// Agent name
        name: String,
    },
}

#[derive(Debug, Serialize)]
pub struct AgentListOutput {
    pub agents: Vec<AgentConfig>,
    pub active: Option<String>,
    pub total: usize,
}

impl CommandOutput for AgentListOutput {
    fn to_human(&self) -> String {
        if self.agents.is_empty() {
            return "No agents found.".to_string();
        }
        format!(
            "Found {} agent(s):\n{}",
            self.total,
            TableFormatter::new().format_agents(&self.agents, self.active.as_deref())
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct AgentDetailOutput {
    pub agent: AgentConfig,
}

impl CommandOutput for AgentDetailOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!("Agent: {}", self.agent.name)];
        if let Some(description) = &self.agent.description {
            lines.push(format!("Description: {description}"));
        }
        if let Some(default) = self.agent.default_temperature.as_ref().and_then(FlagValue::as_argument) {
            lines.push(format!("Default temperature: {default}"));
        }
        lines.push(TableFormatter::new().format_flags(&self.agent.flags));
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct AgentActionOutput {
    pub success: bool,
    pub message: String,
}

impl CommandOutput for AgentActionOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: AgentsArgs, config: &AppConfig, json_mode: bool) -> Result<()> {
    let mut workspace = Workspace::open(config.clone())?;

    match args.command {
        AgentsCommands::List => {
            let out = AgentListOutput {
                agents: workspace.catalog.agents().to_vec(),
                active: workspace.catalog.active().map(|a| a.name.clone()),
                total: workspace.catalog.len(),
            };
            output(&out, json_mode);
        }

        AgentsCommands::Show { name } => {
            let agent = workspace.agent(Some(&name))?;
            output(&AgentDetailOutput { agent }, json_mode);
        }

        AgentsCommands::Select { name } => {
            if !workspace.catalog.select(&name) {
                anyhow::bail!(
                    "Unknown agent '{name}'. Available: {}",
                    workspace.catalog.names().join(", ")
                );
            }
            workspace.settings.selected_agent = Some(name.clone());
            workspace
                .store
                .save(&workspace.settings)
                .context("Failed to save settings")?;

            let out = AgentActionOutput {
                success: true,
                message: format!("Selected agent: {name}"),
            };
            output(&out, json_mode);
        }
    }

    Ok(())
}
