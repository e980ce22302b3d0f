//! `command`: show the resolved Codex command line without running it.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::{PromptArgs, Workspace};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::AppConfig;
use crate::services::build_session_command;

#[derive(Args, Debug)]
pub struct CommandArgs {
    #[command(flatten)]
    pub prompt: PromptArgs,
}

#[derive(Debug, Serialize)]
pub struct ResolvedCommandOutput {
    pub agent: String,
    pub argv: Vec<String>,
    pub shell: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
}

impl CommandOutput for ResolvedCommandOutput {
    fn to_human(&self) -> String {
        match &self.cwd {
            Some(cwd) => format!("(cd {cwd} && {})", self.shell),
            None => self.shell.clone(),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: CommandArgs, config: &AppConfig, json_mode: bool) -> Result<()> {
    let workspace = Workspace::open(config.clone())?;
    let agent = workspace.agent(args.prompt.agent.as_deref())?;
    let request = args.prompt.into_request(agent, workspace.settings.clone());
    let command = build_session_command(&request);

    let out = ResolvedCommandOutput {
        agent: request.agent.name.clone(),
        shell: command.display(),
        argv: command.into_inner(),
        cwd: request.cwd().map(|p| p.display().to_string()),
    };
    output(&out, json_mode);
    Ok(())
}
