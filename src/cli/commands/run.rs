//! `run`: stream a Codex session to stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::info;

use super::{discover, PromptArgs, Workspace};
use crate::application::{spawn_session, SessionController, SessionEvent};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{AppConfig, SessionOutcome};

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub prompt: PromptArgs,

    /// Locate the Codex CLI before running
    #[arg(long)]
    pub discover: bool,
}

#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub agent: String,
    pub lines: Vec<String>,
    #[serde(flatten)]
    pub outcome: SessionOutcome,
}

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        let mut text = self.lines.join("\n");
        if self.outcome.is_cancelled() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str("Session stopped.");
        }
        text
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: RunArgs, config: &AppConfig, json_mode: bool) -> Result<()> {
    let mut workspace = Workspace::open(config.clone())?;
    if args.discover {
        discover::ensure(&mut workspace, json_mode).await?;
    }

    let agent = workspace.agent(args.prompt.agent.as_deref())?;
    let agent_name = agent.name.clone();
    let request = args.prompt.into_request(agent, workspace.settings.clone());

    let controller = Arc::new(SessionController::from_config(&config.session));
    let mut worker = spawn_session(Arc::clone(&controller), request);

    let mut lines = Vec::new();
    let result = loop {
        tokio::select! {
            event = worker.recv() => match event {
                Some(SessionEvent::Line(line)) => {
                    if json_mode {
                        lines.push(line);
                    } else {
                        println!("{line}");
                    }
                }
                Some(SessionEvent::Finished(result)) => break result,
                None => anyhow::bail!("Codex session worker stopped without a result"),
            },
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, stopping Codex session");
                controller.stop().await;
            }
        }
    };

    let outcome = result.context("Codex session failed")?;
    let out = RunOutput {
        agent: agent_name,
        lines,
        outcome,
    };
    if json_mode {
        output(&out, true);
    } else if outcome.is_cancelled() {
        eprintln!("Session stopped.");
    }
    Ok(())
}
