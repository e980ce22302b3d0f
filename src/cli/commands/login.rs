//! `login` and `redeem`: one-shot Codex commands.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use super::Workspace;
use crate::application::SessionController;
use crate::cli::output::progress::{create_spinner_with_message, hidden_spinner, ProgressBarExt};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{AppConfig, OneShotCommand};

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Give up after this many seconds
    #[arg(short, long)]
    pub timeout: Option<f64>,
}

#[derive(Args, Debug)]
pub struct RedeemArgs {
    /// Give up after this many seconds (overrides `redeem_timeout`)
    #[arg(short, long)]
    pub timeout: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct OneShotOutput {
    pub command: OneShotCommand,
    pub lines: Vec<String>,
}

impl CommandOutput for OneShotOutput {
    fn to_human(&self) -> String {
        self.lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute_login(args: LoginArgs, config: &AppConfig, json_mode: bool) -> Result<()> {
    let timeout = args.timeout.or(config.session.login_timeout_secs);
    run(OneShotCommand::Login, timeout, config, json_mode).await
}

pub async fn execute_redeem(args: RedeemArgs, config: &AppConfig, json_mode: bool) -> Result<()> {
    run(OneShotCommand::RedeemCredits, args.timeout, config, json_mode).await
}

async fn run(
    kind: OneShotCommand,
    timeout: Option<f64>,
    config: &AppConfig,
    json_mode: bool,
) -> Result<()> {
    let workspace = Workspace::open(config.clone())?;
    let settings = &workspace.settings;
    let timeout = timeout.or(match kind {
        OneShotCommand::RedeemCredits => Some(settings.redeem_timeout_secs()),
        OneShotCommand::Login => None,
    });

    let controller = SessionController::from_config(&config.session);
    let spinner = if json_mode {
        hidden_spinner()
    } else {
        create_spinner_with_message(format!("Running Codex {kind}..."))
    };

    let result = controller.run_command(kind, settings, timeout).await;
    match &result {
        Ok(_) => spinner.finish_success(format!("Codex {kind} finished")),
        Err(e) => spinner.finish_error(format!("Codex {kind} failed: {e}")),
    }

    let lines = result.with_context(|| format!("Codex {kind} failed"))?;
    output(&OneShotOutput { command: kind, lines }, json_mode);
    Ok(())
}
