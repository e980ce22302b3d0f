//! `discover`: locate a working Codex CLI.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use super::Workspace;
use crate::adapters::process::{path_in_env, write_npx_shim, CommandProbe};
use crate::cli::output::progress::{create_spinner_with_message, hidden_spinner, ProgressBarExt};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::AppConfig;
use crate::services::{CliDiscovery, DiscoveredCli};

#[derive(Args, Debug)]
pub struct DiscoverArgs {
    /// Report the result without saving it to the settings
    #[arg(long)]
    pub no_save: bool,

    /// Also write a `codex.cmd` shim forwarding to `npx codex` into this directory
    #[arg(long, value_name = "DIR")]
    pub write_shim: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct DiscoverOutput {
    #[serde(flatten)]
    pub found: DiscoveredCli,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shim: Option<ShimOutput>,
}

#[derive(Debug, Serialize)]
pub struct ShimOutput {
    pub path: PathBuf,
    pub dir_on_path: bool,
}

impl CommandOutput for DiscoverOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Codex CLI: {}", self.found.cli_path),
            format!("Found via: {}", self.found.source),
        ];
        if self.found.persisted {
            lines.push("Saved to settings.".to_string());
        }
        if let Some(shim) = &self.shim {
            lines.push(format!("Shim written to {}", shim.path.display()));
            if !shim.dir_on_path {
                lines.push("Add its directory to PATH to call `codex` directly.".to_string());
            }
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

fn discovery_for(config: &AppConfig) -> CliDiscovery {
    let probe = Arc::new(CommandProbe::new(config.discovery.probe_timeout()));
    CliDiscovery::new(config.discovery.clone(), probe)
}

/// Discover the CLI and persist it into the workspace settings.
pub async fn ensure(workspace: &mut Workspace, json_mode: bool) -> Result<DiscoveredCli> {
    let discovery = discovery_for(&workspace.config);
    let spinner = if json_mode {
        hidden_spinner()
    } else {
        create_spinner_with_message("Looking for the Codex CLI...")
    };

    let result = discovery
        .ensure_available(&mut workspace.settings, &workspace.store)
        .await;
    match &result {
        Ok(found) => spinner.finish_success(format!("Found {}", found.cli_path)),
        Err(_) => spinner.finish_error("Codex CLI not found"),
    }
    result.context("Codex CLI discovery failed")
}

pub async fn execute(args: DiscoverArgs, config: &AppConfig, json_mode: bool) -> Result<()> {
    let mut workspace = Workspace::open(config.clone())?;

    let found = if args.no_save {
        discovery_for(config)
            .discover(&workspace.settings)
            .await
            .context("Codex CLI discovery failed")?
    } else {
        ensure(&mut workspace, json_mode).await?
    };

    let shim = match args.write_shim {
        Some(dir) => {
            let path = write_npx_shim(&dir)
                .with_context(|| format!("Failed to write shim into {}", dir.display()))?;
            Some(ShimOutput {
                path,
                dir_on_path: path_in_env(&dir),
            })
        }
        None => None,
    };

    output(&DiscoverOutput { found, shim }, json_mode);
    Ok(())
}
