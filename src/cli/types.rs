//! CLI type definitions
//!
//! Clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::commands::agents::AgentsArgs;
use super::commands::command::CommandArgs;
use super::commands::discover::DiscoverArgs;
use super::commands::login::{LoginArgs, RedeemArgs};
use super::commands::run::RunArgs;

#[derive(Parser, Debug)]
#[command(name = "codex-launcher")]
#[command(about = "Launch and supervise Codex CLI sessions with named agents", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .codex-launcher/config.yaml)
    #[arg(short, long, global = true, env = "CODEX_LAUNCHER_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a prompt through the Codex CLI and stream its output
    Run(RunArgs),

    /// Print the Codex command line a prompt would run
    Command(CommandArgs),

    /// Sign in to the Codex CLI
    Login(LoginArgs),

    /// Redeem free Codex credits
    Redeem(RedeemArgs),

    /// Locate a working Codex CLI and remember it
    Discover(DiscoverArgs),

    /// Agent management commands
    Agents(AgentsArgs),
}
