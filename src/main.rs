//! Codex Launcher CLI entry point.

use clap::Parser;

use codex_launcher::cli::commands;
use codex_launcher::cli::{Cli, Commands};
use codex_launcher::infrastructure::config::ConfigLoader;
use codex_launcher::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => codex_launcher::cli::handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => Some(logger),
        Err(err) => {
            eprintln!("Warning: logging disabled: {err:#}");
            None
        }
    };

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args, &config, cli.json).await,
        Commands::Command(args) => commands::command::execute(args, &config, cli.json).await,
        Commands::Login(args) => commands::login::execute_login(args, &config, cli.json).await,
        Commands::Redeem(args) => commands::login::execute_redeem(args, &config, cli.json).await,
        Commands::Discover(args) => commands::discover::execute(args, &config, cli.json).await,
        Commands::Agents(args) => commands::agents::execute(args, &config, cli.json).await,
    };

    if let Err(err) = result {
        codex_launcher::cli::handle_error(err, cli.json);
    }
}
