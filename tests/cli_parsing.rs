//! Command-line parsing for every subcommand.

use std::path::PathBuf;

use clap::Parser;
use codex_launcher::cli::commands::agents::AgentsCommands;
use codex_launcher::cli::types::{Cli, Commands};

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("codex-launcher").chain(args.iter().copied()))
        .unwrap_or_else(|e| panic!("failed to parse {args:?}: {e}"))
}

#[test]
fn test_run_with_attachments() {
    let cli = parse(&[
        "run",
        "fix the tests",
        "--agent",
        "Rust Expert",
        "-i",
        "a.png",
        "--image",
        "b.png",
        "-f",
        "notes.md",
        "--cwd",
        "/tmp/work",
        "--discover",
    ]);
    let Commands::Run(args) = cli.command else {
        panic!("expected run");
    };
    assert_eq!(args.prompt.prompt, "fix the tests");
    assert_eq!(args.prompt.agent.as_deref(), Some("Rust Expert"));
    assert_eq!(args.prompt.images, vec!["a.png", "b.png"]);
    assert_eq!(args.prompt.files, vec!["notes.md"]);
    assert_eq!(args.prompt.cwd, Some(PathBuf::from("/tmp/work")));
    assert!(args.discover);
    assert!(!cli.json);
}

#[test]
fn test_command_prompt_defaults_to_empty() {
    let cli = parse(&["command", "--view", "rollout.json"]);
    let Commands::Command(args) = cli.command else {
        panic!("expected command");
    };
    assert_eq!(args.prompt.prompt, "");
    assert_eq!(args.prompt.view.as_deref(), Some("rollout.json"));
}

#[test]
fn test_login_and_redeem_timeouts() {
    let Commands::Login(login) = parse(&["login", "--timeout", "30"]).command else {
        panic!("expected login");
    };
    assert_eq!(login.timeout, Some(30.0));

    let Commands::Redeem(redeem) = parse(&["redeem", "-t", "2.5"]).command else {
        panic!("expected redeem");
    };
    assert_eq!(redeem.timeout, Some(2.5));

    let Commands::Redeem(redeem) = parse(&["redeem"]).command else {
        panic!("expected redeem");
    };
    assert_eq!(redeem.timeout, None);
}

#[test]
fn test_discover_no_save() {
    let Commands::Discover(args) = parse(&["discover", "--no-save"]).command else {
        panic!("expected discover");
    };
    assert!(args.no_save);
    assert_eq!(args.write_shim, None);

    let Commands::Discover(args) = parse(&["discover", "--write-shim", "/opt/shims"]).command else {
        panic!("expected discover");
    };
    assert_eq!(args.write_shim, Some(PathBuf::from("/opt/shims")));
}

#[test]
fn test_agents_subcommands() {
    let Commands::Agents(args) = parse(&["agents", "list"]).command else {
        panic!("expected agents");
    };
    assert!(matches!(args.command, AgentsCommands::List));

    let Commands::Agents(args) = parse(&["agents", "select", "Python Expert"]).command else {
        panic!("expected agents");
    };
    assert!(matches!(args.command, AgentsCommands::Select { ref name } if name == "Python Expert"));

    let Commands::Agents(args) = parse(&["agents", "show", "Reviewer"]).command else {
        panic!("expected agents");
    };
    assert!(matches!(args.command, AgentsCommands::Show { ref name } if name == "Reviewer"));
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = parse(&["discover", "--json", "--config", "/etc/launcher.yaml"]);
    assert!(cli.json);
    assert_eq!(cli.config, Some(PathBuf::from("/etc/launcher.yaml")));
}

#[test]
fn test_invalid_invocations_are_rejected() {
    for args in [
        vec!["codex-launcher"],
        vec!["codex-launcher", "agents"],
        vec!["codex-launcher", "login", "--timeout", "soon"],
        vec!["codex-launcher", "frobnicate"],
    ] {
        assert!(Cli::try_parse_from(&args).is_err(), "{args:?} should not parse");
    }
}
