//! Command-line front end.

pub mod commands;
pub mod output;
pub mod types;

use crate::domain::errors::CodexError;

pub use types::{Cli, Commands};

/// Print an error the way the active output mode expects and exit.
///
/// A failed Codex process propagates its own exit code and stderr.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    let codex = err.downcast_ref::<CodexError>();
    let stderr = codex.and_then(CodexError::stderr).unwrap_or_default();

    if json_mode {
        let body = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
            "stderr": stderr,
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
        if !stderr.trim().is_empty() {
            eprintln!("{}", stderr.trim_end());
        }
    }

    std::process::exit(exit_code_for(codex));
}

fn exit_code_for(err: Option<&CodexError>) -> i32 {
    match err {
        Some(CodexError::CliExit { exit_code, .. }) if *exit_code > 0 => *exit_code,
        Some(CodexError::CliNotFound { .. }) => 127,
        Some(CodexError::CliTimeout { .. }) => 124,
        _ => 1,
    }
}
