//! Command Builder Service
//!
//! Turns an agent + settings pair into the Codex CLI argument vector.
//!
//! Precedence is agent over settings for every shared key. Temperature has
//! its own chain (`agent.temperature`, `agent.default_temperature`,
//! `settings.temperature`). Boolean values never become flag arguments.
use tracing::{debug, warn};

use crate::domain::models::{
    AgentConfig, CommandExtras, CommandVector, FlagSet, FlagValue, RuntimeSettings,
    SessionRequest,
};

/// Prefix added when the settings ask for the `uv` sandbox launcher.
const UV_SANDBOX_PREFIX: [&str; 2] = ["uv", "run"];

/// Split a configured CLI command into tokens using shell quoting rules.
///
/// `"npx codex --no-update-notifier"` yields three tokens while
/// `"'/opt/my tools/codex'"` stays a single token. Input with unbalanced
/// quotes cannot be shell-split and is kept whole.
pub fn tokenize_cli_path(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if let Some(tokens) = shlex::split(trimmed) {
        if !tokens.is_empty() {
            return tokens;
        }
    } else {
        warn!(cli_path = %trimmed, "cli_path has unbalanced quotes, using it as a single token");
    }
    vec![trimmed.to_string()]
}

/// The executable part of every command line: tokenized `cli_path`
/// (default `codex`), optionally wrapped in `uv run`.
pub fn base_command(settings: &RuntimeSettings) -> CommandVector {
    let mut tokens = Vec::new();
    if settings.uv_sandbox_enabled() {
        tokens.extend(UV_SANDBOX_PREFIX.iter().map(|t| (*t).to_string()));
    }
    tokens.extend(tokenize_cli_path(settings.cli_command()));
    CommandVector::new(tokens)
}

/// Build the argument vector for a streaming session.
///
/// `extras.cwd` is never part of the vector; callers pass it to the spawner.
pub fn build_command(
    prompt: &str,
    agent: &AgentConfig,
    settings: &RuntimeSettings,
    extras: &CommandExtras,
) -> CommandVector {
    let mut tokens = base_command(settings).into_inner();

    let temperature = agent.temperature().or(settings.flags.temperature.as_ref());
    push_value(&mut tokens, "--temperature", temperature);

    let merged = FlagSet::layered(&agent.flags, &settings.flags);

    for (flag, value) in merged.value_flags() {
        push_value(&mut tokens, flag, value);
    }

    if let Some(model) = merged.model.as_ref().filter(|m| m.is_truthy()) {
        push_value(&mut tokens, "--model", Some(model));
    }

    for (flag, value) in merged.switch_flags() {
        if value.is_some_and(FlagValue::is_truthy) {
            tokens.push(flag.to_string());
        }
    }

    if let Some(roots) = merged.writable_root.as_ref().filter(|r| r.is_truthy()) {
        for root in roots.writable_roots() {
            tokens.push("--writable-root".to_string());
            tokens.push(root);
        }
    }

    if let Some(view) = extras.view.as_deref().filter(|v| !v.is_empty()) {
        tokens.push("--view".to_string());
        tokens.push(view.to_string());
    }

    push_each(&mut tokens, "--image", &extras.images);
    push_each(&mut tokens, "--file", &extras.files);

    tokens.push(prompt.to_string());

    let command = CommandVector::new(tokens);
    debug!(argv = %command.display(), "built Codex command");
    command
}

/// [`build_command`] for a full session request.
pub fn build_session_command(request: &SessionRequest) -> CommandVector {
    build_command(
        &request.prompt,
        &request.agent,
        &request.settings,
        &request.extras,
    )
}

fn push_value(tokens: &mut Vec<String>, flag: &str, value: Option<&FlagValue>) {
    if let Some(argument) = value.and_then(FlagValue::as_argument) {
        tokens.push(flag.to_string());
        tokens.push(argument);
    }
}

fn push_each(tokens: &mut Vec<String>, flag: &str, values: &[String]) {
    for value in values.iter().filter(|v| !v.is_empty()) {
        tokens.push(flag.to_string());
        tokens.push(value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::PATH_LIST_SEPARATOR;
    use serde_json::json;

    fn agent(value: serde_json::Value) -> AgentConfig {
        serde_json::from_value(value).unwrap()
    }

    fn settings(value: serde_json::Value) -> RuntimeSettings {
        serde_json::from_value(value).unwrap()
    }

    fn count(cmd: &CommandVector, token: &str) -> usize {
        cmd.as_slice().iter().filter(|t| *t == token).count()
    }

    fn value_after<'a>(cmd: &'a CommandVector, flag: &str) -> Option<&'a str> {
        let slice = cmd.as_slice();
        slice
            .iter()
            .position(|t| t == flag)
            .and_then(|i| slice.get(i + 1))
            .map(String::as_str)
    }

    #[test]
    fn test_build_command_returns_strings_with_defaults() {
        let cmd = build_command(
            "hello",
            &agent(json!({"temperature": 0.3, "model": "gpt"})),
            &settings(json!({"cli_path": "codex"})),
            &CommandExtras::default(),
        );
        assert_eq!(
            cmd.as_slice(),
            &["codex", "--temperature", "0.3", "--model", "gpt", "hello"]
        );
    }

    #[test]
    fn test_missing_cli_path_uses_codex() {
        let cmd = build_command(
            "hi",
            &AgentConfig::default(),
            &RuntimeSettings::default(),
            &CommandExtras::default(),
        );
        assert_eq!(cmd.as_slice(), &["codex", "hi"]);
    }

    #[test]
    fn test_npx_command_is_tokenized() {
        let cmd = build_command(
            "hi",
            &agent(json!({"temperature": 0.3})),
            &settings(json!({"cli_path": "npx codex --no-update-notifier"})),
            &CommandExtras::default(),
        );
        assert_eq!(&cmd.as_slice()[..3], &["npx", "codex", "--no-update-notifier"]);
        assert_eq!(cmd.last_token(), Some("hi"));
    }

    #[test]
    fn test_quoted_path_with_space_stays_one_token() {
        let tokens = tokenize_cli_path("'/opt/my tools/codex' --quiet");
        assert_eq!(tokens, vec!["/opt/my tools/codex", "--quiet"]);
    }

    #[test]
    fn test_unbalanced_quotes_kept_whole() {
        assert_eq!(tokenize_cli_path("  \"codex  "), vec!["\"codex"]);
    }

    #[test]
    fn test_uv_sandbox_prefix() {
        let cmd = build_command(
            "go",
            &AgentConfig::default(),
            &settings(json!({"use_uv_sandbox": true, "cli_path": "codex"})),
            &CommandExtras::default(),
        );
        assert_eq!(cmd.as_slice(), &["uv", "run", "codex", "go"]);
    }

    #[test]
    fn test_temperature_precedence() {
        let cmd = build_command(
            "p",
            &agent(json!({"temperature": 0.3})),
            &settings(json!({"temperature": 0.9})),
            &CommandExtras::default(),
        );
        assert_eq!(count(&cmd, "--temperature"), 1);
        assert_eq!(value_after(&cmd, "--temperature"), Some("0.3"));
        assert_eq!(count(&cmd, "0.9"), 0);

        let cmd = build_command(
            "p",
            &agent(json!({"default_temperature": 0.1})),
            &settings(json!({"temperature": 0.9})),
            &CommandExtras::default(),
        );
        assert_eq!(value_after(&cmd, "--temperature"), Some("0.1"));

        let cmd = build_command(
            "p",
            &AgentConfig::default(),
            &settings(json!({"temperature": 0.9})),
            &CommandExtras::default(),
        );
        assert_eq!(value_after(&cmd, "--temperature"), Some("0.9"));
    }

    #[test]
    fn test_agent_null_temperature_suppresses_settings() {
        let cmd = build_command(
            "p",
            &agent(json!({"temperature": null})),
            &settings(json!({"temperature": 0.9})),
            &CommandExtras::default(),
        );
        assert_eq!(count(&cmd, "--temperature"), 0);
    }

    #[test]
    fn test_scalar_flags_fall_back_to_settings_in_table_order() {
        let cmd = build_command(
            "p",
            &agent(json!({"max_tokens": 2048, "provider": "azure"})),
            &settings(json!({"max_tokens": 1024, "top_p": 0.8, "reasoning": "high"})),
            &CommandExtras::default(),
        );
        assert_eq!(
            cmd.as_slice(),
            &[
                "codex",
                "--max-tokens",
                "2048",
                "--top-p",
                "0.8",
                "--provider",
                "azure",
                "--reasoning",
                "high",
                "p"
            ]
        );
    }

    #[test]
    fn test_boolean_in_value_flag_is_absent() {
        let cmd = build_command(
            "p",
            &agent(json!({"provider": true, "approval_mode": false})),
            &settings(json!({"provider": "openai", "project_doc": true})),
            &CommandExtras::default(),
        );
        assert_eq!(cmd.as_slice(), &["codex", "p"]);
    }

    #[test]
    fn test_model_falls_back_and_skips_falsy() {
        let cmd = build_command(
            "p",
            &AgentConfig::default(),
            &settings(json!({"model": "o4-mini"})),
            &CommandExtras::default(),
        );
        assert_eq!(value_after(&cmd, "--model"), Some("o4-mini"));

        let cmd = build_command(
            "p",
            &agent(json!({"model": ""})),
            &settings(json!({"model": "o4-mini"})),
            &CommandExtras::default(),
        );
        assert_eq!(count(&cmd, "--model"), 0);
    }

    #[test]
    fn test_switches_are_bare_flags() {
        let cmd = build_command(
            "p",
            &agent(json!({"full_auto": true, "quiet": false})),
            &settings(json!({"quiet": true, "notify": true, "auto_edit": 0})),
            &CommandExtras::default(),
        );
        assert_eq!(cmd.as_slice(), &["codex", "--full-auto", "--notify", "p"]);
    }

    #[test]
    fn test_writable_roots_from_joined_string() {
        let joined = ["a", "b", "c"].join(&PATH_LIST_SEPARATOR.to_string());
        let cmd = build_command(
            "p",
            &agent(json!({ "writable_root": joined })),
            &RuntimeSettings::default(),
            &CommandExtras::default(),
        );
        assert_eq!(
            cmd.as_slice(),
            &[
                "codex",
                "--writable-root",
                "a",
                "--writable-root",
                "b",
                "--writable-root",
                "c",
                "p"
            ]
        );
    }

    #[test]
    fn test_writable_roots_list_from_settings() {
        let cmd = build_command(
            "p",
            &AgentConfig::default(),
            &settings(json!({"writable_root": ["/srv", "", true, "/data"]})),
            &CommandExtras::default(),
        );
        assert_eq!(
            cmd.as_slice(),
            &["codex", "--writable-root", "/srv", "--writable-root", "/data", "p"]
        );
    }

    #[test]
    fn test_view_images_and_files() {
        let extras = CommandExtras {
            view: Some("rollout.json".to_string()),
            images: vec!["a.png".to_string(), String::new(), "b.png".to_string()],
            files: vec!["main.rs".to_string()],
            cwd: Some("/work".into()),
        };
        let cmd = build_command("p", &AgentConfig::default(), &RuntimeSettings::default(), &extras);
        assert_eq!(
            cmd.as_slice(),
            &[
                "codex",
                "--view",
                "rollout.json",
                "--image",
                "a.png",
                "--image",
                "b.png",
                "--file",
                "main.rs",
                "p"
            ]
        );
        assert!(!cmd.as_slice().iter().any(|t| t == "/work"));
    }

    #[test]
    fn test_empty_prompt_is_still_last() {
        let cmd = build_command(
            "",
            &agent(json!({"full_auto": true})),
            &RuntimeSettings::default(),
            &CommandExtras::default(),
        );
        assert_eq!(cmd.last_token(), Some(""));
    }

    #[test]
    fn test_full_ordering() {
        let cmd = build_command(
            "do it",
            &agent(json!({
                "temperature": 1.0,
                "model": "o3",
                "approval_mode": "suggest",
                "full_context": true,
                "writable_root": "/tmp/w"
            })),
            &settings(json!({"max_tokens": 1024, "disable_response_storage": true})),
            &CommandExtras::default(),
        );
        assert_eq!(
            cmd.as_slice(),
            &[
                "codex",
                "--temperature",
                "1.0",
                "--max-tokens",
                "1024",
                "--approval-mode",
                "suggest",
                "--model",
                "o3",
                "--full-context",
                "--disable-response-storage",
                "--writable-root",
                "/tmp/w",
                "do it"
            ]
        );
    }

    #[test]
    fn test_build_session_command_uses_request() {
        let request = SessionRequest::new(
            "hello",
            agent(json!({"model": "gpt"})),
            settings(json!({"cli_path": "codex"})),
        )
        .with_files(["a.rs"]);
        let cmd = build_session_command(&request);
        assert_eq!(
            cmd.as_slice(),
            &["codex", "--model", "gpt", "--file", "a.rs", "hello"]
        );
    }
}
