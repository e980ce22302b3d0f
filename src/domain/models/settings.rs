use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::flags::{present, FlagSet, FlagValue};

/// Executable used when no `cli_path` is configured.
pub const DEFAULT_CLI: &str = "codex";

/// Credit redemption timeout used when `redeem_timeout` is unset.
pub const DEFAULT_REDEEM_TIMEOUT_SECS: f64 = 30.0;

/// Runtime settings as persisted by the settings collaborator.
///
/// Besides the shared flag vocabulary this carries the controller-level keys.
/// Keys owned by other collaborators (themes, plugin state, ...) are kept in
/// `extra` so that saving settings after discovery preserves them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeSettings {
    /// Executable name, path, or a multi-token command such as `npx codex`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cli_path: Option<String>,

    /// Wrap the command in `uv run`
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub use_uv_sandbox: Option<FlagValue>,

    /// Timeout in seconds for the credit redemption command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redeem_timeout: Option<f64>,

    /// Agent selected in the last session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_agent: Option<String>,

    /// CLI flag values used when the agent does not set them
    #[serde(flatten)]
    pub flags: FlagSet,

    /// Keys owned by other collaborators
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RuntimeSettings {
    /// The configured executable, or [`DEFAULT_CLI`] when unset or blank.
    pub fn cli_command(&self) -> &str {
        match self.cli_path.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => path,
            _ => DEFAULT_CLI,
        }
    }

    /// Whether a non-blank `cli_path` is configured.
    pub fn has_cli_path(&self) -> bool {
        self.cli_path
            .as_deref()
            .is_some_and(|path| !path.trim().is_empty())
    }

    /// Seconds the credit redemption command may run.
    pub fn redeem_timeout_secs(&self) -> f64 {
        self.redeem_timeout.unwrap_or(DEFAULT_REDEEM_TIMEOUT_SECS)
    }

    pub fn uv_sandbox_enabled(&self) -> bool {
        self.use_uv_sandbox
            .as_ref()
            .is_some_and(FlagValue::is_truthy)
    }

    /// Builder-style setter used by callers and tests.
    #[must_use]
    pub fn with_cli_path(mut self, cli_path: impl Into<String>) -> Self {
        self.cli_path = Some(cli_path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_redeem_timeout_defaults_to_thirty_seconds() {
        assert_eq!(RuntimeSettings::default().redeem_timeout_secs(), 30.0);

        let settings: RuntimeSettings = serde_json::from_value(json!({"redeem_timeout": 5})).unwrap();
        assert_eq!(settings.redeem_timeout_secs(), 5.0);
    }

    #[test]
    fn test_cli_command_defaults_to_codex() {
        assert_eq!(RuntimeSettings::default().cli_command(), "codex");
        let blank = RuntimeSettings::default().with_cli_path("   ");
        assert_eq!(blank.cli_command(), "codex");
        assert!(!blank.has_cli_path());
    }

    #[test]
    fn test_unknown_keys_survive_round_trip() {
        let raw = json!({
            "temperature": 0.5,
            "max_tokens": 1024,
            "selected_agent": "Python Expert",
            "theme": "dark",
            "plugins": {"tts_player": false}
        });
        let settings: RuntimeSettings = serde_json::from_value(raw).unwrap();

        assert_eq!(settings.flags.max_tokens, Some(FlagValue::Int(1024)));
        assert_eq!(settings.selected_agent.as_deref(), Some("Python Expert"));
        assert_eq!(settings.extra.get("theme"), Some(&json!("dark")));
        assert!(!settings.extra.contains_key("max_tokens"));

        let saved = serde_json::to_value(&settings).unwrap();
        assert_eq!(saved["theme"], json!("dark"));
        assert_eq!(saved["plugins"]["tts_player"], json!(false));
        assert_eq!(saved["max_tokens"], json!(1024));
    }

    #[test]
    fn test_uv_sandbox_truthiness() {
        let on: RuntimeSettings = serde_json::from_value(json!({"use_uv_sandbox": true})).unwrap();
        let off: RuntimeSettings = serde_json::from_value(json!({"use_uv_sandbox": null})).unwrap();
        assert!(on.uv_sandbox_enabled());
        assert!(!off.uv_sandbox_enabled());
        assert!(!RuntimeSettings::default().uv_sandbox_enabled());
    }
}
