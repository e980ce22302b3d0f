use serde::{Deserialize, Serialize};

use super::flags::{present, FlagSet, FlagValue};

/// A named bundle of model/behaviour parameters loaded from an agent file.
///
/// Agents are read-only inside the launcher; keys the launcher does not know
/// about are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Display name used for selection
    #[serde(default)]
    pub name: String,

    /// Free-form description shown in listings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Fallback temperature used when the agent sets no `temperature`
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub default_temperature: Option<FlagValue>,

    /// CLI flag values
    #[serde(flatten)]
    pub flags: FlagSet,
}

impl AgentConfig {
    /// Create an empty agent with a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The agent's own temperature choice: `temperature`, then
    /// `default_temperature`. `None` when neither key is present.
    pub fn temperature(&self) -> Option<&FlagValue> {
        self.flags
            .temperature
            .as_ref()
            .or(self.default_temperature.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_agent_file() {
        let agent: AgentConfig = serde_json::from_value(json!({
            "name": "Python Expert",
            "description": "Writes Python",
            "default_temperature": 0.2,
            "model": "o4-mini",
            "full_auto": true,
            "instructions": "ignored by the launcher"
        }))
        .unwrap();

        assert_eq!(agent.name, "Python Expert");
        assert_eq!(agent.description.as_deref(), Some("Writes Python"));
        assert_eq!(agent.temperature(), Some(&FlagValue::Float(0.2)));
        assert_eq!(agent.flags.model, Some(FlagValue::from("o4-mini")));
        assert_eq!(agent.flags.full_auto, Some(FlagValue::Bool(true)));
    }

    #[test]
    fn test_temperature_beats_default_temperature() {
        let agent: AgentConfig =
            serde_json::from_value(json!({"temperature": 0.3, "default_temperature": 0.8}))
                .unwrap();
        assert_eq!(agent.temperature(), Some(&FlagValue::Float(0.3)));
    }

    #[test]
    fn test_named_agent_is_empty() {
        let agent = AgentConfig::named("Reviewer");
        assert_eq!(agent.name, "Reviewer");
        assert_eq!(agent.temperature(), None);
        assert_eq!(agent.flags, FlagSet::default());
    }
}
