//! Loosely typed flag values and the shared agent/settings key vocabulary.
//!
//! Agent and settings files are written by hand and by UI checkboxes, so a
//! key may hold a number, a string, a boolean, a list, or an explicit `null`.
//! [`FlagValue`] keeps that shape; [`FlagSet`] names every key the CLI
//! understands and implements the layering used by the command builder.

use serde::{Deserialize, Deserializer, Serialize};

/// Separator used when several writable roots are joined into one string.
#[cfg(windows)]
pub const PATH_LIST_SEPARATOR: char = ';';
/// Separator used when several writable roots are joined into one string.
#[cfg(not(windows))]
pub const PATH_LIST_SEPARATOR: char = ':';

/// A scalar (or list) value as found in an agent or settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<FlagValue>),
}

impl FlagValue {
    /// Render the value as a CLI argument.
    ///
    /// Booleans, nulls, lists and empty strings have no argument form; a
    /// checkbox value must never turn into `--provider true`.
    pub fn as_argument(&self) -> Option<String> {
        let rendered = match self {
            Self::Null | Self::Bool(_) | Self::List(_) => return None,
            Self::Int(value) => value.to_string(),
            Self::Float(value) => format_float(*value),
            Self::Text(value) => value.clone(),
        };
        (!rendered.is_empty()).then_some(rendered)
    }

    /// Truthiness as the settings files use it for switches.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(value) => *value,
            Self::Int(value) => *value != 0,
            Self::Float(value) => *value != 0.0,
            Self::Text(value) => !value.is_empty(),
            Self::List(items) => !items.is_empty(),
        }
    }

    /// Expand a `writable_root` value into individual roots.
    ///
    /// A string may join several roots with [`PATH_LIST_SEPARATOR`]; a list
    /// contributes each entry that has an argument form.
    pub fn writable_roots(&self) -> Vec<String> {
        match self {
            Self::Text(joined) => joined
                .split(PATH_LIST_SEPARATOR)
                .filter(|root| !root.is_empty())
                .map(str::to_string)
                .collect(),
            Self::List(items) => items.iter().filter_map(Self::as_argument).collect(),
            other => other.as_argument().into_iter().collect(),
        }
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FlagValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FlagValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for FlagValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Render a float the way the settings files spell it.
///
/// Whole floats keep their `.0` (`1.0`, not `1`). Magnitudes below `1e-4` or
/// from `1e16` up use exponent form with a signed two-digit exponent
/// (`1e-05`, `1.5e+16`).
fn format_float(value: f64) -> String {
    let magnitude = value.abs();
    if !value.is_finite() {
        value.to_string()
    } else if value != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        exponent_form(value)
    } else if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

fn exponent_form(value: f64) -> String {
    let rendered = format!("{value:e}");
    match rendered.split_once('e') {
        Some((mantissa, exponent)) => match exponent.parse::<i32>() {
            Ok(exp) => {
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exp.unsigned_abs())
            }
            Err(_) => rendered,
        },
        None => rendered,
    }
}

/// Deserialize a field so that an explicit `null` is still "present".
///
/// Missing keys fall back to `None` through `#[serde(default)]`; a key set to
/// `null` becomes `Some(FlagValue::Null)` and therefore still wins precedence.
pub(crate) fn present<'de, D>(deserializer: D) -> Result<Option<FlagValue>, D::Error>
where
    D: Deserializer<'de>,
{
    FlagValue::deserialize(deserializer).map(Some)
}

/// Every key shared by agent files and runtime settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlagSet {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub temperature: Option<FlagValue>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<FlagValue>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub top_p: Option<FlagValue>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<FlagValue>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<FlagValue>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub provider: Option<FlagValue>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub approval_mode: Option<FlagValue>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<FlagValue>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub project_doc: Option<FlagValue>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub model: Option<FlagValue>,

    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub auto_edit: Option<FlagValue>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub full_auto: Option<FlagValue>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub flex_mode: Option<FlagValue>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub quiet: Option<FlagValue>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub full_context: Option<FlagValue>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub notify: Option<FlagValue>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub no_project_doc: Option<FlagValue>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub disable_response_storage: Option<FlagValue>,

    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub writable_root: Option<FlagValue>,
}

impl FlagSet {
    /// Merge two layers: each key comes from `upper` when present there,
    /// otherwise from `lower`.
    pub fn layered(upper: &Self, lower: &Self) -> Self {
        fn pick(upper: &Option<FlagValue>, lower: &Option<FlagValue>) -> Option<FlagValue> {
            upper.as_ref().or(lower.as_ref()).cloned()
        }

        Self {
            temperature: pick(&upper.temperature, &lower.temperature),
            max_tokens: pick(&upper.max_tokens, &lower.max_tokens),
            top_p: pick(&upper.top_p, &lower.top_p),
            frequency_penalty: pick(&upper.frequency_penalty, &lower.frequency_penalty),
            presence_penalty: pick(&upper.presence_penalty, &lower.presence_penalty),
            provider: pick(&upper.provider, &lower.provider),
            approval_mode: pick(&upper.approval_mode, &lower.approval_mode),
            reasoning: pick(&upper.reasoning, &lower.reasoning),
            project_doc: pick(&upper.project_doc, &lower.project_doc),
            model: pick(&upper.model, &lower.model),
            auto_edit: pick(&upper.auto_edit, &lower.auto_edit),
            full_auto: pick(&upper.full_auto, &lower.full_auto),
            flex_mode: pick(&upper.flex_mode, &lower.flex_mode),
            quiet: pick(&upper.quiet, &lower.quiet),
            full_context: pick(&upper.full_context, &lower.full_context),
            notify: pick(&upper.notify, &lower.notify),
            no_project_doc: pick(&upper.no_project_doc, &lower.no_project_doc),
            disable_response_storage: pick(
                &upper.disable_response_storage,
                &lower.disable_response_storage,
            ),
            writable_root: pick(&upper.writable_root, &lower.writable_root),
        }
    }

    /// Keys that take a value, in the order the CLI expects them.
    pub fn value_flags(&self) -> [(&'static str, Option<&FlagValue>); 8] {
        [
            ("--max-tokens", self.max_tokens.as_ref()),
            ("--top-p", self.top_p.as_ref()),
            ("--frequency-penalty", self.frequency_penalty.as_ref()),
            ("--presence-penalty", self.presence_penalty.as_ref()),
            ("--provider", self.provider.as_ref()),
            ("--approval-mode", self.approval_mode.as_ref()),
            ("--reasoning", self.reasoning.as_ref()),
            ("--project-doc", self.project_doc.as_ref()),
        ]
    }

    /// Bare switches, in the order the CLI expects them.
    pub fn switch_flags(&self) -> [(&'static str, Option<&FlagValue>); 8] {
        [
            ("--auto-edit", self.auto_edit.as_ref()),
            ("--full-auto", self.full_auto.as_ref()),
            ("--flex-mode", self.flex_mode.as_ref()),
            ("--quiet", self.quiet.as_ref()),
            ("--full-context", self.full_context.as_ref()),
            ("--notify", self.notify.as_ref()),
            ("--no-project-doc", self.no_project_doc.as_ref()),
            ("--disable-response-storage", self.disable_response_storage.as_ref()),
        ]
    }
}
