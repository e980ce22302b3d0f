//! Table output formatting for CLI commands
//!
//! Renders agent listings and flag summaries using comfy-table.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use super::truncate;
use crate::domain::models::{AgentConfig, FlagSet, FlagValue};

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
    /// Maximum width for tables (None = auto)
    max_width: Option<u16>,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    pub fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// Format the agent catalog; `active` is marked in the first column
    pub fn format_agents(&self, agents: &[AgentConfig], active: Option<&str>) -> String {
        let mut table = self.create_base_table();

        table.set_header(vec![
            Cell::new("").add_attribute(Attribute::Bold),
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Model").add_attribute(Attribute::Bold),
            Cell::new("Temperature").add_attribute(Attribute::Bold),
            Cell::new("Description").add_attribute(Attribute::Bold),
        ]);

        for agent in agents {
            let is_active = active == Some(agent.name.as_str());
            let marker = if is_active { "*" } else { "" };
            let name_cell = if self.use_colors && is_active {
                Cell::new(&agent.name).fg(Color::Green)
            } else {
                Cell::new(&agent.name)
            };

            table.add_row(vec![
                Cell::new(marker),
                name_cell,
                Cell::new(display_value(agent.flags.model.as_ref())),
                Cell::new(display_value(agent.temperature())),
                Cell::new(truncate(agent.description.as_deref().unwrap_or("-"), 50)),
            ]);
        }

        table.to_string()
    }

    /// Format every flag key that is set
    pub fn format_flags(&self, flags: &FlagSet) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![
            Cell::new("Key").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        if let Ok(serde_json::Value::Object(map)) = serde_json::to_value(flags) {
            for (key, value) in map {
                table.add_row(vec![Cell::new(key), Cell::new(value.to_string())]);
            }
        }

        table.to_string()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();

        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if let Some(width) = self.max_width {
            table.set_width(width);
        }

        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if color output is supported
fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    true
}

fn display_value(value: Option<&FlagValue>) -> String {
    value
        .and_then(FlagValue::as_argument)
        .unwrap_or_else(|| "-".to_string())
}
