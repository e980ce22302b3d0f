//! Agent definitions loaded from a directory of JSON files.
//!
//! Loading is non-fatal: files that cannot be read or parsed are logged
//! with [`tracing::warn`] and skipped.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::domain::models::AgentConfig;

/// The agents available to the launcher and the one currently selected.
#[derive(Debug, Clone, Default)]
pub struct AgentCatalog {
    agents: Vec<AgentConfig>,
    active: Option<usize>,
}

impl AgentCatalog {
    pub fn new(agents: Vec<AgentConfig>) -> Self {
        Self {
            agents,
            active: None,
        }
    }

    /// Load every `*.json` file in `dir`, ordered by file name.
    ///
    /// An agent without a `name` is named after its file stem. A missing
    /// directory yields an empty catalog.
    pub fn load_dir(dir: &Path) -> Self {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                info!(path = %dir.display(), error = %e, "agents directory not readable, no agents loaded");
                return Self::default();
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.path()),
                Err(e) => {
                    warn!(error = %e, "Failed to read directory entry");
                    None
                }
            })
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();

        let agents: Vec<AgentConfig> = files.iter().filter_map(|path| load_agent(path)).collect();
        info!(path = %dir.display(), count = agents.len(), "loaded agents");
        Self::new(agents)
    }

    pub fn agents(&self) -> &[AgentConfig] {
        &self.agents
    }

    pub fn names(&self) -> Vec<&str> {
        self.agents.iter().map(|agent| agent.name.as_str()).collect()
    }

    pub fn find(&self, name: &str) -> Option<&AgentConfig> {
        self.agents.iter().find(|agent| agent.name == name)
    }

    /// Make `name` the active agent. Returns `false` if no agent has that name.
    pub fn select(&mut self, name: &str) -> bool {
        match self.agents.iter().position(|agent| agent.name == name) {
            Some(index) => {
                self.active = Some(index);
                true
            }
            None => false,
        }
    }

    /// The selected agent, or the first one when nothing was selected.
    pub fn active(&self) -> Option<&AgentConfig> {
        self.active
            .and_then(|index| self.agents.get(index))
            .or_else(|| self.agents.first())
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

fn load_agent(path: &Path) -> Option<AgentConfig> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Skipping agent file that could not be read");
            return None;
        }
    };

    match serde_json::from_str::<AgentConfig>(&raw) {
        Ok(mut agent) => {
            if agent.name.trim().is_empty() {
                agent.name = path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default();
            }
            Some(agent)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Skipping malformed agent file");
            None
        }
    }
}
