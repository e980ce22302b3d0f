use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::agent::AgentConfig;
use super::settings::RuntimeSettings;

/// The argv of one external process invocation.
///
/// Built fresh for every invocation and never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CommandVector(Vec<String>);

impl CommandVector {
    pub fn new(tokens: Vec<String>) -> Self {
        Self(tokens)
    }

    /// The executable token.
    pub fn program(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Everything after the executable token.
    pub fn args(&self) -> &[String] {
        self.0.get(1..).unwrap_or_default()
    }

    /// The final token; for session commands this is the prompt.
    pub fn last_token(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }

    /// Return a new vector with one more token appended.
    #[must_use]
    pub fn with_trailing(&self, token: impl Into<String>) -> Self {
        let mut tokens = self.0.clone();
        tokens.push(token.into());
        Self(tokens)
    }

    /// Shell-quoted rendering for logs and dry runs.
    pub fn display(&self) -> String {
        shlex::try_join(self.0.iter().map(String::as_str)).unwrap_or_else(|_| self.0.join(" "))
    }
}

impl fmt::Display for CommandVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl AsRef<[String]> for CommandVector {
    fn as_ref(&self) -> &[String] {
        &self.0
    }
}

impl IntoIterator for CommandVector {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Optional inputs that shape a session command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandExtras {
    /// Prior session rollout to inspect instead of running a new prompt
    pub view: Option<String>,
    /// Image attachments, passed in order
    pub images: Vec<String>,
    /// File attachments, passed in order
    pub files: Vec<String>,
    /// Working directory for the spawned process; never part of the argv
    pub cwd: Option<PathBuf>,
}

/// Everything the controller needs to start a streaming session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionRequest {
    pub prompt: String,
    pub agent: AgentConfig,
    pub settings: RuntimeSettings,
    pub extras: CommandExtras,
}

impl SessionRequest {
    pub fn new(prompt: impl Into<String>, agent: AgentConfig, settings: RuntimeSettings) -> Self {
        Self {
            prompt: prompt.into(),
            agent,
            settings,
            extras: CommandExtras::default(),
        }
    }

    #[must_use]
    pub fn with_view(mut self, view: impl Into<String>) -> Self {
        self.extras.view = Some(view.into());
        self
    }

    #[must_use]
    pub fn with_images<I, S>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extras.images = images.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extras.files = files.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.extras.cwd = Some(cwd.into());
        self
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.extras.cwd.as_deref()
    }
}
