//! Privilege level definition.

use regex::bytes::Regex;

/// One CLI mode of a device (`R1>`, `R1#`, `R1(config)#`).
///
/// Levels form a tree through `parent`; moving between levels walks the tree
/// with the escalate/deescalate commands.
#[derive(Debug, Clone)]
pub struct PrivilegeLevel {
    pub name: String,

    /// Prompt pattern for this level.
    pub pattern: Regex,

    /// Parent level (None for the root level).
    pub parent: Option<String>,

    /// Command to enter this level from its parent.
    pub escalate_command: Option<String>,

    /// Command to leave this level for its parent.
    pub deescalate_command: Option<String>,

    /// Prompt asking for a secret while escalating, if any.
    pub escalate_prompt: Option<Regex>,
}

impl PrivilegeLevel {
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            pattern: Regex::new(pattern)?,
            parent: None,
            escalate_command: None,
            deescalate_command: None,
            escalate_prompt: None,
        })
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_escalate(mut self, command: impl Into<String>) -> Self {
        self.escalate_command = Some(command.into());
        self
    }

    pub fn with_deescalate(mut self, command: impl Into<String>) -> Self {
        self.deescalate_command = Some(command.into());
        self
    }

    /// Escalating into this level asks for a secret at `prompt_pattern`.
    pub fn with_auth(mut self, prompt_pattern: &str) -> Result<Self, regex::Error> {
        self.escalate_prompt = Some(Regex::new(prompt_pattern)?);
        Ok(self)
    }

    /// Check if `prompt` is this level's prompt.
    pub fn matches(&self, prompt: &str) -> bool {
        self.pattern.is_match(prompt.as_bytes())
    }
}
