//! Platform definition for a device family.

use indexmap::IndexMap;

use super::privilege_level::PrivilegeLevel;

/// Prompt patterns, privilege levels and canned commands of one platform.
#[derive(Debug, Clone)]
pub struct PlatformDefinition {
    /// Platform name (e.g., "cisco_ios").
    pub name: String,

    /// Privilege levels, root first.
    pub privilege_levels: IndexMap<String, PrivilegeLevel>,

    /// Level used for `show`/save commands.
    pub default_privilege: String,

    /// Level configuration commands are sent in.
    pub config_privilege: String,

    /// Output fragments that mark a command as rejected.
    pub failed_when_contains: Vec<String>,

    /// Commands run right after login.
    pub on_open_commands: Vec<String>,

    /// Command persisting the running configuration.
    pub save_command: String,

    /// Output fragment confirming a successful save.
    pub save_confirmation: Option<String>,

    pub terminal_width: u32,

    pub terminal_height: u32,
}

impl PlatformDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            privilege_levels: IndexMap::new(),
            default_privilege: String::new(),
            config_privilege: String::new(),
            failed_when_contains: vec![],
            on_open_commands: vec![],
            save_command: String::new(),
            save_confirmation: None,
            terminal_width: 511,
            terminal_height: 24,
        }
    }

    pub fn with_privilege(mut self, level: PrivilegeLevel) -> Self {
        self.privilege_levels.insert(level.name.clone(), level);
        self
    }

    pub fn with_default_privilege(mut self, name: impl Into<String>) -> Self {
        self.default_privilege = name.into();
        self
    }

    pub fn with_config_privilege(mut self, name: impl Into<String>) -> Self {
        self.config_privilege = name.into();
        self
    }

    pub fn with_failure_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.failed_when_contains.push(pattern.into());
        self
    }

    pub fn with_on_open_command(mut self, command: impl Into<String>) -> Self {
        self.on_open_commands.push(command.into());
        self
    }

    pub fn with_save(mut self, command: impl Into<String>, confirmation: Option<&str>) -> Self {
        self.save_command = command.into();
        self.save_confirmation = confirmation.map(str::to_string);
        self
    }

    pub fn with_terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    /// First failure pattern found in `output`.
    pub fn detect_failure(&self, output: &str) -> Option<&str> {
        self.failed_when_contains
            .iter()
            .find(|pattern| output.contains(pattern.as_str()))
            .map(String::as_str)
    }
}
