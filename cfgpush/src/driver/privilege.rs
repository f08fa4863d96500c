//! Privilege level tracking and navigation.

use indexmap::IndexMap;
use regex::bytes::Regex;

use crate::error::{DriverError, Result};
use crate::platform::PrivilegeLevel;

/// Tracks the current CLI mode and plans moves between modes.
///
/// Levels form a tree through their `parent` links. A move between two
/// levels climbs from the start to the closest common ancestor and then
/// descends to the target.
#[derive(Debug)]
pub struct PrivilegeManager {
    levels: IndexMap<String, PrivilegeLevel>,
    current: Option<String>,
}

/// One step of a privilege move.
#[derive(Debug, Clone)]
pub struct Transition {
    /// Command to send.
    pub command: String,

    /// Secret prompt that may follow the command.
    pub auth_prompt: Option<Regex>,
}

impl PrivilegeManager {
    pub fn new(levels: IndexMap<String, PrivilegeLevel>) -> Self {
        Self {
            levels,
            current: None,
        }
    }

    /// Identify the level whose prompt pattern matches `prompt`.
    pub fn determine_from_prompt(&self, prompt: &str) -> Result<&PrivilegeLevel> {
        self.levels
            .values()
            .find(|level| level.matches(prompt))
            .ok_or_else(|| {
                DriverError::UnknownPrivilege {
                    prompt: prompt.to_string(),
                }
                .into()
            })
    }

    /// Update the current level from a prompt; unknown prompts leave it as is.
    pub fn observe_prompt(&mut self, prompt: &str) -> Option<&str> {
        let name = self.determine_from_prompt(prompt).ok()?.name.clone();
        self.current = Some(name);
        self.current.as_deref()
    }

    pub fn current(&self) -> Option<&PrivilegeLevel> {
        self.current.as_ref().and_then(|name| self.levels.get(name))
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn set_current(&mut self, name: &str) -> Result<()> {
        if !self.levels.contains_key(name) {
            return Err(DriverError::UnknownPrivilege {
                prompt: name.to_string(),
            }
            .into());
        }
        self.current = Some(name.to_string());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&PrivilegeLevel> {
        self.levels.get(name)
    }

    /// `name` followed by each of its ancestors up to the root.
    fn lineage(&self, name: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut next = self.levels.get(name);
        // A malformed definition could contain a parent cycle
        while let Some(level) = next {
            if chain.len() > self.levels.len() {
                break;
            }
            chain.push(level.name.clone());
            next = level.parent.as_deref().and_then(|p| self.levels.get(p));
        }
        chain
    }

    /// Levels visited moving from `from` to `to`, both included.
    pub fn find_path(&self, from: &str, to: &str) -> Result<Vec<String>> {
        let no_path = || DriverError::NoPrivilegePath {
            from: from.to_string(),
            to: to.to_string(),
        };

        let up = self.lineage(from);
        let down = self.lineage(to);
        if up.is_empty() || down.is_empty() {
            return Err(no_path().into());
        }

        let (up_idx, down_idx) = up
            .iter()
            .enumerate()
            .find_map(|(i, name)| down.iter().position(|d| d == name).map(|j| (i, j)))
            .ok_or_else(no_path)?;

        let mut path: Vec<String> = up[..=up_idx].to_vec();
        path.extend(down[..down_idx].iter().rev().cloned());
        Ok(path)
    }

    /// Command moving between two adjacent levels.
    pub fn transition(&self, from: &str, to: &str) -> Option<Transition> {
        let from_level = self.levels.get(from)?;
        let to_level = self.levels.get(to)?;

        if to_level.parent.as_deref() == Some(from) {
            return Some(Transition {
                command: to_level.escalate_command.clone()?,
                auth_prompt: to_level.escalate_prompt.clone(),
            });
        }

        if from_level.parent.as_deref() == Some(to) {
            return Some(Transition {
                command: from_level.deescalate_command.clone()?,
                auth_prompt: None,
            });
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::cisco_ios;

    fn manager() -> PrivilegeManager {
        PrivilegeManager::new(cisco_ios::platform().privilege_levels)
    }

    #[test]
    fn test_determine_privilege() {
        let manager = manager();
        assert_eq!(manager.determine_from_prompt("R1>").unwrap().name, "exec");
        assert_eq!(
            manager.determine_from_prompt("R1#").unwrap().name,
            "privilege_exec"
        );
        assert_eq!(
            manager.determine_from_prompt("R1(config-if)#").unwrap().name,
            "configuration"
        );
        assert!(manager.determine_from_prompt("Password:").is_err());
    }

    #[test]
    fn test_observe_prompt() {
        let mut manager = manager();
        assert_eq!(manager.current_name(), None);
        assert_eq!(manager.observe_prompt("R1>"), Some("exec"));
        assert_eq!(manager.observe_prompt("garbage"), None);
        assert_eq!(manager.current_name(), Some("exec"));
    }

    #[test]
    fn test_find_path() {
        let manager = manager();
        assert_eq!(
            manager.find_path("exec", "configuration").unwrap(),
            vec!["exec", "privilege_exec", "configuration"]
        );
        assert_eq!(
            manager.find_path("configuration", "exec").unwrap(),
            vec!["configuration", "privilege_exec", "exec"]
        );
        assert_eq!(
            manager.find_path("configuration", "privilege_exec").unwrap(),
            vec!["configuration", "privilege_exec"]
        );
        assert_eq!(manager.find_path("exec", "exec").unwrap(), vec!["exec"]);
        assert!(manager.find_path("exec", "shell").is_err());
    }

    #[test]
    fn test_sibling_path_goes_through_parent() {
        let mut levels = cisco_ios::platform().privilege_levels;
        let shell = PrivilegeLevel::new("shell", r"\$\s?$")
            .unwrap()
            .with_parent("privilege_exec")
            .with_escalate("start shell")
            .with_deescalate("exit");
        levels.insert("shell".to_string(), shell);
        let manager = PrivilegeManager::new(levels);

        assert_eq!(
            manager.find_path("configuration", "shell").unwrap(),
            vec!["configuration", "privilege_exec", "shell"]
        );
    }

    #[test]
    fn test_transition() {
        let manager = manager();

        let up = manager.transition("exec", "privilege_exec").unwrap();
        assert_eq!(up.command, "enable");
        assert!(up.auth_prompt.is_some());

        let down = manager.transition("configuration", "privilege_exec").unwrap();
        assert_eq!(down.command, "end");
        assert!(down.auth_prompt.is_none());

        assert!(manager.transition("exec", "configuration").is_none());
    }
}
