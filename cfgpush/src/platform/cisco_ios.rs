//! Cisco IOS / IOS-XE platform definition.
//!
//! # Prompt Examples
//!
//! ```text
//! R1>                      # exec
//! R1#                      # privilege_exec
//! R1(config)#              # configuration
//! R1(config-if)#           # configuration sub-mode
//! R1(config-router)#       # configuration sub-mode
//! ```
//!
//! # Privilege Graph
//!
//! ```text
//! ┌──────┐  enable    ┌────────────────┐  configure terminal  ┌───────────────┐
//! │ exec ├────────────► privilege_exec ├──────────────────────► configuration │
//! │  >   │  disable   │       #        │         end          │  (config*)#   │
//! └──────┘◄───────────┴────────────────┘◄─────────────────────┴───────────────┘
//! ```

use super::{PlatformDefinition, PrivilegeLevel};

pub const PLATFORM_NAME: &str = "cisco_ios";

pub const EXEC: &str = "exec";
pub const PRIVILEGE_EXEC: &str = "privilege_exec";
pub const CONFIGURATION: &str = "configuration";

const EXEC_PROMPT: &str = r"(?mi)^[\w.\-@/:]{1,63}>\s?$";
const PRIVILEGE_EXEC_PROMPT: &str = r"(?mi)^[\w.\-@/:]{1,63}#\s?$";
const CONFIGURATION_PROMPT: &str = r"(?mi)^[\w.\-@/:]{1,63}\(conf[\w.\-@/:+]{0,63}\)#\s?$";
const ENABLE_SECRET_PROMPT: &str = r"(?mi)^password:\s?$";

/// Build the Cisco IOS platform definition.
pub fn platform() -> PlatformDefinition {
    // The patterns are constants and known to compile.
    let exec = PrivilegeLevel::new(EXEC, EXEC_PROMPT).expect("exec prompt pattern");

    let privilege_exec = PrivilegeLevel::new(PRIVILEGE_EXEC, PRIVILEGE_EXEC_PROMPT)
        .and_then(|level| level.with_auth(ENABLE_SECRET_PROMPT))
        .expect("privilege_exec prompt pattern")
        .with_parent(EXEC)
        .with_escalate("enable")
        .with_deescalate("disable");

    let configuration = PrivilegeLevel::new(CONFIGURATION, CONFIGURATION_PROMPT)
        .expect("configuration prompt pattern")
        .with_parent(PRIVILEGE_EXEC)
        .with_escalate("configure terminal")
        .with_deescalate("end");

    PlatformDefinition::new(PLATFORM_NAME)
        .with_privilege(exec)
        .with_privilege(privilege_exec)
        .with_privilege(configuration)
        .with_default_privilege(PRIVILEGE_EXEC)
        .with_config_privilege(CONFIGURATION)
        .with_failure_pattern("% Ambiguous command")
        .with_failure_pattern("% Incomplete command")
        .with_failure_pattern("% Invalid input detected")
        .with_failure_pattern("% Unknown command")
        .with_failure_pattern("% Access denied")
        .with_failure_pattern("% Bad secrets")
        .with_on_open_command("terminal length 0")
        .with_on_open_command("terminal width 512")
        .with_save("write memory", Some("[OK]"))
        .with_terminal_size(512, 24)
}
