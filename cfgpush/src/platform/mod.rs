//! Platform definitions: prompt patterns, privilege levels and the
//! commands a platform needs around a configuration push.

pub mod cisco_ios;
mod definition;
mod privilege_level;

pub use definition::PlatformDefinition;
pub use privilege_level::PrivilegeLevel;
