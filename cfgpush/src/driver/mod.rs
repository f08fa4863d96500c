//! Prompt-driven driver for one device.
//!
//! The driver sends commands over the PTY channel, tracks the privilege
//! level from each prompt and knows how to escalate to configuration mode
//! and persist the configuration.

mod builder;
mod generic;
mod privilege;
mod response;

pub use builder::DriverBuilder;
pub use generic::GenericDriver;
pub use privilege::{PrivilegeManager, Transition};
pub use response::Response;
