//! SSH transport layer wrapping russh.
//!
//! Connection setup, authentication, host key checking and opening the
//! interactive PTY shell that the channel layer reads from.

pub mod config;
mod ssh;

pub use config::{AuthMethod, HostKeyVerification, SshConfig};
pub use ssh::SshTransport;
