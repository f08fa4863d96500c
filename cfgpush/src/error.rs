//! Error types for cfgpush.
//!
//! Each layer owns a `thiserror` enum; the crate-level [`Error`] folds them
//! together so `?` works across layer boundaries.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for cfgpush operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel operation errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Driver-level errors
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Intent file errors
    #[error(transparent)]
    Intent(#[from] IntentError),

    /// Command plan errors
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// Run configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Transport layer errors (SSH connection, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to reach the host at all
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// Host is not in known_hosts and verification is strict
    #[error("Host key for {host}:{port} is not known")]
    HostKeyUnknown { host: String, port: u16 },

    /// Host key differs from the known_hosts entry
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Channel layer errors (prompt matching, PTY operations).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Prompt did not appear in time
    #[error("Pattern not found within {0:?}")]
    PatternTimeout(Duration),

    /// Channel closed unexpectedly
    #[error("Channel closed")]
    Closed,

    /// SSH protocol error on the channel
    #[error("Channel SSH error: {0}")]
    Ssh(russh::Error),

    /// Invalid regex pattern
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Driver layer errors (command execution, privilege escalation).
#[derive(Error, Debug)]
pub enum DriverError {
    /// Driver not connected
    #[error("Driver not connected - call open() first")]
    NotConnected,

    /// Driver already connected
    #[error("Driver already connected")]
    AlreadyConnected,

    /// The device rejected a command
    #[error("Command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    /// Failed to acquire target privilege level
    #[error("Failed to acquire privilege level '{target}'")]
    PrivilegeAcquisitionFailed { target: String },

    /// Unknown privilege level detected
    #[error("Unknown privilege level from prompt: '{prompt}'")]
    UnknownPrivilege { prompt: String },

    /// No path found between privilege levels
    #[error("No path from privilege '{from}' to '{to}'")]
    NoPrivilegePath { from: String, to: String },
}

/// Intent file errors. All of these are fatal for a run.
#[derive(Error, Debug)]
pub enum IntentError {
    #[error("intent file {} not found", path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read intent file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed intent: {reason}")]
    Malformed { reason: String },
}

impl IntentError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        IntentError::Malformed {
            reason: reason.into(),
        }
    }
}

/// Errors from rendering a single intent record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A required field is absent or empty
    #[error("missing field '{field}' in {record}")]
    MissingField { field: &'static str, record: String },

    /// The record is neither an interface nor a routing record
    #[error("unknown record kind (keys: {})", keys.join(", "))]
    UnknownRecordKind { keys: Vec<String> },
}

/// Errors from building a device's command plan.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("device {device} has no intent records")]
    EmptyPlan { device: String },

    #[error("device {device}, record {index}: {source}")]
    Record {
        device: String,
        index: usize,
        #[source]
        source: RenderError,
    },
}

/// Run configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid device address '{value}': {reason}")]
    InvalidAddress { value: String, reason: String },

    #[error("device roster is empty")]
    EmptyRoster,

    #[error("failed to read credentials: {0}")]
    Prompt(String),
}

/// Result type alias using cfgpush's Error.
pub type Result<T> = std::result::Result<T, Error>;
