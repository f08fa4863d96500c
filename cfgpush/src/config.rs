//! Run configuration: device roster, intent location and SSH options.
//!
//! ```toml
//! intent_file = "device.json"
//! push_timeout_secs = 120
//!
//! [ssh]
//! port = 22
//! timeout_secs = 30
//! host_key_verification = "accept-new"
//!
//! [devices]
//! R1 = "192.168.15.150"
//! R2 = "192.168.15.151"
//! ISP1 = "isp1.lab:2222"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;
use crate::transport::HostKeyVerification;

/// Default intent file name.
pub const DEFAULT_INTENT_FILE: &str = "device.json";

/// Everything a run needs apart from credentials.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Path to the JSON intent file.
    #[serde(default = "default_intent_file")]
    pub intent_file: PathBuf,

    /// Device a flat (schema 2) intent list is bound to.
    #[serde(default)]
    pub flat_device: Option<String>,

    /// Upper bound on the send + save step of a single device.
    #[serde(default)]
    pub push_timeout_secs: Option<u64>,

    #[serde(default)]
    pub ssh: SshOptions,

    /// Known devices, in push order.
    #[serde(default)]
    pub devices: DeviceRoster,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            intent_file: default_intent_file(),
            flat_device: None,
            push_timeout_secs: None,
            ssh: SshOptions::default(),
            devices: DeviceRoster::default(),
        }
    }
}

impl RunConfig {
    /// Load a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn push_timeout(&self) -> Option<Duration> {
        self.push_timeout_secs.map(Duration::from_secs)
    }

    /// The device a flat intent list belongs to.
    ///
    /// Uses `flat_device` when set, otherwise the only roster device.
    pub fn resolve_flat_device(&self) -> Option<&str> {
        if let Some(device) = self.flat_device.as_deref() {
            return Some(device);
        }
        match self.devices.len() {
            1 => self.devices.iter().next().map(|(id, _)| id),
            _ => None,
        }
    }
}

fn default_intent_file() -> PathBuf {
    PathBuf::from(DEFAULT_INTENT_FILE)
}

/// SSH session options shared by all devices.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SshOptions {
    /// Port used when a device address has none.
    pub port: u16,

    /// Connect and per-prompt timeout in seconds.
    pub timeout_secs: u64,

    pub host_key_verification: HostKeyVerification,

    pub known_hosts: Option<PathBuf>,

    /// Use key authentication instead of the password.
    pub private_key: Option<PathBuf>,
}

impl Default for SshOptions {
    fn default() -> Self {
        Self {
            port: 22,
            timeout_secs: 30,
            host_key_verification: HostKeyVerification::default(),
            known_hosts: None,
            private_key: None,
        }
    }
}

impl SshOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Network address of a device: host plus optional port override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceAddress {
    pub host: String,
    pub port: Option<u16>,
}

impl DeviceAddress {
    pub fn port_or(&self, default: u16) -> u16 {
        self.port.unwrap_or(default)
    }
}

impl FromStr for DeviceAddress {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ConfigError::InvalidAddress {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let s = s.trim();
        if s.is_empty() {
            return Err(invalid("empty address"));
        }

        // "[v6]:port" or a bare v6 address
        if let Some(rest) = s.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| invalid("missing closing bracket"))?;
            let port = match tail {
                "" => None,
                tail => Some(
                    tail.strip_prefix(':')
                        .and_then(|p| p.parse().ok())
                        .ok_or_else(|| invalid("bad port"))?,
                ),
            };
            return Ok(Self {
                host: host.to_string(),
                port,
            });
        }

        match s.matches(':').count() {
            0 => Ok(Self {
                host: s.to_string(),
                port: None,
            }),
            1 => {
                let (host, port) = s.split_once(':').ok_or_else(|| invalid("bad port"))?;
                if host.is_empty() {
                    return Err(invalid("empty host"));
                }
                let port = port.parse().map_err(|_| invalid("bad port"))?;
                Ok(Self {
                    host: host.to_string(),
                    port: Some(port),
                })
            }
            _ => Ok(Self {
                host: s.to_string(),
                port: None,
            }),
        }
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.port, self.host.contains(':')) {
            (Some(port), true) => write!(f, "[{}]:{}", self.host, port),
            (Some(port), false) => write!(f, "{}:{}", self.host, port),
            (None, _) => f.write_str(&self.host),
        }
    }
}

impl<'de> Deserialize<'de> for DeviceAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Ordered set of known devices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct DeviceRoster {
    devices: IndexMap<String, DeviceAddress>,
}

impl DeviceRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a device. A replaced device keeps its position.
    pub fn insert(&mut self, id: impl Into<String>, address: DeviceAddress) {
        self.devices.insert(id.into(), address);
    }

    /// Parse an `ID=ADDRESS` pair as given on the command line.
    pub fn insert_spec(&mut self, spec: &str) -> Result<(), ConfigError> {
        let (id, address) = spec
            .split_once('=')
            .ok_or_else(|| ConfigError::InvalidAddress {
                value: spec.to_string(),
                reason: "expected ID=ADDRESS".to_string(),
            })?;
        let id = id.trim();
        if id.is_empty() {
            return Err(ConfigError::InvalidAddress {
                value: spec.to_string(),
                reason: "empty device id".to_string(),
            });
        }
        self.insert(id, address.parse()?);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&DeviceAddress> {
        self.devices.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.devices.contains_key(id)
    }

    /// Devices in roster order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DeviceAddress)> {
        self.devices.iter().map(|(id, addr)| (id.as_str(), addr))
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
