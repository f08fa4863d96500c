//! Intent model and decoding of the JSON intent file.
//!
//! Two source shapes are accepted:
//!
//! ```text
//! { "R1": [ {"interface": "Tunnel0", ...}, {"router-id": "1.1.1.1", ...} ],
//!   "R2": [ ... ] }
//!
//! [ {"interface": "GigabitEthernet0/1", ...} ]      # flat, single device
//! ```
//!
//! A flat list is the degenerate single-device case and is bound to the
//! device id supplied by the caller.
//!
//! Records are classified once at decode time: a record with an `interface`
//! key is an interface, one with `router-id`/`router_id` is routing, anything
//! else is kept as [`IntentRecord::Unknown`] so the plan builder can report it.

mod model;

pub use model::{
    DEFAULT_TUNNEL_BANDWIDTH, DEFAULT_TUNNEL_MTU, IntentRecord, InterfaceIntent, RoutingIntent,
    UnknownRecord,
};

use std::io;
use std::path::Path;

use indexmap::IndexMap;
use log::debug;
use serde_json::{Map, Value};

use crate::error::IntentError;

/// Decoded intent for every device in the file, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntentDocument {
    devices: IndexMap<String, Vec<IntentRecord>>,
}

impl IntentDocument {
    /// Read and decode an intent file.
    ///
    /// `flat_device` names the device a flat record list belongs to.
    pub fn load(path: &Path, flat_device: Option<&str>) -> Result<Self, IntentError> {
        let text = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                IntentError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                IntentError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let document = Self::from_json_str(&text, flat_device)?;
        debug!(
            "loaded intent for {} device(s) from {}",
            document.devices.len(),
            path.display()
        );
        Ok(document)
    }

    /// Decode intent from JSON text.
    pub fn from_json_str(text: &str, flat_device: Option<&str>) -> Result<Self, IntentError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| IntentError::malformed(format!("invalid JSON: {e}")))?;

        let mut devices = IndexMap::new();
        match value {
            Value::Object(by_device) => {
                for (device, records) in by_device {
                    let Value::Array(records) = records else {
                        return Err(IntentError::malformed(format!(
                            "device {device}: expected an array of records"
                        )));
                    };
                    let records = decode_records(&device, records)?;
                    devices.insert(device, records);
                }
            }
            Value::Array(records) => {
                let device = flat_device.ok_or_else(|| {
                    IntentError::malformed("flat record list needs a target device (flat_device)")
                })?;
                let records = decode_records(device, records)?;
                devices.insert(device.to_string(), records);
            }
            other => {
                return Err(IntentError::malformed(format!(
                    "expected a JSON object or array at top level, found {}",
                    json_kind(&other)
                )));
            }
        }

        Ok(Self { devices })
    }

    /// Records for one device, if the file mentions it.
    pub fn records(&self, device: &str) -> Option<&[IntentRecord]> {
        self.devices.get(device).map(Vec::as_slice)
    }

    /// Device ids in file order.
    pub fn device_ids(&self) -> impl Iterator<Item = &str> {
        self.devices.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

fn decode_records(device: &str, records: Vec<Value>) -> Result<Vec<IntentRecord>, IntentError> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let map = match record {
                Value::Object(map) => map,
                other => {
                    return Err(IntentError::malformed(format!(
                        "device {device}, record {index}: expected an object, found {}",
                        json_kind(&other)
                    )));
                }
            };
            classify(map).map_err(|reason| {
                IntentError::malformed(format!("device {device}, record {index}: {reason}"))
            })
        })
        .collect()
}

/// Turn one raw JSON object into a tagged record.
fn classify(map: Map<String, Value>) -> Result<IntentRecord, String> {
    reject_control_chars(&map)?;

    if map.contains_key("interface") {
        let intf: InterfaceIntent =
            serde_json::from_value(Value::Object(map)).map_err(|e| e.to_string())?;
        return Ok(IntentRecord::Interface(intf));
    }

    if map.contains_key("router-id") || map.contains_key("router_id") {
        return decode_routing(map).map(IntentRecord::Routing);
    }

    Ok(IntentRecord::Unknown(UnknownRecord {
        keys: map.keys().cloned().collect(),
    }))
}

fn decode_routing(mut map: Map<String, Value>) -> Result<RoutingIntent, String> {
    let router_id = take_text(&mut map, &["router-id", "router_id"])?;
    let default_next_hop = take_text(&mut map, &["ip_route", "default_next_hop"])?;

    let mut networks = match map.remove("networks") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(format!(
                    "'networks' entries must be strings, found {}",
                    json_kind(&other)
                )),
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => {
            return Err(format!(
                "'networks' must be an array, found {}",
                json_kind(&other)
            ));
        }
    };

    // Legacy numbered keys: network_1, network_2, ...
    let mut numbered: Vec<(u32, String)> = Vec::new();
    for (key, value) in &map {
        let Some(n) = key.strip_prefix("network_").and_then(|n| n.parse().ok()) else {
            continue;
        };
        match value {
            Value::String(s) => numbered.push((n, s.clone())),
            other => return Err(format!("'{key}' must be a string, found {}", json_kind(other))),
        }
    }
    numbered.sort_by_key(|(n, _)| *n);
    networks.extend(numbered.into_iter().map(|(_, network)| network));

    Ok(RoutingIntent {
        router_id,
        default_next_hop,
        networks,
    })
}

/// Remove the first present key among `keys` and return it as text.
fn take_text(map: &mut Map<String, Value>, keys: &[&str]) -> Result<Option<String>, String> {
    for key in keys {
        match map.remove(*key) {
            None | Some(Value::Null) => continue,
            Some(Value::String(s)) => return Ok(Some(s)),
            Some(other) => {
                return Err(format!("'{key}' must be a string, found {}", json_kind(&other)));
            }
        }
    }
    Ok(None)
}

/// Every value ends up inside a single CLI line; an embedded line break
/// would be sent to the device as an extra command.
fn reject_control_chars(map: &Map<String, Value>) -> Result<(), String> {
    fn check(key: &str, value: &Value) -> Result<(), String> {
        match value {
            Value::String(s) if s.chars().any(char::is_control) => {
                Err(format!("'{key}' contains a control character"))
            }
            Value::Array(items) => items.iter().try_for_each(|item| check(key, item)),
            Value::Object(inner) => inner.iter().try_for_each(|(k, v)| check(k, v)),
            _ => Ok(()),
        }
    }
    map.iter().try_for_each(|(key, value)| check(key, value))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
