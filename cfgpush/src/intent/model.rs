//! Typed intent records.

use serde::{Deserialize, Deserializer};

/// Bandwidth rendered for tunnels when the record carries none.
pub const DEFAULT_TUNNEL_BANDWIDTH: u32 = 1000;

/// IP MTU rendered for tunnels when the record carries none.
pub const DEFAULT_TUNNEL_MTU: u32 = 1400;

/// Desired state of one interface.
///
/// Required fields are optional here so that a record missing one can still be
/// decoded and later rejected with the exact field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InterfaceIntent {
    pub interface: String,
    #[serde(default, deserialize_with = "text")]
    pub ip_address: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub subnet_mask: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub duplex: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub speed: Option<String>,
    #[serde(default)]
    pub bandwidth: Option<u32>,
    #[serde(default)]
    pub mtu: Option<u32>,
    #[serde(default, deserialize_with = "text")]
    pub tunnel_src: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub tunnel_dst: Option<String>,
}

impl InterfaceIntent {
    /// Tunnel interfaces are recognised by name.
    pub fn is_tunnel(&self) -> bool {
        self.interface.starts_with("Tunnel")
    }

    pub fn bandwidth_or_default(&self) -> u32 {
        self.bandwidth.unwrap_or(DEFAULT_TUNNEL_BANDWIDTH)
    }

    pub fn mtu_or_default(&self) -> u32 {
        self.mtu.unwrap_or(DEFAULT_TUNNEL_MTU)
    }
}

/// Desired default route and OSPF process settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingIntent {
    pub router_id: Option<String>,
    pub default_next_hop: Option<String>,
    pub networks: Vec<String>,
}

/// A record whose keys match neither the interface nor the routing shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnknownRecord {
    pub keys: Vec<String>,
}

/// One entry of a device's intent list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentRecord {
    Interface(InterfaceIntent),
    Routing(RoutingIntent),
    Unknown(UnknownRecord),
}

/// Accepts a JSON string or number and keeps it as text; `null` is absent.
fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Text {
        Str(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<Text>::deserialize(deserializer)? {
        None => None,
        Some(Text::Str(s)) => Some(s),
        Some(Text::Int(n)) => Some(n.to_string()),
        Some(Text::Float(n)) => Some(n.to_string()),
    })
}
