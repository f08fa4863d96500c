//! Command rendering: one intent record in, an ordered list of IOS
//! configuration-mode commands out.
//!
//! Output order matters. `interface <name>` switches the CLI into the
//! interface sub-mode, so every per-interface command must follow it.

use crate::error::RenderError;
use crate::intent::{IntentRecord, InterfaceIntent, RoutingIntent};

/// OSPF process id used for every routing record.
pub const OSPF_PROCESS_ID: u32 = 1;

/// Render any intent record.
pub fn render(record: &IntentRecord) -> Result<Vec<String>, RenderError> {
    match record {
        IntentRecord::Interface(intf) => render_interface(intf),
        IntentRecord::Routing(routing) => render_routing(routing),
        IntentRecord::Unknown(unknown) => Err(RenderError::UnknownRecordKind {
            keys: unknown.keys.clone(),
        }),
    }
}

/// Render an interface record, tunnel or physical depending on its name.
pub fn render_interface(intf: &InterfaceIntent) -> Result<Vec<String>, RenderError> {
    let record = || format!("interface {}", intf.interface);
    let name = non_empty(&intf.interface).ok_or_else(|| RenderError::MissingField {
        field: "interface",
        record: record(),
    })?;
    let address = required(&intf.ip_address, "ip_address", record)?;
    let mask = required(&intf.subnet_mask, "subnet_mask", record)?;
    let description = required(&intf.description, "description", record)?;

    let mut commands = Vec::with_capacity(9);
    if intf.is_tunnel() {
        let source = required(&intf.tunnel_src, "tunnel_src", record)?;
        let destination = required(&intf.tunnel_dst, "tunnel_dst", record)?;

        commands.push(format!("interface {name}"));
        commands.push(format!("ip address {address} {mask}"));
        commands.push(format!("bandwidth {}", intf.bandwidth_or_default()));
        commands.push(format!("description {description}"));
        commands.push(format!("ip mtu {}", intf.mtu_or_default()));
        commands.push(format!("tunnel source {source}"));
        commands.push(format!("tunnel destination {destination}"));
    } else {
        commands.push("no cdp run".to_string());
        commands.push(format!("interface {name}"));
        commands.push(format!("ip address {address} {mask}"));
        commands.push(format!("description {description}"));
        if let Some(duplex) = present(&intf.duplex) {
            commands.push(format!("duplex {duplex}"));
        }
        if let Some(speed) = present(&intf.speed) {
            commands.push(format!("speed {speed}"));
        }
    }
    commands.push("no shutdown".to_string());

    Ok(commands)
}

/// Render the default route and OSPF process for a routing record.
pub fn render_routing(routing: &RoutingIntent) -> Result<Vec<String>, RenderError> {
    let record = || "routing".to_string();
    let next_hop = required(&routing.default_next_hop, "default_next_hop", record)?;
    let router_id = required(&routing.router_id, "router_id", record)?;
    if routing.networks.is_empty() {
        return Err(RenderError::MissingField {
            field: "networks",
            record: record(),
        });
    }

    let mut commands = Vec::with_capacity(3 + routing.networks.len());
    commands.push(format!("ip route 0.0.0.0 0.0.0.0 {next_hop}"));
    commands.push(format!("router ospf {OSPF_PROCESS_ID}"));
    commands.push(format!("router-id {router_id}"));
    commands.extend(routing.networks.iter().map(|n| format!("network {n}")));

    Ok(commands)
}

/// Blank values count as absent; others are emitted as written.
fn non_empty(value: &str) -> Option<&str> {
    (!value.trim().is_empty()).then_some(value)
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().and_then(non_empty)
}

fn required<'a>(
    value: &'a Option<String>,
    field: &'static str,
    record: impl Fn() -> String,
) -> Result<&'a str, RenderError> {
    present(value).ok_or_else(|| RenderError::MissingField {
        field,
        record: record(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::UnknownRecord;

    fn tunnel() -> InterfaceIntent {
        InterfaceIntent {
            interface: "Tunnel0".into(),
            ip_address: Some("172.16.0.1".into()),
            subnet_mask: Some("255.255.255.252".into()),
            description: Some("GRE to R2".into()),
            tunnel_src: Some("GigabitEthernet0/0".into()),
            tunnel_dst: Some("203.0.113.2".into()),
            ..Default::default()
        }
    }

    fn physical() -> InterfaceIntent {
        InterfaceIntent {
            interface: "GigabitEthernet0/1".into(),
            ip_address: Some("10.1.0.1".into()),
            subnet_mask: Some("255.255.255.0".into()),
            description: Some("LAN".into()),
            ..Default::default()
        }
    }

    fn routing() -> RoutingIntent {
        RoutingIntent {
            router_id: Some("1.1.1.1".into()),
            default_next_hop: Some("203.0.113.254".into()),
            networks: vec!["10.0.0.0/8".into(), "192.168.0.0/16".into()],
        }
    }

    #[test]
    fn test_tunnel_commands() {
        let commands = render_interface(&tunnel()).unwrap();
        assert_eq!(
            commands,
            vec![
                "interface Tunnel0",
                "ip address 172.16.0.1 255.255.255.252",
                "bandwidth 1000",
                "description GRE to R2",
                "ip mtu 1400",
                "tunnel source GigabitEthernet0/0",
                "tunnel destination 203.0.113.2",
                "no shutdown",
            ]
        );
    }

    #[test]
    fn test_tunnel_framing() {
        let mut intf = tunnel();
        intf.bandwidth = Some(100);
        intf.mtu = Some(1476);
        intf.duplex = Some("full".into());

        let commands = render_interface(&intf).unwrap();
        assert_eq!(commands.first().unwrap(), "interface Tunnel0");
        assert_eq!(commands.last().unwrap(), "no shutdown");
        assert_eq!(
            commands.iter().filter(|c| c.starts_with("tunnel source ")).count(),
            1
        );
        assert_eq!(
            commands
                .iter()
                .filter(|c| c.starts_with("tunnel destination "))
                .count(),
            1
        );
        assert!(commands.contains(&"bandwidth 100".to_string()));
        assert!(commands.contains(&"ip mtu 1476".to_string()));
        // duplex only applies to physical interfaces
        assert!(!commands.iter().any(|c| c.starts_with("duplex")));
    }

    #[test]
    fn test_physical_without_duplex_or_speed() {
        let commands = render_interface(&physical()).unwrap();
        assert_eq!(
            commands,
            vec![
                "no cdp run",
                "interface GigabitEthernet0/1",
                "ip address 10.1.0.1 255.255.255.0",
                "description LAN",
                "no shutdown",
            ]
        );
    }

    #[test]
    fn test_physical_with_duplex_and_speed() {
        let mut intf = physical();
        intf.duplex = Some("full".into());
        intf.speed = Some("100".into());

        let commands = render_interface(&intf).unwrap();
        assert_eq!(&commands[4..], ["duplex full", "speed 100", "no shutdown"]);
    }

    #[test]
    fn test_empty_optional_is_omitted() {
        let mut intf = physical();
        intf.speed = Some("  ".into());
        let commands = render_interface(&intf).unwrap();
        assert!(!commands.iter().any(|c| c.starts_with("speed")));
    }

    #[test]
    fn test_values_are_emitted_as_written() {
        let mut intf = physical();
        intf.description = Some("  core uplink ".into());
        let commands = render_interface(&intf).unwrap();
        assert_eq!(commands[3], "description   core uplink ");
    }

    #[test]
    fn test_routing_commands() {
        let commands = render_routing(&routing()).unwrap();
        assert_eq!(
            commands,
            vec![
                "ip route 0.0.0.0 0.0.0.0 203.0.113.254",
                "router ospf 1",
                "router-id 1.1.1.1",
                "network 10.0.0.0/8",
                "network 192.168.0.0/16",
            ]
        );
    }

    #[test]
    fn test_missing_interface_fields() {
        let mut intf = physical();
        intf.ip_address = None;
        assert_eq!(
            render_interface(&intf).unwrap_err(),
            RenderError::MissingField {
                field: "ip_address",
                record: "interface GigabitEthernet0/1".into(),
            }
        );

        let mut intf = physical();
        intf.description = Some(String::new());
        assert!(matches!(
            render_interface(&intf),
            Err(RenderError::MissingField { field: "description", .. })
        ));

        let mut intf = physical();
        intf.interface = " ".into();
        assert!(matches!(
            render_interface(&intf),
            Err(RenderError::MissingField { field: "interface", .. })
        ));

        let mut intf = tunnel();
        intf.tunnel_src = None;
        assert!(matches!(
            render_interface(&intf),
            Err(RenderError::MissingField { field: "tunnel_src", .. })
        ));

        let mut intf = tunnel();
        intf.tunnel_dst = None;
        assert!(matches!(
            render_interface(&intf),
            Err(RenderError::MissingField { field: "tunnel_dst", .. })
        ));
    }

    #[test]
    fn test_missing_routing_fields() {
        let mut r = routing();
        r.router_id = None;
        assert!(matches!(
            render_routing(&r),
            Err(RenderError::MissingField { field: "router_id", .. })
        ));

        let mut r = routing();
        r.networks.clear();
        assert!(matches!(
            render_routing(&r),
            Err(RenderError::MissingField { field: "networks", .. })
        ));

        let mut r = routing();
        r.default_next_hop = None;
        assert!(matches!(
            render_routing(&r),
            Err(RenderError::MissingField { field: "default_next_hop", .. })
        ));
    }

    #[test]
    fn test_unknown_record() {
        let record = IntentRecord::Unknown(UnknownRecord {
            keys: vec!["hostname".into()],
        });
        assert_eq!(
            render(&record).unwrap_err(),
            RenderError::UnknownRecordKind {
                keys: vec!["hostname".into()]
            }
        );
    }

    #[test]
    fn test_render_is_deterministic() {
        let record = IntentRecord::Interface(tunnel());
        assert_eq!(render(&record).unwrap(), render(&record).unwrap());
    }
}
