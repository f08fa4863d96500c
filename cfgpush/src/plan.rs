//! Per-device command plans.

use std::fmt;

use crate::error::PlanError;
use crate::intent::IntentRecord;
use crate::render::render;

/// The fully rendered, ordered command list for one device.
///
/// A plan cannot be modified after it is built. The same records always
/// produce the same plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPlan {
    device_id: String,
    commands: Vec<String>,
}

impl CommandPlan {
    /// Build a plan by rendering every record in source order.
    ///
    /// Fails on the first record that cannot be rendered, including records
    /// of unknown kind; nothing is skipped.
    pub fn build(device_id: &str, records: &[IntentRecord]) -> Result<Self, PlanError> {
        if records.is_empty() {
            return Err(PlanError::EmptyPlan {
                device: device_id.to_string(),
            });
        }

        let mut commands = Vec::new();
        for (index, record) in records.iter().enumerate() {
            let rendered = render(record).map_err(|source| PlanError::Record {
                device: device_id.to_string(),
                index,
                source,
            })?;
            commands.extend(rendered);
        }

        Ok(Self {
            device_id: device_id.to_string(),
            commands,
        })
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl fmt::Display for CommandPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for command in &self.commands {
            writeln!(f, "{command}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::intent::{InterfaceIntent, RoutingIntent, UnknownRecord};

    fn interface() -> IntentRecord {
        IntentRecord::Interface(InterfaceIntent {
            interface: "GigabitEthernet0/1".into(),
            ip_address: Some("10.1.0.1".into()),
            subnet_mask: Some("255.255.255.0".into()),
            description: Some("LAN".into()),
            speed: Some("100".into()),
            ..Default::default()
        })
    }

    fn routing() -> IntentRecord {
        IntentRecord::Routing(RoutingIntent {
            router_id: Some("1.1.1.1".into()),
            default_next_hop: Some("10.1.0.254".into()),
            networks: vec!["10.1.0.0 0.0.0.255 area 0".into()],
        })
    }

    #[test]
    fn test_build_preserves_order() {
        let a = interface();
        let b = routing();
        let plan = CommandPlan::build("R1", &[a.clone(), b.clone()]).unwrap();

        let mut expected = render(&a).unwrap();
        expected.extend(render(&b).unwrap());
        assert_eq!(plan.commands(), expected.as_slice());
        assert_eq!(plan.device_id(), "R1");

        let reversed = CommandPlan::build("R1", &[b, a]).unwrap();
        assert_ne!(plan, reversed);
        assert_eq!(plan.len(), reversed.len());
    }

    #[test]
    fn test_build_is_deterministic() {
        let records = [interface(), routing()];
        let first = CommandPlan::build("R1", &records).unwrap();
        let second = CommandPlan::build("R1", &records).unwrap();
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn test_empty_plan() {
        assert_eq!(
            CommandPlan::build("R2", &[]).unwrap_err(),
            PlanError::EmptyPlan {
                device: "R2".into()
            }
        );
    }

    #[test]
    fn test_unknown_record_is_reported() {
        let unknown = IntentRecord::Unknown(UnknownRecord {
            keys: vec!["hostname".into()],
        });
        let err = CommandPlan::build("R1", &[interface(), unknown]).unwrap_err();
        assert_eq!(
            err,
            PlanError::Record {
                device: "R1".into(),
                index: 1,
                source: RenderError::UnknownRecordKind {
                    keys: vec!["hostname".into()]
                },
            }
        );
    }

    #[test]
    fn test_display_one_command_per_line() {
        let plan = CommandPlan::build("R1", &[routing()]).unwrap();
        let text = plan.to_string();
        assert_eq!(text.lines().count(), plan.len());
        assert!(text.starts_with("ip route 0.0.0.0 0.0.0.0 10.1.0.254\n"));
    }
}
