//! End-to-end push flow through the public API with in-memory sessions.

use std::sync::{Arc, Mutex};

use cfgpush::error::{DriverError, TransportError};
use cfgpush::push::{DeviceSession, SessionFactory, exit_code, summary_table};
use cfgpush::{
    CommandPlan, Credentials, DeviceAddress, IntentDocument, Orchestrator, PushStage, PushStatus,
    RunConfig,
};

const CONFIG: &str = r#"
intent_file = "device.json"

[devices]
R1 = "192.168.15.150"
R2 = "192.168.15.151"
ISP1 = "192.168.15.152"
ISP2 = "192.168.15.153"
"#;

const INTENT: &str = r#"{
    "R1": [
        {"interface": "GigabitEthernet0/1", "ip_address": "10.0.0.1",
         "subnet_mask": "255.255.255.252", "description": "to ISP1"},
        {"interface": "Tunnel0", "ip_address": "172.16.0.1",
         "subnet_mask": "255.255.255.252", "description": "GRE to R2",
         "tunnel_src": "GigabitEthernet0/1", "tunnel_dst": "10.0.1.2", "mtu": 1476},
        {"router-id": "1.1.1.1", "ip_route": "10.0.0.2",
         "network_1": "172.16.0.0 0.0.0.3 area 0",
         "network_2": "192.168.1.0 0.0.0.255 area 0"}
    ],
    "R2": [
        {"interface": "GigabitEthernet0/1", "ip_address": "10.0.1.2",
         "subnet_mask": "255.255.255.252", "description": "to ISP2"}
    ],
    "ISP1": [
        {"interface": "GigabitEthernet0/0", "ip_address": "10.0.0.2",
         "subnet_mask": "255.255.255.252", "description": "to R1", "duplex": "full"}
    ]
}"#;

/// Everything a device received, keyed by device id.
type Pushed = Arc<Mutex<Vec<(String, Vec<String>)>>>;

struct RecordingFactory {
    pushed: Pushed,
    unreachable: &'static str,
}

struct RecordingSession {
    device_id: String,
    pushed: Pushed,
}

impl DeviceSession for RecordingSession {
    async fn enter_privileged(&mut self) -> cfgpush::Result<()> {
        Ok(())
    }

    async fn send_command_set(&mut self, commands: &[String]) -> cfgpush::Result<String> {
        if commands.iter().any(|c| c.contains("bogus")) {
            return Err(DriverError::CommandFailed {
                command: "bogus".into(),
                message: "% Invalid input detected".into(),
            }
            .into());
        }
        self.pushed
            .lock()
            .unwrap()
            .push((self.device_id.clone(), commands.to_vec()));
        Ok(String::new())
    }

    async fn save(&mut self) -> cfgpush::Result<()> {
        Ok(())
    }

    async fn close(&mut self) -> cfgpush::Result<()> {
        Ok(())
    }
}

impl SessionFactory for RecordingFactory {
    type Session = RecordingSession;

    async fn open(
        &self,
        device_id: &str,
        address: &DeviceAddress,
        _credentials: &Credentials,
    ) -> cfgpush::Result<RecordingSession> {
        if device_id == self.unreachable {
            return Err(TransportError::Timeout(std::time::Duration::from_secs(30)).into());
        }
        assert!(address.host.starts_with("192.168.15."));
        Ok(RecordingSession {
            device_id: device_id.to_string(),
            pushed: self.pushed.clone(),
        })
    }
}

fn setup() -> (RunConfig, IntentDocument) {
    let config = RunConfig::from_toml_str(CONFIG).unwrap();
    let intents = IntentDocument::from_json_str(INTENT, config.resolve_flat_device()).unwrap();
    (config, intents)
}

#[test]
fn test_push_flow_with_unreachable_device() {
    let (config, intents) = setup();
    let pushed = Pushed::default();
    let orchestrator = Orchestrator::new(RecordingFactory {
        pushed: pushed.clone(),
        unreachable: "R2",
    });
    let credentials = Credentials::new("admin", "cisco", "");

    let results = tokio_test::block_on(orchestrator.run(&config.devices, &intents, &credentials));

    let statuses: Vec<_> = results.iter().map(|r| (r.device_id.as_str(), r.status)).collect();
    assert_eq!(
        statuses,
        vec![
            ("R1", PushStatus::Success),
            ("R2", PushStatus::ConnectFailure),
            ("ISP1", PushStatus::Success),
            ("ISP2", PushStatus::Skipped),
        ]
    );
    assert_eq!(results[1].stage, PushStage::PlanBuilt);
    assert_eq!(exit_code(&results), 1);

    // Each device receives exactly its plan
    let pushed = pushed.lock().unwrap();
    assert_eq!(pushed.len(), 2);
    let expected_r1 = CommandPlan::build("R1", intents.records("R1").unwrap()).unwrap();
    assert_eq!(pushed[0].0, "R1");
    assert_eq!(pushed[0].1, expected_r1.commands());
    assert!(pushed[0].1.contains(&"ip mtu 1476".to_string()));
    assert_eq!(pushed[1].0, "ISP1");
    assert!(pushed[1].1.contains(&"duplex full".to_string()));

    let table = summary_table(&results);
    assert!(table.contains("connect failure"));
    assert!(table.contains("4 device(s): 2 succeeded, 1 skipped, 1 failed"));
}

#[test]
fn test_plans_are_deterministic() {
    let (_, first) = setup();
    let (_, second) = setup();
    for device in ["R1", "R2", "ISP1"] {
        let a = CommandPlan::build(device, first.records(device).unwrap()).unwrap();
        let b = CommandPlan::build(device, second.records(device).unwrap()).unwrap();
        assert_eq!(a, b);
    }
}
