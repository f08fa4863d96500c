//! Integration tests for the `cfgpush` binary.
//!
//! Only paths that never open an SSH session are exercised: dry runs and
//! the configuration and intent errors that stop a run before any push.

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

const INTENT: &str = r#"{
    "R1": [
        {"interface": "Tunnel0", "ip_address": "172.16.0.1",
         "subnet_mask": "255.255.255.252", "description": "GRE to R2",
         "tunnel_src": "GigabitEthernet0/1", "tunnel_dst": "10.0.1.2"},
        {"router-id": "1.1.1.1", "ip_route": "10.0.0.2",
         "network_1": "172.16.0.0 0.0.0.3 area 0",
         "network_2": "192.168.1.0 0.0.0.255 area 0"}
    ],
    "R2": [
        {"interface": "GigabitEthernet0/0", "ip_address": "10.0.1.2",
         "subnet_mask": "255.255.255.252", "description": "to ISP2",
         "duplex": "full", "speed": 100}
    ]
}"#;

/// Build a command running in `dir` with env isolation.
fn cfgpush_cmd(dir: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("cfgpush");
    cmd.current_dir(dir)
        .env_remove("CFGPUSH_CONFIG")
        .env_remove("CFGPUSH_USERNAME")
        .env_remove("CFGPUSH_PASSWORD")
        .env_remove("CFGPUSH_ENABLE_SECRET")
        .env_remove("RUST_LOG");
    cmd
}

fn workspace(intent: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("device.json"), intent).unwrap();
    std::fs::write(
        dir.path().join("cfgpush.toml"),
        "[devices]\nR1 = \"192.168.15.150\"\nR2 = \"192.168.15.151\"\nISP1 = \"192.168.15.152\"\n",
    )
    .unwrap();
    dir
}

#[test]
fn test_help_flag() {
    let dir = tempfile::tempdir().unwrap();
    cfgpush_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run").and(predicate::str::contains("--device")));
}

#[test]
fn test_dry_run_prints_plans_in_roster_order() {
    let dir = workspace(INTENT);
    let output = cfgpush_cmd(dir.path())
        .arg("--dry-run")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let r1 = stdout.find("! R1").unwrap();
    let r2 = stdout.find("! R2").unwrap();
    assert!(r1 < r2);
    assert!(stdout.contains("interface Tunnel0\nip address 172.16.0.1 255.255.255.252\nbandwidth 1000\n"));
    assert!(stdout.contains("tunnel destination 10.0.1.2\nno shutdown\nip route 0.0.0.0 0.0.0.0 10.0.0.2\n"));
    assert!(stdout.contains("network 172.16.0.0 0.0.0.3 area 0\nnetwork 192.168.1.0 0.0.0.255 area 0\n"));
    assert!(stdout.contains("duplex full\nspeed 100\nno shutdown"));
    assert!(stdout.contains("! ISP1 (192.168.15.152): no intent, skipped"));
}

#[test]
fn test_dry_run_plan_error_exits_one() {
    let dir = workspace(r#"{"R1": [{"interface": "Gi0/1", "ip_address": "10.0.0.1"}]}"#);
    cfgpush_cmd(dir.path())
        .arg("--dry-run")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("subnet_mask"));
}

#[test]
fn test_device_flag_extends_roster() {
    let dir = workspace(INTENT);
    cfgpush_cmd(dir.path())
        .args(["--dry-run", "--device", "ISP2=192.168.15.153"])
        .assert()
        .success()
        .stdout(predicate::str::contains("! ISP2 (192.168.15.153): no intent, skipped"));
}

#[test]
fn test_malformed_intent_exits_two() {
    let dir = workspace("{ not json");
    cfgpush_cmd(dir.path())
        .arg("--dry-run")
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_malformed_intent_stops_before_push() {
    let dir = workspace("{ not json");
    cfgpush_cmd(dir.path())
        .env("CFGPUSH_USERNAME", "admin")
        .env("CFGPUSH_PASSWORD", "cisco")
        .env("CFGPUSH_ENABLE_SECRET", "enable")
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("malformed intent"));
}

#[test]
fn test_missing_intent_file_exits_two() {
    let dir = workspace(INTENT);
    cfgpush_cmd(dir.path())
        .args(["--dry-run", "--intent", "missing.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("missing.json"));
}

#[test]
fn test_empty_roster_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("device.json"), INTENT).unwrap();
    cfgpush_cmd(dir.path())
        .arg("--dry-run")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("roster is empty"));
}

#[test]
fn test_bad_device_flag_exits_two() {
    let dir = workspace(INTENT);
    cfgpush_cmd(dir.path())
        .args(["--dry-run", "--device", "R9"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("expected ID=ADDRESS"));
}

#[test]
fn test_flat_intent_binds_to_flat_device() {
    let dir = workspace(
        r#"[{"interface": "GigabitEthernet0/2", "ip_address": "10.9.9.1",
             "subnet_mask": "255.255.255.0", "description": "lab"}]"#,
    );
    cfgpush_cmd(dir.path())
        .args(["--dry-run", "--flat-device", "R2"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("! R2 (192.168.15.151): 5 commands")
                .and(predicate::str::contains("! R1 (192.168.15.150): no intent, skipped")),
        );
}
