use assert_cmd::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

fn write_config(dir: &tempfile::TempDir, sim: &str) -> PathBuf {
    let path = dir.path().join("cfg.toml");
    fs::write(&path, format!("[sim]\nstart = 500\n{sim}\n")).unwrap();
    path
}

fn last_json_line(stdout: &[u8]) -> serde_json::Value {
    let text = String::from_utf8_lossy(stdout);
    let line = text
        .lines()
        .rev()
        .find(|l| l.trim_start().starts_with('{'))
        .expect("no JSON line on stdout");
    serde_json::from_str(line).expect("stdout line is valid JSON")
}

/// Validate the report schema for a successful homing run.
#[rstest]
fn json_success_schema() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "");

    let out = Command::cargo_bin("actuator")
        .unwrap()
        .args(["--json", "--log-level", "warn", "--config"])
        .arg(&cfg)
        .arg("home")
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let v = last_json_line(&out.stdout);
    assert_eq!(v["status"], "ok");
    assert_eq!(v["ticks"], 3250);
    assert_eq!(v["attempts"], 1);
    assert_eq!(v["x_to_y"], 699);
    assert_eq!(v["y_to_x"], 699);
    assert_eq!(v["zone"], "C");
    assert!(v["fault_phase"].is_null());
    assert!(v["fault_kind"].is_null());
    assert!(v["duration_ms"].is_u64());
    assert!(v["timestamp"].is_i64());
}

#[rstest]
#[case("stuck_y = \"actuated\"", "return_to_x", "MaxTimeout")]
#[case("stuck_x = \"actuated\"\nstuck_y = \"actuated\"", "zone_disambiguate", "InvalidZone")]
fn json_fault_schema(#[case] sim: &str, #[case] phase: &str, #[case] kind: &str) {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, sim);

    let out = Command::cargo_bin("actuator")
        .unwrap()
        .args(["--json", "--log-level", "error", "--config"])
        .arg(&cfg)
        .arg("home")
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(3));

    let v = last_json_line(&out.stdout);
    assert_eq!(v["status"], "fault");
    assert_eq!(v["fault_phase"], phase);
    assert_eq!(v["fault_kind"], kind);
    assert!(v["ticks"].is_null());
    assert!(v["message"].as_str().unwrap().contains("What happened"));
}

#[test]
fn json_self_check_reports_levels() {
    let dir = tempdir().unwrap();
    // start 100 sits inside the X band
    let path = dir.path().join("x.toml");
    fs::write(&path, "[sim]\nstart = 100\n").unwrap();

    let out = Command::cargo_bin("actuator")
        .unwrap()
        .args(["--json", "--log-level", "warn", "--config"])
        .arg(&path)
        .arg("self-check")
        .output()
        .unwrap();
    assert!(out.status.success());
    let v = last_json_line(&out.stdout);
    assert_eq!(v["x"], "actuated");
    assert_eq!(v["y"], "rested");
}
