use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// Sim rig matching the defaults, spelled out so the test does not depend on them
fn write_config(dir: &tempfile::TempDir, extra_sim: &str) -> PathBuf {
    let toml = format!(
        r#"
[timing]
x_to_y_travel = [1, 2303]
y_to_x_travel = {{ min = 1, max = 2815 }}
x_clearance = [1, 1023]
y_clearance = [1, 1023]
debounce_wait_max = 15
settle_count = 3

[runner]
tick_rate_hz = 1000

[sim]
length = 1000
x_switch = [50, 150]
y_switch = [850, 950]
start = 500
{extra_sim}
"#
    );
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

#[rstest]
#[case(&["--help"], "", 0, "Usage:", "stdout")]
#[case(&["home"], "", 0, "Homing complete", "stdout")]
#[case(&["self-check"], "", 0, "Self-check OK", "stdout")]
#[case(&["home", "--retries"], "", 2, "value is required", "stderr")]
#[case(&["frobnicate"], "", 2, "unrecognized subcommand", "stderr")]
#[case(&["home"], "stuck_y = \"actuated\"", 3, "return_to_x", "stderr")]
#[case(&["home"], "stuck_x = \"actuated\"\nstuck_y = \"actuated\"", 3, "Both switches read actuated", "stderr")]
#[case(&["home", "--max-ticks", "100"], "", 1, "within 100 ticks", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] extra_sim: &str,
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, extra_sim);

    let mut cmd = Command::cargo_bin("actuator").unwrap();
    cmd.arg("--config").arg(&cfg).args(args);

    let assert = cmd.assert().code(exit_code);
    let pred = predicate::str::contains(needle);
    if stream == "stdout" {
        assert.stdout(pred);
    } else {
        assert.stderr(pred);
    }
}

#[test]
fn invalid_timing_window_is_a_config_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[timing]\nx_clearance = [10, 5]\n").unwrap();

    Command::cargo_bin("actuator")
        .unwrap()
        .arg("--config")
        .arg(&path)
        .arg("home")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("timing.x_clearance"));
}

#[test]
fn missing_config_file_fails_cleanly() {
    let dir = tempdir().unwrap();
    Command::cargo_bin("actuator")
        .unwrap()
        .arg("--config")
        .arg(dir.path().join("nope.toml"))
        .arg("home")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("What happened"));
}

#[test]
fn runs_on_builtin_defaults_without_config() {
    Command::cargo_bin("actuator")
        .unwrap()
        .arg("home")
        .assert()
        .success()
        .stdout(predicate::str::contains("Parked in zone C"));
}

#[test]
fn retries_do_not_rescue_a_stuck_switch() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "stuck_y = \"actuated\"");
    Command::cargo_bin("actuator")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .args(["home", "--retries", "2"])
        .assert()
        .code(3);
}
