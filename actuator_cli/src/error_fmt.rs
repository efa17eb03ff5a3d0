//! Human-readable error descriptions and structured JSON error formatting.

use actuator_core::error::{BuildError, HomingError};
use actuator_core::{FaultKind, Phase};
use serde_json::json;

use crate::home::unix_ms;

fn find<'a, T: std::error::Error + Send + Sync + 'static>(err: &'a eyre::Report) -> Option<&'a T> {
    err.downcast_ref::<T>()
        .or_else(|| err.chain().find_map(|e| e.downcast_ref::<T>()))
}

fn fault_text(phase: Phase, kind: FaultKind) -> String {
    let (causes, fix) = match kind {
        FaultKind::DebounceTimeout => (
            "A limit switch input is floating or chattering, or the settle count is too high for the debounce window.",
            "Check the switch wiring and pull resistors; raise timing.debounce_wait_max or lower timing.settle_count.",
        ),
        FaultKind::InvalidZone => (
            "Both switches read actuated at once: a shorted input, swapped active level, or a switch stuck closed.",
            "Verify pins.active_low and the wiring of both switches, then run `actuator self-check`.",
        ),
        FaultKind::MaxTimeout => (
            "The carriage did not reach the next switch edge in time: stalled drive, broken switch, or window too tight.",
            "Check the drive and the switch for this leg; widen the max of the matching [timing] window if travel is slow.",
        ),
        FaultKind::MinTimeout => (
            "A switch edge arrived sooner than physically plausible: switch bounce, a misplaced switch, or window too wide.",
            "Inspect the switch mounting; lower the min of the matching [timing] window if the mechanism is fast.",
        ),
    };
    format!(
        "What happened: Homing fault in {} ({kind}).\nLikely causes: {causes}\nHow to fix: {fix}",
        phase.name()
    )
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(be) = find::<BuildError>(err) {
        return match be {
            BuildError::MissingSwitches => {
                "What happened: No limit switches were provided to the homing engine.\nLikely causes: Switch inputs failed to initialize or were not wired into the builder.\nHow to fix: Ensure the switches are created successfully and passed via with_switches(...).".to_string()
            }
            BuildError::MissingActuator => {
                "What happened: No actuator drive was provided to the homing engine.\nLikely causes: Direction outputs failed to initialize or were not wired into the builder.\nHow to fix: Ensure the actuator is created successfully and passed via with_actuator(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the [timing] section.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(he) = find::<HomingError>(err) {
        return match he {
            HomingError::Fault { phase, kind } => fault_text(*phase, *kind),
            HomingError::Config(msg) => format!(
                "What happened: Configuration is invalid ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
            HomingError::HardwareFault(msg) => format!(
                "What happened: Hardware fault ({msg}).\nLikely causes: Lost GPIO access or a driver failure.\nHow to fix: Check wiring and power, ensure the process may access GPIO, then rerun."
            ),
            HomingError::Hardware(msg) => format!(
                "What happened: Hardware error ({msg}).\nLikely causes: A switch read or drive command failed.\nHow to fix: Re-run with --log-level=debug to see which capability failed."
            ),
            HomingError::Interrupted => "What happened: Homing was interrupted.\nLikely causes: Ctrl-C or a termination signal.\nHow to fix: Rerun `actuator home`; the actuator was commanded to stop.".to_string(),
            HomingError::Watchdog(ticks) => format!(
                "What happened: Homing did not finish within {ticks} ticks.\nLikely causes: Repeated retries or a max-ticks limit below one full homing run.\nHow to fix: Raise runner.max_ticks (or --max-ticks), or investigate the retried faults in the log."
            ),
        };
    }

    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("open gpio") {
        return "What happened: Failed to initialize GPIO pins.\nLikely causes: Incorrect pin numbers or insufficient GPIO permissions.\nHow to fix: Fix the [pins] values in the config; ensure the process has permission to access GPIO.".to_string();
    }

    if lower.contains("config") {
        return format!(
            "What happened: Could not load the configuration ({msg}).\nLikely causes: Missing file or TOML syntax error.\nHow to fix: Check the --config path and the TOML syntax."
        );
    }

    let cause = err
        .chain()
        .nth(1)
        .map(|src| format!(" Cause: {src}"))
        .unwrap_or_default();
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Homing faults exit with 3; every other error with 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match find::<HomingError>(err) {
        Some(HomingError::Fault { .. }) => 3,
        _ => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    let null = serde_json::Value::Null;
    let (status, phase, kind) = match find::<HomingError>(err) {
        Some(HomingError::Fault { phase, kind }) => {
            ("fault", json!(phase.name()), json!(kind.name()))
        }
        _ => ("error", null.clone(), null.clone()),
    };
    json!({
        "status": status,
        "ticks": null,
        "attempts": null,
        "x_to_y": null,
        "y_to_x": null,
        "zone": null,
        "fault_phase": phase,
        "fault_kind": kind,
        "message": humanize(err),
        "timestamp": unix_ms(),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::WrapErr;

    fn fault() -> eyre::Report {
        eyre::Report::new(HomingError::Fault {
            phase: Phase::ClearX,
            kind: FaultKind::MinTimeout,
        })
    }

    #[test]
    fn fault_maps_to_exit_three_even_when_wrapped() {
        let wrapped = Err::<(), _>(fault()).wrap_err("homing").unwrap_err();
        assert_eq!(exit_code_for_error(&wrapped), 3);
        assert_eq!(exit_code_for_error(&eyre::eyre!("boom")), 1);
    }

    #[test]
    fn json_names_phase_and_kind() {
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&fault())).unwrap();
        assert_eq!(v["status"], "fault");
        assert_eq!(v["fault_phase"], "clear_x");
        assert_eq!(v["fault_kind"], "MinTimeout");
        assert!(v["message"].as_str().unwrap().contains("What happened"));
    }

    #[test]
    fn build_error_is_humanized() {
        let e = eyre::Report::new(BuildError::MissingActuator);
        assert!(humanize(&e).contains("No actuator drive"));
    }
}
