//! Homing and self-check commands: config mapping, hardware assembly, output.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use actuator_config::Config;
use actuator_core::error::Result as CoreResult;
use actuator_core::{
    FaultKind, HomingError, HomingReport, Phase, RunParams, TimingCfg, build_homing,
};
use actuator_traits::{Actuator, Clock, LimitSwitches};
use eyre::WrapErr;
use serde_json::json;

use crate::cli::json_mode;
use crate::trace::TraceWriter;

#[derive(Debug, Default)]
pub struct HomeOpts {
    pub retries: Option<u32>,
    pub trace: Option<PathBuf>,
    pub max_ticks: Option<u64>,
}

pub fn unix_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
}

fn run_params(cfg: &Config, opts: &HomeOpts) -> RunParams {
    RunParams {
        tick_period: actuator_core::util::tick_period(cfg.runner.tick_rate_hz),
        max_retries: opts.retries.unwrap_or(cfg.runner.max_retries),
        max_ticks: opts.max_ticks.or(cfg.runner.max_ticks),
    }
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn sim_track(cfg: &Config) -> actuator_hardware::SimTrack {
    let s = &cfg.sim;
    let layout = actuator_hardware::TrackLayout {
        length: s.length,
        x_switch: s.x_switch,
        y_switch: s.y_switch,
        start: s.start,
    };
    let faults = actuator_hardware::SimFaults {
        stuck_x: s.stuck_x.map(|l| l.is_actuated()),
        stuck_y: s.stuck_y.map(|l| l.is_actuated()),
        bounce_reads: s.bounce_reads,
    };
    tracing::info!(?layout, ?faults, "using simulated track");
    actuator_hardware::SimTrack::with_faults(layout, faults)
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn open_gpio(
    cfg: &Config,
) -> CoreResult<(
    actuator_hardware::gpio::GpioSwitches,
    actuator_hardware::gpio::GpioActuator,
)> {
    let p = &cfg.pins;
    let pins = actuator_hardware::gpio::PinMap {
        limit_x: p.limit_x,
        limit_y: p.limit_y,
        dir_x_to_y: p.dir_x_to_y,
        dir_y_to_x: p.dir_y_to_x,
        active_low: p.active_low,
    };
    actuator_hardware::gpio::open(pins).wrap_err("open GPIO pins")
}

/// Home the actuator on whichever backend this binary was built with.
pub fn run_home(cfg: &Config, opts: &HomeOpts, shutdown: &AtomicBool) -> CoreResult<HomingReport> {
    let timing: TimingCfg = (&cfg.timing).into();
    let params = run_params(cfg, opts);
    let trace = opts
        .trace
        .as_deref()
        .map(TraceWriter::create)
        .transpose()?;

    #[cfg(all(feature = "hardware", target_os = "linux"))]
    {
        let (switches, actuator) = open_gpio(cfg)?;
        let clock = actuator_traits::MonotonicClock::new();
        home_with(switches, actuator, timing, &clock, &params, shutdown, trace)
    }
    #[cfg(not(all(feature = "hardware", target_os = "linux")))]
    {
        let track = sim_track(cfg);
        let clock = track.clock(params.tick_period);
        home_with(
            track.switches(),
            track.actuator(),
            timing,
            &clock,
            &params,
            shutdown,
            trace,
        )
    }
}

fn home_with<S, A, C>(
    switches: S,
    actuator: A,
    timing: TimingCfg,
    clock: &C,
    params: &RunParams,
    shutdown: &AtomicBool,
    mut trace: Option<TraceWriter>,
) -> CoreResult<HomingReport>
where
    S: LimitSwitches,
    A: Actuator,
    C: Clock,
{
    let mut core = build_homing(switches, actuator, timing)?;
    let mut trace_err: Option<eyre::Report> = None;
    let result = actuator_core::run(&mut core, clock, params, Some(shutdown), |rec| {
        if trace_err.is_some() {
            return;
        }
        if let Some(t) = trace.as_mut()
            && let Err(e) = t.write(rec)
        {
            tracing::warn!(error = %e, "trace disabled after write failure");
            trace_err = Some(e);
        }
    });
    if let Some(t) = trace {
        t.finish()?;
    }
    let report = result?;
    if let Some(e) = trace_err {
        return Err(e);
    }
    Ok(report)
}

pub fn print_report(report: &HomingReport, duration_ms: u64) {
    if json_mode() {
        let line = json!({
            "status": "ok",
            "ticks": report.ticks,
            "attempts": report.attempts,
            "x_to_y": report.calibration.x_to_y,
            "y_to_x": report.calibration.y_to_x,
            "zone": report.zone.name(),
            "fault_phase": serde_json::Value::Null,
            "fault_kind": serde_json::Value::Null,
            "duration_ms": duration_ms,
            "timestamp": unix_ms(),
        });
        println!("{line}");
    } else {
        let fmt_ticks = |t: Option<u64>| t.map_or_else(|| "-".to_string(), |v| v.to_string());
        println!(
            "Homing complete in {} ticks ({} attempt{}).",
            report.ticks,
            report.attempts,
            if report.attempts == 1 { "" } else { "s" }
        );
        println!(
            "Travel x→y: {} ticks, y→x: {} ticks. Parked in zone {}.",
            fmt_ticks(report.calibration.x_to_y),
            fmt_ticks(report.calibration.y_to_x),
            report.zone
        );
    }
}

/// Run `home` end to end and print the result.
pub fn home(cfg: &Config, opts: &HomeOpts, shutdown: &AtomicBool) -> CoreResult<()> {
    let started = Instant::now();
    let report = run_home(cfg, opts, shutdown)?;
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    print_report(&report, duration_ms);
    Ok(())
}

/// Sample the switches until both settle, then print their state.
pub fn self_check(cfg: &Config) -> CoreResult<()> {
    let timing: TimingCfg = (&cfg.timing).into();
    let period = actuator_core::util::tick_period(cfg.runner.tick_rate_hz);

    #[cfg(all(feature = "hardware", target_os = "linux"))]
    let (mut core, clock) = {
        let (switches, actuator) = open_gpio(cfg)?;
        (
            build_homing(switches, actuator, timing)?,
            actuator_traits::MonotonicClock::new(),
        )
    };
    #[cfg(not(all(feature = "hardware", target_os = "linux")))]
    let (mut core, clock) = {
        let track = sim_track(cfg);
        let clock = track.clock(period);
        (build_homing(track.switches(), track.actuator(), timing)?, clock)
    };

    core.stop()?;
    let limit = core.timing().debounce_wait_max;
    let mut deadline = clock.now();
    for n in 1..=limit {
        let sample = core.sample_switches()?;
        if sample.settled {
            tracing::info!(x = %sample.x, y = %sample.y, samples = n, "switches settled");
            if json_mode() {
                let line = json!({
                    "status": "ok",
                    "x": sample.x.as_str(),
                    "y": sample.y.as_str(),
                    "samples": n,
                    "timestamp": unix_ms(),
                });
                println!("{line}");
            } else {
                println!("Limit X: {}", sample.x);
                println!("Limit Y: {}", sample.y);
                println!("Self-check OK ({n} samples).");
            }
            return Ok(());
        }
        deadline += period;
        clock.sleep_until(deadline);
    }
    Err(eyre::Report::new(HomingError::Fault {
        phase: Phase::DebounceWait,
        kind: FaultKind::DebounceTimeout,
    }))
    .wrap_err("limit switches did not settle during self-check")
}
