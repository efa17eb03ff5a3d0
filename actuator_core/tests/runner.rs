use std::sync::atomic::AtomicBool;
use std::time::Duration;

use actuator_core::{
    FaultKind, Homing, HomingError, HomingStatus, Phase, RunParams, TickRecord, TimingCfg,
    build_homing, run,
};
use actuator_hardware::{SimFaults, SimTrack, TrackLayout};
use actuator_traits::Direction;

const PERIOD: Duration = Duration::from_micros(250);

fn params() -> RunParams {
    RunParams {
        tick_period: PERIOD,
        max_retries: 0,
        max_ticks: Some(50_000),
    }
}

fn homing_error(err: &eyre::Report) -> &HomingError {
    err.chain()
        .find_map(|e| e.downcast_ref::<HomingError>())
        .expect("typed error in chain")
}

#[test]
fn runs_to_success_on_sim_clock() {
    let track = SimTrack::new(TrackLayout::default());
    let clock = track.clock(PERIOD);
    let mut homing = Homing::builder()
        .with_switches(track.switches())
        .with_actuator(track.actuator())
        .build()
        .expect("build");

    let mut records: Vec<TickRecord> = Vec::new();
    let report = run(&mut homing, &clock, &params(), None, |r| records.push(*r)).expect("run");

    assert_eq!(report.attempts, 1);
    assert_eq!(report.ticks, 3250);
    assert_eq!(report.total_ticks, 3251);
    assert_eq!(report.calibration.x_to_y, Some(699));
    assert_eq!(records.len(), 3251);
    let last = records.last().expect("records");
    assert_eq!(last.status, HomingStatus::Success);
    assert_eq!(last.phase, Phase::Parked);
    assert_eq!(last.direction, Direction::Stop);
    assert!(records.iter().any(|r| r.direction == Direction::TowardX));
    assert!(track.position().abs_diff(500) <= 10);
}

#[test]
fn fault_without_retries_is_reported() {
    let track = SimTrack::with_faults(
        TrackLayout::default(),
        SimFaults {
            stuck_x: Some(true),
            stuck_y: Some(true),
            ..SimFaults::default()
        },
    );
    let clock = track.clock(PERIOD);
    let mut core =
        build_homing(track.switches(), track.actuator(), TimingCfg::default()).expect("build");
    let err = run(&mut core, &clock, &params(), None, |_| {}).expect_err("must fault");
    match homing_error(&err) {
        HomingError::Fault { phase, kind } => {
            assert_eq!(*phase, Phase::ZoneDisambiguate);
            assert_eq!(*kind, FaultKind::InvalidZone);
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn retries_restart_the_engine() {
    let track = SimTrack::with_faults(
        TrackLayout::default(),
        SimFaults {
            stuck_x: Some(true),
            stuck_y: Some(true),
            ..SimFaults::default()
        },
    );
    let clock = track.clock(PERIOD);
    let mut core =
        build_homing(track.switches(), track.actuator(), TimingCfg::default()).expect("build");
    let p = RunParams {
        max_retries: 2,
        ..params()
    };
    let mut attempts_seen = Vec::new();
    let err = run(&mut core, &clock, &p, None, |r| {
        if attempts_seen.last() != Some(&r.attempt) {
            attempts_seen.push(r.attempt);
        }
    })
    .expect_err("must fault");
    assert_eq!(attempts_seen, vec![1, 2, 3]);
    assert!(matches!(homing_error(&err), HomingError::Fault { .. }));
}

#[test]
fn retry_recovers_after_transient_fault() {
    let track = SimTrack::with_faults(
        TrackLayout::default(),
        SimFaults {
            stuck_x: Some(true),
            stuck_y: Some(true),
            ..SimFaults::default()
        },
    );
    let clock = track.clock(PERIOD);
    let mut core =
        build_homing(track.switches(), track.actuator(), TimingCfg::default()).expect("build");
    let p = RunParams {
        max_retries: 1,
        ..params()
    };
    let fixer = track.clone();
    let report = run(&mut core, &clock, &p, None, |r| {
        if r.status.is_terminal() {
            fixer.set_faults(SimFaults::default());
        }
    })
    .expect("second attempt succeeds");
    assert_eq!(report.attempts, 2);
    assert_eq!(report.calibration.y_to_x, Some(699));
}

#[test]
fn shutdown_flag_interrupts_and_stops() {
    let track = SimTrack::new(TrackLayout::default());
    let clock = track.clock(PERIOD);
    let mut core =
        build_homing(track.switches(), track.actuator(), TimingCfg::default()).expect("build");
    let flag = AtomicBool::new(false);
    let err = run(&mut core, &clock, &params(), Some(&flag), |r| {
        if r.tick == 100 {
            flag.store(true, std::sync::atomic::Ordering::Relaxed);
        }
    })
    .expect_err("interrupted");
    assert!(matches!(homing_error(&err), HomingError::Interrupted));
    assert_eq!(track.direction(), Direction::Stop);
}

#[test]
fn watchdog_bounds_total_polls() {
    let track = SimTrack::new(TrackLayout::default());
    let clock = track.clock(PERIOD);
    let mut core =
        build_homing(track.switches(), track.actuator(), TimingCfg::default()).expect("build");
    let p = RunParams {
        max_ticks: Some(200),
        ..params()
    };
    let mut polls = 0u64;
    let err = run(&mut core, &clock, &p, None, |_| polls += 1).expect_err("watchdog");
    assert!(matches!(homing_error(&err), HomingError::Watchdog(200)));
    assert_eq!(polls, 200);
    assert_eq!(track.direction(), Direction::Stop);
}

#[test]
fn capability_error_stops_the_run() {
    let track = SimTrack::new(TrackLayout::default());
    let clock = track.clock(PERIOD);
    let mut core =
        build_homing(track.switches(), track.actuator(), TimingCfg::default()).expect("build");
    track.fail_reads(true);
    let err = run(&mut core, &clock, &params(), None, |_| {}).expect_err("io error");
    assert!(matches!(homing_error(&err), HomingError::HardwareFault(_)));
    assert!(format!("{err:#}").contains("homing poll at tick 1"));
}
