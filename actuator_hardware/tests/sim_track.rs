use std::time::Duration;

use actuator_hardware::{SimFaults, SimTrack, TrackLayout};
use actuator_traits::{Actuator, Clock, Direction, LimitSwitches};
use rstest::rstest;

#[rstest]
#[case(40, false, false)]
#[case(50, true, false)]
#[case(150, true, false)]
#[case(500, false, false)]
#[case(850, false, true)]
#[case(960, false, false)]
fn switch_bands_are_inclusive(#[case] start: u32, #[case] x: bool, #[case] y: bool) {
    let track = SimTrack::new(TrackLayout {
        start,
        ..TrackLayout::default()
    });
    let mut sw = track.switches();
    assert_eq!(sw.read_x().unwrap(), x, "x at {start}");
    assert_eq!(sw.read_y().unwrap(), y, "y at {start}");
}

#[rstest]
fn stuck_switch_ignores_position() {
    let track = SimTrack::with_faults(
        TrackLayout::default(),
        SimFaults {
            stuck_y: Some(true),
            ..SimFaults::default()
        },
    );
    let mut sw = track.switches();
    assert!(sw.read_y().unwrap());
    assert!(!sw.read_x().unwrap());
}

#[rstest]
fn clock_paces_carriage_per_tick_period() {
    let track = SimTrack::new(TrackLayout::default());
    let clock = track.clock(Duration::from_micros(250));
    let mut act = track.actuator();
    act.drive(Direction::TowardX).unwrap();
    let t0 = clock.now();
    clock.sleep_until(t0 + Duration::from_millis(10));
    assert_eq!(track.position(), 460);
    assert_eq!(track.ticks(), 40);
}

#[rstest]
fn failing_reads_surface_as_errors() {
    let track = SimTrack::new(TrackLayout::default());
    track.fail_reads(true);
    let err = track.switches().read_x().expect_err("read should fail");
    assert!(err.to_string().contains("simulated fault"));
}

#[rstest]
fn midpoint_sits_between_inner_band_edges() {
    assert_eq!(TrackLayout::default().midpoint(), 500);
}
