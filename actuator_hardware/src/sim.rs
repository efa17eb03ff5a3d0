//! Simulated two-switch actuator track.
//!
//! The track is a line of `length` position units with the X end at 0 and the
//! Y end at `length`. Each limit switch is actuated while the carriage sits
//! inside its band (inclusive). The carriage moves one unit per simulated
//! tick in the commanded direction and stops at either mechanical end.
//!
//! All handles (`SimSwitches`, `SimActuator`, `SimClock`) share one state, so
//! sleeping on the clock is what moves the carriage.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use actuator_traits::{Actuator, Clock, Direction, HwResult, LimitSwitches};

use crate::error::HwError;

/// Geometry of the simulated track, in position units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackLayout {
    pub length: u32,
    /// Inclusive band where the X switch reads actuated.
    pub x_switch: (u32, u32),
    /// Inclusive band where the Y switch reads actuated.
    pub y_switch: (u32, u32),
    /// Initial carriage position.
    pub start: u32,
}

impl Default for TrackLayout {
    fn default() -> Self {
        Self {
            length: 1000,
            x_switch: (50, 150),
            y_switch: (850, 950),
            start: 500,
        }
    }
}

impl TrackLayout {
    /// Position halfway between the inner edges of the two switch bands.
    pub fn midpoint(&self) -> u32 {
        self.x_switch.1 + (self.y_switch.0 - self.x_switch.1) / 2
    }
}

/// Fault injection for the simulated switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimFaults {
    /// Force the X switch to a fixed reading (disconnected or shorted input).
    pub stuck_x: Option<bool>,
    /// Force the Y switch to a fixed reading.
    pub stuck_y: Option<bool>,
    /// Number of alternating reads emitted after every physical edge.
    pub bounce_reads: u8,
}

#[derive(Debug)]
struct Contact {
    last_physical: bool,
    bounce_left: u8,
}

impl Contact {
    fn new(physical: bool) -> Self {
        Self {
            last_physical: physical,
            bounce_left: 0,
        }
    }

    fn read(&mut self, physical: bool, bounce_reads: u8) -> bool {
        if physical != self.last_physical {
            self.last_physical = physical;
            self.bounce_left = bounce_reads;
        }
        if self.bounce_left > 0 {
            self.bounce_left -= 1;
            // odd remaining count reports the stale level
            if self.bounce_left % 2 == 1 {
                return !physical;
            }
        }
        physical
    }
}

#[derive(Debug)]
struct TrackState {
    layout: TrackLayout,
    faults: SimFaults,
    position: u32,
    direction: Direction,
    commands: Vec<Direction>,
    ticks: u64,
    x: Contact,
    y: Contact,
    fail_reads: bool,
}

impl TrackState {
    fn x_physical(&self) -> bool {
        let (lo, hi) = self.layout.x_switch;
        (lo..=hi).contains(&self.position)
    }

    fn y_physical(&self) -> bool {
        let (lo, hi) = self.layout.y_switch;
        (lo..=hi).contains(&self.position)
    }

    fn advance(&mut self, ticks: u64) {
        if ticks == 0 {
            return;
        }
        self.ticks = self.ticks.saturating_add(ticks);
        let step = u32::try_from(ticks).unwrap_or(u32::MAX);
        self.position = match self.direction {
            Direction::TowardY => self.position.saturating_add(step).min(self.layout.length),
            Direction::TowardX => self.position.saturating_sub(step),
            Direction::Stop => self.position,
        };
    }
}

/// Shared handle to a simulated track.
#[derive(Debug, Clone)]
pub struct SimTrack {
    state: Rc<RefCell<TrackState>>,
}

impl SimTrack {
    pub fn new(layout: TrackLayout) -> Self {
        Self::with_faults(layout, SimFaults::default())
    }

    pub fn with_faults(layout: TrackLayout, faults: SimFaults) -> Self {
        let position = layout.start.min(layout.length);
        let mut state = TrackState {
            layout,
            faults,
            position,
            direction: Direction::Stop,
            commands: Vec::new(),
            ticks: 0,
            x: Contact::new(false),
            y: Contact::new(false),
            fail_reads: false,
        };
        state.x = Contact::new(state.x_physical());
        state.y = Contact::new(state.y_physical());
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    pub fn switches(&self) -> SimSwitches {
        SimSwitches {
            track: self.clone(),
        }
    }

    pub fn actuator(&self) -> SimActuator {
        SimActuator {
            track: self.clone(),
        }
    }

    /// Clock whose sleeps advance the carriage by one unit per `tick_period`.
    pub fn clock(&self, tick_period: Duration) -> SimClock {
        SimClock {
            track: self.clone(),
            tick_period: tick_period.max(Duration::from_nanos(1)),
            origin: Instant::now(),
            elapsed: Cell::new(Duration::ZERO),
            carry: Cell::new(Duration::ZERO),
        }
    }

    /// Move the carriage for `ticks` ticks in the current direction.
    pub fn advance(&self, ticks: u64) {
        self.state.borrow_mut().advance(ticks);
    }

    pub fn position(&self) -> u32 {
        self.state.borrow().position
    }

    pub fn direction(&self) -> Direction {
        self.state.borrow().direction
    }

    pub fn layout(&self) -> TrackLayout {
        self.state.borrow().layout
    }

    /// Ticks simulated so far.
    pub fn ticks(&self) -> u64 {
        self.state.borrow().ticks
    }

    /// Every direction change the actuator received, in order.
    pub fn commands(&self) -> Vec<Direction> {
        self.state.borrow().commands.clone()
    }

    pub fn set_faults(&self, faults: SimFaults) {
        self.state.borrow_mut().faults = faults;
    }

    /// Make every following switch read fail.
    pub fn fail_reads(&self, fail: bool) {
        self.state.borrow_mut().fail_reads = fail;
    }
}

/// Limit switch inputs of a `SimTrack`.
#[derive(Debug, Clone)]
pub struct SimSwitches {
    track: SimTrack,
}

impl LimitSwitches for SimSwitches {
    fn read_x(&mut self) -> HwResult<bool> {
        let mut st = self.track.state.borrow_mut();
        if st.fail_reads {
            return Err(Box::new(HwError::Simulated("limit switch X read failed")));
        }
        let physical = st.faults.stuck_x.unwrap_or_else(|| st.x_physical());
        let bounce = st.faults.bounce_reads;
        Ok(st.x.read(physical, bounce))
    }

    fn read_y(&mut self) -> HwResult<bool> {
        let mut st = self.track.state.borrow_mut();
        if st.fail_reads {
            return Err(Box::new(HwError::Simulated("limit switch Y read failed")));
        }
        let physical = st.faults.stuck_y.unwrap_or_else(|| st.y_physical());
        let bounce = st.faults.bounce_reads;
        Ok(st.y.read(physical, bounce))
    }
}

/// Direction drive of a `SimTrack`.
#[derive(Debug, Clone)]
pub struct SimActuator {
    track: SimTrack,
}

impl Actuator for SimActuator {
    fn drive(&mut self, direction: Direction) -> HwResult<()> {
        let mut st = self.track.state.borrow_mut();
        if st.direction != direction {
            tracing::trace!(from = %st.direction, to = %direction, position = st.position, "sim drive");
            st.direction = direction;
            st.commands.push(direction);
        }
        Ok(())
    }
}

/// Simulated clock: sleeping advances both time and the carriage.
#[derive(Debug)]
pub struct SimClock {
    track: SimTrack,
    tick_period: Duration,
    origin: Instant,
    elapsed: Cell<Duration>,
    carry: Cell<Duration>,
}

impl Clock for SimClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed.get()
    }

    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        self.elapsed.set(self.elapsed.get().saturating_add(d));
        let total = self.carry.get().saturating_add(d);
        let period_ns = self.tick_period.as_nanos();
        let ticks = total.as_nanos() / period_ns;
        let rem = total.as_nanos() % period_ns;
        self.carry.set(Duration::from_nanos(u64::try_from(rem).unwrap_or(0)));
        self.track.advance(u64::try_from(ticks).unwrap_or(u64::MAX));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carriage_moves_and_clamps_at_ends() {
        let track = SimTrack::new(TrackLayout {
            start: 995,
            ..TrackLayout::default()
        });
        let mut act = track.actuator();
        act.drive(Direction::TowardY).unwrap();
        track.advance(20);
        assert_eq!(track.position(), 1000);
        act.drive(Direction::TowardX).unwrap();
        track.advance(2000);
        assert_eq!(track.position(), 0);
    }

    #[test]
    fn switches_follow_bands() {
        let track = SimTrack::new(TrackLayout {
            start: 100,
            ..TrackLayout::default()
        });
        let mut sw = track.switches();
        assert!(sw.read_x().unwrap());
        assert!(!sw.read_y().unwrap());
    }

    #[test]
    fn repeated_drive_records_one_command() {
        let track = SimTrack::new(TrackLayout::default());
        let mut act = track.actuator();
        act.drive(Direction::TowardX).unwrap();
        act.drive(Direction::TowardX).unwrap();
        act.stop().unwrap();
        assert_eq!(track.commands(), vec![Direction::TowardX, Direction::Stop]);
    }

    #[test]
    fn bounce_alternates_then_settles() {
        let track = SimTrack::with_faults(
            TrackLayout {
                start: 48,
                ..TrackLayout::default()
            },
            SimFaults {
                bounce_reads: 3,
                ..SimFaults::default()
            },
        );
        let mut act = track.actuator();
        let mut sw = track.switches();
        assert!(!sw.read_x().unwrap());
        act.drive(Direction::TowardY).unwrap();
        track.advance(2);
        let reads: Vec<bool> = (0..5).map(|_| sw.read_x().unwrap()).collect();
        assert_eq!(reads, vec![true, false, true, true, true]);
    }

    #[test]
    fn clock_sleep_accumulates_partial_ticks() {
        let track = SimTrack::new(TrackLayout::default());
        let clock = track.clock(Duration::from_millis(1));
        track.actuator().drive(Direction::TowardY).unwrap();
        clock.sleep(Duration::from_micros(600));
        assert_eq!(track.position(), 500);
        clock.sleep(Duration::from_micros(600));
        assert_eq!(track.position(), 501);
        assert_eq!(clock.ms_since(clock.origin), 1);
    }
}
