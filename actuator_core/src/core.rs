//! The homing state machine (`HomingCore`).
//!
//! One `poll(tick)` performs at most one phase transition and never blocks.
//! Pacing is the caller's job: the tick is only compared against the tick
//! at which the current phase was entered.

use actuator_traits::{Actuator, Direction, LimitSwitches};
use eyre::WrapErr;

use crate::calibration::TravelCalibration;
use crate::config::{Ticks, TimingCfg, Window};
use crate::debounce::{DebounceResult, Debouncer, SwitchState};
use crate::error::Result;
use crate::hw_error::map_hw_error;
use crate::phase::{Fault, FaultKind, Phase, Zone};
use crate::session::HomingSession;
use crate::status::HomingStatus;
use crate::transition::{SwitchExpect, TransitionOutcome, check_transition};

use crate::transition::SwitchExpect::{Actuated, Masked, Rested};

/// Homing engine over statically dispatched capabilities.
pub struct HomingCore<S: LimitSwitches, A: Actuator> {
    pub(crate) switches: S,
    pub(crate) actuator: A,
    pub(crate) timing: TimingCfg,
    pub(crate) debouncer: Debouncer,
    pub(crate) session: HomingSession,
    pub(crate) direction: Direction,
}

impl<S: LimitSwitches, A: Actuator> core::fmt::Debug for HomingCore<S, A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HomingCore")
            .field("phase", &self.session.phase())
            .field("zone", &self.session.zone())
            .field("direction", &self.direction)
            .field("calibration", &self.session.calibration())
            .finish()
    }
}

impl<S: LimitSwitches, A: Actuator> HomingCore<S, A> {
    pub(crate) fn new(switches: S, actuator: A, timing: TimingCfg) -> Self {
        let debouncer = Debouncer::new(timing.settle_count);
        Self {
            switches,
            actuator,
            timing,
            debouncer,
            session: HomingSession::new(),
            direction: Direction::Stop,
        }
    }

    /// Abort whatever is running and begin a new homing run.
    ///
    /// Safe from any phase. Switch debounce history is kept.
    pub fn start(&mut self) {
        if let Err(e) = self.stop() {
            tracing::warn!(error = %e, "actuator stop failed on start");
        }
        self.session.restart();
        tracing::debug!("homing start");
    }

    /// Advance the state machine by one step.
    ///
    /// `Err` only carries capability failures; homing faults are reported as
    /// `HomingStatus::Error`.
    pub fn poll(&mut self, tick: Ticks) -> Result<HomingStatus> {
        let elapsed = self.session.tick(tick);
        match self.session.phase() {
            Phase::Reset => {
                self.drive(Direction::Stop)?;
                self.session.restart();
                self.session.enter(Phase::DebounceWait, tick);
            }
            Phase::DebounceWait => {
                let sample = self.sample()?;
                if elapsed > self.timing.debounce_wait_max {
                    self.session.fail(FaultKind::DebounceTimeout, tick);
                    self.drive(Direction::Stop)?;
                } else if sample.settled {
                    self.session.enter(Phase::ZoneDisambiguate, tick);
                }
            }
            Phase::ZoneDisambiguate => {
                let s = self.session.last_sample();
                match (s.x, s.y) {
                    (SwitchState::Rested, SwitchState::Rested) => {
                        self.session.enter(Phase::SeekY, tick);
                    }
                    (SwitchState::Rested, SwitchState::Actuated) => {
                        self.session.set_zone(Zone::CD);
                        self.session.enter(Phase::ReturnToX, tick);
                    }
                    (SwitchState::Actuated, SwitchState::Rested) => {
                        self.session.set_zone(Zone::BC);
                        self.session.enter(Phase::ClearX, tick);
                    }
                    (SwitchState::Actuated, SwitchState::Actuated) => {
                        self.session.fail(FaultKind::InvalidZone, tick);
                        self.drive(Direction::Stop)?;
                    }
                }
            }
            Phase::SeekY => {
                let max = self.timing.x_to_y_travel.max;
                self.seek(Direction::TowardY, max, elapsed, tick, Some(Phase::SeekX))?;
            }
            Phase::SeekX => {
                let max = self.timing.y_to_x_travel.max;
                self.seek(Direction::TowardX, max, elapsed, tick, None)?;
            }
            Phase::ReturnToX => {
                if elapsed < self.timing.y_to_x_travel.max {
                    self.drive(Direction::TowardX)?;
                    let s = self.sample()?;
                    if s.settled && (s.x, s.y) == (SwitchState::Actuated, SwitchState::Rested) {
                        self.session.set_zone(Zone::BC);
                        self.session.enter(Phase::ClearX, tick);
                        self.drive(Direction::Stop)?;
                    }
                } else {
                    self.session.fail(FaultKind::MaxTimeout, tick);
                    self.drive(Direction::Stop)?;
                }
            }
            Phase::ClearX => {
                let w = self.timing.x_clearance;
                if self.check((Rested, Rested), Direction::TowardY, w, elapsed, tick)? {
                    self.session.set_zone(Zone::C);
                    self.session.enter(Phase::MeasureXToY, tick);
                }
            }
            Phase::MeasureXToY => {
                let w = self.timing.x_to_y_travel;
                if self.check((Rested, Actuated), Direction::TowardY, w, elapsed, tick)? {
                    if self.session.calibration_mut().record_x_to_y(elapsed) {
                        tracing::info!(x_to_y = elapsed, "x→y travel measured");
                    } else {
                        tracing::warn!(x_to_y = elapsed, "x→y travel already recorded, keeping first value");
                    }
                    self.session.set_zone(Zone::CD);
                    self.session.enter(Phase::PassY, tick);
                }
            }
            Phase::PassY => {
                let w = self.timing.y_clearance;
                if self.check((Rested, Rested), Direction::TowardY, w, elapsed, tick)? {
                    self.session.set_zone(Zone::D);
                    self.session.enter(Phase::ReenterY, tick);
                    self.drive(Direction::Stop)?;
                }
            }
            Phase::ReenterY => {
                let w = self.timing.y_clearance;
                if self.check((Rested, Actuated), Direction::TowardX, w, elapsed, tick)? {
                    self.session.set_zone(Zone::CD);
                    self.session.enter(Phase::ClearY, tick);
                }
            }
            Phase::ClearY => {
                let w = self.timing.y_clearance;
                if self.check((Rested, Rested), Direction::TowardX, w, elapsed, tick)? {
                    self.session.set_zone(Zone::C);
                    self.session.enter(Phase::MeasureYToX, tick);
                }
            }
            Phase::MeasureYToX => {
                let w = self.timing.y_to_x_travel;
                if self.check((Actuated, Rested), Direction::TowardX, w, elapsed, tick)? {
                    if self.session.calibration_mut().record_y_to_x(elapsed) {
                        tracing::info!(y_to_x = elapsed, "y→x travel measured");
                    } else {
                        tracing::warn!(y_to_x = elapsed, "y→x travel already recorded, keeping first value");
                    }
                    self.session.set_zone(Zone::BC);
                    self.session.enter(Phase::PassX, tick);
                }
            }
            Phase::PassX => {
                let w = self.timing.x_clearance;
                if self.check((Rested, Rested), Direction::TowardX, w, elapsed, tick)? {
                    self.session.set_zone(Zone::B);
                    self.session.enter(Phase::ReenterX, tick);
                    self.drive(Direction::Stop)?;
                }
            }
            Phase::ReenterX => {
                let w = self.timing.x_clearance;
                if self.check((Actuated, Rested), Direction::TowardY, w, elapsed, tick)? {
                    self.session.set_zone(Zone::BC);
                    self.session.enter(Phase::LeaveX, tick);
                }
            }
            Phase::LeaveX => {
                let w = self.timing.x_clearance;
                if self.check((Rested, Rested), Direction::TowardY, w, elapsed, tick)? {
                    self.session.set_zone(Zone::C);
                    self.session.enter(Phase::MidpointSeek, tick);
                }
            }
            Phase::MidpointSeek => {
                let w = Window::new(
                    self.timing.x_to_y_travel.min,
                    self.session.calibration().midpoint_ticks(),
                );
                let (outcome, sample) = check_transition(
                    &mut self.debouncer,
                    &mut self.switches,
                    &mut self.actuator,
                    (Masked, Masked),
                    Direction::TowardY,
                    w,
                    elapsed,
                )?;
                self.direction = Direction::TowardY;
                self.session.set_sample(sample);
                // the ceiling is the goal here
                if outcome == TransitionOutcome::MaxTimeout {
                    self.session.enter(Phase::Parked, tick);
                    tracing::info!(
                        x_to_y = self.session.calibration().x_to_y,
                        y_to_x = self.session.calibration().y_to_x,
                        "parked at midpoint"
                    );
                    self.drive(Direction::Stop)?;
                }
            }
            Phase::Parked | Phase::FaultMax | Phase::FaultMin => {
                self.drive(Direction::Stop)?;
            }
        }
        Ok(self.session.status())
    }

    /// Stop the actuator.
    pub fn stop(&mut self) -> Result<()> {
        self.drive(Direction::Stop)
    }

    /// Sample both switches outside of a homing run.
    pub fn sample_switches(&mut self) -> Result<DebounceResult> {
        self.sample()
    }

    /// Forget switch debounce history.
    pub fn reset_debouncer(&mut self) {
        self.debouncer.reset();
    }

    pub fn status(&self) -> HomingStatus {
        self.session.status()
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    pub fn fault(&self) -> Option<Fault> {
        self.session.fault()
    }

    pub fn zone(&self) -> Zone {
        self.session.zone()
    }

    pub fn calibration(&self) -> TravelCalibration {
        self.session.calibration()
    }

    pub fn last_sample(&self) -> DebounceResult {
        self.session.last_sample()
    }

    /// Ticks since the current phase was entered, as of the last poll.
    pub fn elapsed(&self) -> Ticks {
        self.session.elapsed()
    }

    /// Last direction successfully commanded.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn timing(&self) -> &TimingCfg {
        &self.timing
    }

    pub fn session(&self) -> &HomingSession {
        &self.session
    }

    // ── Private helpers ──────────────────────────────────────────────────────

    fn drive(&mut self, direction: Direction) -> Result<()> {
        self.actuator
            .drive(direction)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err_with(|| format!("driving actuator {direction}"))?;
        self.direction = direction;
        Ok(())
    }

    fn sample(&mut self) -> Result<DebounceResult> {
        let sample = self.debouncer.sample(&mut self.switches)?;
        self.session.set_sample(sample);
        Ok(sample)
    }

    /// Seek phases: drive until a fresh settle shows exactly one switch
    /// actuated, or give up at `max`.
    fn seek(
        &mut self,
        direction: Direction,
        max: Ticks,
        elapsed: Ticks,
        tick: Ticks,
        fallback: Option<Phase>,
    ) -> Result<()> {
        if elapsed >= max {
            match fallback {
                Some(next) => self.session.enter(next, tick),
                None => self.session.fail(FaultKind::MaxTimeout, tick),
            }
            return self.drive(Direction::Stop);
        }
        self.drive(direction)?;
        let s = self.sample()?;
        if !s.settled {
            return Ok(());
        }
        match (s.x, s.y) {
            (SwitchState::Actuated, SwitchState::Rested) => {
                self.session.set_zone(Zone::BC);
                self.session.enter(Phase::ClearX, tick);
                self.drive(Direction::Stop)?;
            }
            (SwitchState::Rested, SwitchState::Actuated) => {
                self.session.set_zone(Zone::CD);
                self.session.enter(Phase::ReturnToX, tick);
                self.drive(Direction::Stop)?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Run one transition check; timeouts become faults. Returns `true` once
    /// the expected state is reached.
    ///
    /// The fault is recorded before the stop is sent, so a failed stop still
    /// leaves the machine terminal.
    fn check(
        &mut self,
        expect: (SwitchExpect, SwitchExpect),
        direction: Direction,
        window: Window,
        elapsed: Ticks,
        tick: Ticks,
    ) -> Result<bool> {
        let (outcome, sample) = check_transition(
            &mut self.debouncer,
            &mut self.switches,
            &mut self.actuator,
            expect,
            direction,
            window,
            elapsed,
        )?;
        self.direction = direction;
        self.session.set_sample(sample);
        match outcome {
            TransitionOutcome::Reached => Ok(true),
            TransitionOutcome::Waiting => Ok(false),
            TransitionOutcome::MaxTimeout => {
                self.session.fail(FaultKind::MaxTimeout, tick);
                self.drive(Direction::Stop)?;
                Ok(false)
            }
            TransitionOutcome::MinTimeout => {
                self.session.fail(FaultKind::MinTimeout, tick);
                self.drive(Direction::Stop)?;
                Ok(false)
            }
        }
    }
}
