//! Host super-loop: paces `poll` with a `Clock`, applies the retry policy and
//! reports per-tick telemetry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use actuator_traits::{Actuator, Clock, Direction, LimitSwitches};
use eyre::WrapErr;

use crate::builder::Homing;
use crate::calibration::TravelCalibration;
use crate::config::Ticks;
use crate::core::HomingCore;
use crate::debounce::{DebounceResult, SwitchState};
use crate::error::{HomingError, Result};
use crate::phase::{Fault, FaultKind, Phase, Zone};
use crate::status::HomingStatus;

/// What the runner needs from a homing engine. Implemented by both the
/// boxed `Homing` and the generic `HomingCore`.
pub trait HomingEngine {
    fn start(&mut self);
    fn poll(&mut self, tick: Ticks) -> Result<HomingStatus>;
    fn stop(&mut self) -> Result<()>;
    fn phase(&self) -> Phase;
    fn fault(&self) -> Option<Fault>;
    fn zone(&self) -> Zone;
    fn calibration(&self) -> TravelCalibration;
    fn last_sample(&self) -> DebounceResult;
    fn direction(&self) -> Direction;
}

impl<S: LimitSwitches, A: Actuator> HomingEngine for HomingCore<S, A> {
    fn start(&mut self) {
        HomingCore::start(self);
    }
    fn poll(&mut self, tick: Ticks) -> Result<HomingStatus> {
        HomingCore::poll(self, tick)
    }
    fn stop(&mut self) -> Result<()> {
        HomingCore::stop(self)
    }
    fn phase(&self) -> Phase {
        HomingCore::phase(self)
    }
    fn fault(&self) -> Option<Fault> {
        HomingCore::fault(self)
    }
    fn zone(&self) -> Zone {
        HomingCore::zone(self)
    }
    fn calibration(&self) -> TravelCalibration {
        HomingCore::calibration(self)
    }
    fn last_sample(&self) -> DebounceResult {
        HomingCore::last_sample(self)
    }
    fn direction(&self) -> Direction {
        HomingCore::direction(self)
    }
}

impl HomingEngine for Homing {
    fn start(&mut self) {
        self.inner.start();
    }
    fn poll(&mut self, tick: Ticks) -> Result<HomingStatus> {
        self.inner.poll(tick)
    }
    fn stop(&mut self) -> Result<()> {
        self.inner.stop()
    }
    fn phase(&self) -> Phase {
        self.inner.phase()
    }
    fn fault(&self) -> Option<Fault> {
        self.inner.fault()
    }
    fn zone(&self) -> Zone {
        self.inner.zone()
    }
    fn calibration(&self) -> TravelCalibration {
        self.inner.calibration()
    }
    fn last_sample(&self) -> DebounceResult {
        self.inner.last_sample()
    }
    fn direction(&self) -> Direction {
        self.inner.direction()
    }
}

#[derive(Debug, Clone)]
pub struct RunParams {
    /// Time between two polls.
    pub tick_period: Duration,
    /// Extra attempts after a homing fault.
    pub max_retries: u32,
    /// Give up after this many polls across all attempts.
    pub max_ticks: Option<Ticks>,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_millis(1),
            max_retries: 0,
            max_ticks: None,
        }
    }
}

impl RunParams {
    pub fn from_rate(tick_rate_hz: u32) -> Self {
        Self {
            tick_period: crate::util::tick_period(tick_rate_hz),
            ..Self::default()
        }
    }
}

/// One poll as seen from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickRecord {
    pub attempt: u32,
    pub tick: Ticks,
    pub phase: Phase,
    pub zone: Zone,
    pub x: SwitchState,
    pub y: SwitchState,
    pub direction: Direction,
    pub status: HomingStatus,
}

/// Result of a successful homing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HomingReport {
    /// Ticks used by the successful attempt.
    pub ticks: Ticks,
    /// Polls across all attempts.
    pub total_ticks: Ticks,
    pub attempts: u32,
    pub calibration: TravelCalibration,
    pub zone: Zone,
}

/// Run homing to completion.
///
/// Faults are retried up to `params.max_retries` times by restarting the
/// engine. A set `shutdown` flag stops the actuator and returns
/// `HomingError::Interrupted`.
pub fn run<H, C, F>(
    homing: &mut H,
    clock: &C,
    params: &RunParams,
    shutdown: Option<&AtomicBool>,
    mut observer: F,
) -> Result<HomingReport>
where
    H: HomingEngine + ?Sized,
    C: Clock + ?Sized,
    F: FnMut(&TickRecord),
{
    let mut attempts: u32 = 1;
    let mut tick: Ticks = 0;
    let mut total: Ticks = 0;
    homing.start();
    tracing::info!(
        period_us = params.tick_period.as_micros() as u64,
        max_retries = params.max_retries,
        "homing start"
    );

    let mut deadline = clock.now();
    loop {
        if shutdown.is_some_and(|f| f.load(Ordering::Relaxed)) {
            stop_best_effort(homing, "shutdown");
            tracing::warn!(tick, attempts, "homing interrupted");
            return Err(eyre::Report::new(HomingError::Interrupted));
        }
        if params.max_ticks.is_some_and(|max| total >= max) {
            stop_best_effort(homing, "watchdog");
            tracing::error!(total, phase = homing.phase().name(), "homing watchdog expired");
            return Err(eyre::Report::new(HomingError::Watchdog(total)));
        }

        let status = match homing.poll(tick) {
            Ok(s) => s,
            Err(e) => {
                stop_best_effort(homing, "capability error");
                return Err(e).wrap_err_with(|| format!("homing poll at tick {tick}"));
            }
        };
        total += 1;

        let sample = homing.last_sample();
        observer(&TickRecord {
            attempt: attempts,
            tick,
            phase: homing.phase(),
            zone: homing.zone(),
            x: sample.x,
            y: sample.y,
            direction: homing.direction(),
            status,
        });

        match status {
            HomingStatus::InProgress => tick += 1,
            HomingStatus::Success => {
                let calibration = homing.calibration();
                tracing::info!(
                    ticks = tick,
                    attempts,
                    x_to_y = calibration.x_to_y,
                    y_to_x = calibration.y_to_x,
                    "homing complete"
                );
                return Ok(HomingReport {
                    ticks: tick,
                    total_ticks: total,
                    attempts,
                    calibration,
                    zone: homing.zone(),
                });
            }
            HomingStatus::Error(phase) => {
                let kind = homing.fault().map_or(FaultKind::MaxTimeout, |f| f.kind);
                if attempts <= params.max_retries {
                    tracing::warn!(
                        phase = phase.name(),
                        kind = kind.name(),
                        attempt = attempts,
                        "homing fault, retrying"
                    );
                    attempts += 1;
                    tick = 0;
                    homing.start();
                } else {
                    tracing::error!(phase = phase.name(), kind = kind.name(), attempts, "homing failed");
                    return Err(eyre::Report::new(HomingError::Fault { phase, kind }));
                }
            }
        }

        deadline += params.tick_period;
        clock.sleep_until(deadline);
    }
}

fn stop_best_effort<H: HomingEngine + ?Sized>(homing: &mut H, why: &str) {
    if let Err(e) = homing.stop() {
        tracing::warn!(error = %e, why, "actuator stop failed");
    }
}
