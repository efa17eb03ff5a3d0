//! Type-state builder for `Homing` and generic `build_homing` constructor.
//!
//! The builder enforces at compile time that limit switches and an actuator
//! are provided before `build()` is available. `try_build()` is always
//! available for dynamic checks.

use std::marker::PhantomData;

use actuator_traits::{Actuator, LimitSwitches};

use crate::calibration::TravelCalibration;
use crate::config::{Ticks, TimingCfg};
use crate::core::HomingCore;
use crate::debounce::DebounceResult;
use crate::error::{BuildError, Result};
use crate::phase::{Fault, Phase, Zone};
use crate::status::HomingStatus;

// ── Public dynamic-dispatch wrapper ──────────────────────────────────────────

/// Homing engine over boxed capabilities.
pub struct Homing {
    pub(crate) inner: HomingCore<Box<dyn LimitSwitches>, Box<dyn Actuator>>,
}

impl core::fmt::Debug for Homing {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Homing")
            .field("phase", &self.inner.phase())
            .field("zone", &self.inner.zone())
            .field("direction", &self.inner.direction())
            .finish()
    }
}

impl Homing {
    /// Start building a Homing engine.
    pub fn builder() -> HomingBuilder<Missing, Missing> {
        HomingBuilder::default()
    }

    /// Abort any run in progress and begin a new one.
    pub fn start(&mut self) {
        self.inner.start();
    }

    /// Advance the state machine by one tick.
    pub fn poll(&mut self, tick: Ticks) -> Result<HomingStatus> {
        self.inner.poll(tick)
    }

    /// Stop the actuator.
    pub fn stop(&mut self) -> Result<()> {
        self.inner.stop()
    }

    pub fn sample_switches(&mut self) -> Result<DebounceResult> {
        self.inner.sample_switches()
    }

    pub fn reset_debouncer(&mut self) {
        self.inner.reset_debouncer();
    }

    pub fn status(&self) -> HomingStatus {
        self.inner.status()
    }

    pub fn phase(&self) -> Phase {
        self.inner.phase()
    }

    pub fn fault(&self) -> Option<Fault> {
        self.inner.fault()
    }

    pub fn zone(&self) -> Zone {
        self.inner.zone()
    }

    pub fn calibration(&self) -> TravelCalibration {
        self.inner.calibration()
    }

    pub fn last_sample(&self) -> DebounceResult {
        self.inner.last_sample()
    }

    pub fn elapsed(&self) -> Ticks {
        self.inner.elapsed()
    }

    pub fn direction(&self) -> actuator_traits::Direction {
        self.inner.direction()
    }

    pub fn timing(&self) -> &TimingCfg {
        self.inner.timing()
    }
}

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `Homing`. Timing is validated on `build()`.
pub struct HomingBuilder<S, A> {
    switches: Option<Box<dyn LimitSwitches>>,
    actuator: Option<Box<dyn Actuator>>,
    timing: Option<TimingCfg>,
    _s: PhantomData<S>,
    _a: PhantomData<A>,
}

impl Default for HomingBuilder<Missing, Missing> {
    fn default() -> Self {
        Self {
            switches: None,
            actuator: None,
            timing: None,
            _s: PhantomData,
            _a: PhantomData,
        }
    }
}

/// Validate timing and construct a `HomingCore`.
///
/// Shared by `HomingBuilder::try_build()` and `build_homing()`.
fn validate_and_build<S: LimitSwitches, A: Actuator>(
    switches: S,
    actuator: A,
    timing: TimingCfg,
) -> Result<HomingCore<S, A>> {
    timing.validate().map_err(eyre::Report::new)?;
    tracing::debug!(
        settle_count = timing.settle_count,
        debounce_wait_max = timing.debounce_wait_max,
        x_to_y_max = timing.x_to_y_travel.max,
        y_to_x_max = timing.y_to_x_travel.max,
        "homing engine built"
    );
    Ok(HomingCore::new(switches, actuator, timing))
}

impl<S, A> HomingBuilder<S, A> {
    /// Fallible build available in any type-state; reports missing pieces.
    pub fn try_build(self) -> Result<Homing> {
        let switches = self
            .switches
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSwitches))?;
        let actuator = self
            .actuator
            .ok_or_else(|| eyre::Report::new(BuildError::MissingActuator))?;
        let inner = validate_and_build(switches, actuator, self.timing.unwrap_or_default())?;
        Ok(Homing { inner })
    }

    pub fn with_timing(mut self, timing: TimingCfg) -> Self {
        self.timing = Some(timing);
        self
    }
}

// Setters that advance type-state
impl<A> HomingBuilder<Missing, A> {
    pub fn with_switches(self, switches: impl LimitSwitches + 'static) -> HomingBuilder<Set, A> {
        HomingBuilder {
            switches: Some(Box::new(switches)),
            actuator: self.actuator,
            timing: self.timing,
            _s: PhantomData,
            _a: PhantomData,
        }
    }
}

impl<S> HomingBuilder<S, Missing> {
    pub fn with_actuator(self, actuator: impl Actuator + 'static) -> HomingBuilder<S, Set> {
        HomingBuilder {
            switches: self.switches,
            actuator: Some(Box::new(actuator)),
            timing: self.timing,
            _s: PhantomData,
            _a: PhantomData,
        }
    }
}

impl HomingBuilder<Set, Set> {
    /// Validate and build. Only available once switches and actuator are set.
    pub fn build(self) -> Result<Homing> {
        self.try_build()
    }
}

/// Build a statically dispatched `HomingCore` from concrete capabilities.
pub fn build_homing<S, A>(switches: S, actuator: A, timing: TimingCfg) -> Result<HomingCore<S, A>>
where
    S: LimitSwitches,
    A: Actuator,
{
    validate_and_build(switches, actuator, timing)
}
