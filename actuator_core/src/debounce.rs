//! Consecutive-sample debouncer for the two limit switches.
//!
//! Each switch keeps the last raw reading, a saturating counter of how many
//! polls that reading has been stable and the last accepted (settled) value.
//! A settled value only changes once the raw reading has been stable for
//! more than `settle_count` polls, so the output never flickers.

use actuator_traits::LimitSwitches;
use eyre::WrapErr;

use crate::error::Result;
use crate::hw_error::map_hw_error;

/// Debounced reading of one limit switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SwitchState {
    #[default]
    Rested,
    Actuated,
}

impl SwitchState {
    pub fn from_raw(actuated: bool) -> Self {
        if actuated {
            SwitchState::Actuated
        } else {
            SwitchState::Rested
        }
    }

    pub fn is_actuated(self) -> bool {
        self == SwitchState::Actuated
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SwitchState::Rested => "rested",
            SwitchState::Actuated => "actuated",
        }
    }
}

impl core::fmt::Display for SwitchState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Debounce bookkeeping for one switch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Switch {
    pending: SwitchState,
    count: u8,
    settled: SwitchState,
}

impl Switch {
    /// Feed one raw reading; returns whether the reading is stable.
    pub fn update(&mut self, raw: SwitchState, settle_count: u8) -> bool {
        self.count = self.count.saturating_add(1);
        if raw != self.pending {
            self.count = 0;
            self.pending = raw;
        }
        let stable = self.count > settle_count;
        if stable {
            self.settled = raw;
        }
        stable
    }

    pub fn settled(&self) -> SwitchState {
        self.settled
    }

    pub fn count(&self) -> u8 {
        self.count
    }
}

/// Output of one debounce sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebounceResult {
    pub x: SwitchState,
    pub y: SwitchState,
    /// Both switches were stable on this sample.
    pub settled: bool,
}

#[derive(Debug, Clone)]
pub struct Debouncer {
    x: Switch,
    y: Switch,
    settle_count: u8,
}

impl Debouncer {
    pub fn new(settle_count: u8) -> Self {
        Self {
            x: Switch::default(),
            y: Switch::default(),
            settle_count,
        }
    }

    /// Read both switches (X first) and update the settled values.
    pub fn sample<S: LimitSwitches + ?Sized>(&mut self, switches: &mut S) -> Result<DebounceResult> {
        let raw_x = switches
            .read_x()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("reading limit switch X")?;
        let stable_x = self.x.update(SwitchState::from_raw(raw_x), self.settle_count);

        let raw_y = switches
            .read_y()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("reading limit switch Y")?;
        let stable_y = self.y.update(SwitchState::from_raw(raw_y), self.settle_count);

        Ok(DebounceResult {
            x: self.x.settled(),
            y: self.y.settled(),
            settled: stable_x && stable_y,
        })
    }

    /// Forget all history: both switches rested with zero counters.
    pub fn reset(&mut self) {
        self.x = Switch::default();
        self.y = Switch::default();
    }

    pub fn settle_count(&self) -> u8 {
        self.settle_count
    }

    pub fn x(&self) -> &Switch {
        &self.x
    }

    pub fn y(&self) -> &Switch {
        &self.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SwitchState::{Actuated, Rested};

    #[test]
    fn initial_rested_settles_after_threshold() {
        let mut sw = Switch::default();
        for _ in 0..3 {
            assert!(!sw.update(Rested, 3));
        }
        assert!(sw.update(Rested, 3));
        assert_eq!(sw.settled(), Rested);
    }

    #[test]
    fn single_glitch_is_rejected() {
        let mut sw = Switch::default();
        for _ in 0..5 {
            sw.update(Rested, 3);
        }
        assert!(!sw.update(Actuated, 3));
        assert_eq!(sw.settled(), Rested);
        assert!(!sw.update(Rested, 3));
        assert_eq!(sw.settled(), Rested);
    }

    #[test]
    fn counter_saturates() {
        let mut sw = Switch::default();
        for _ in 0..600 {
            sw.update(Actuated, 3);
        }
        assert_eq!(sw.count(), u8::MAX);
        assert_eq!(sw.settled(), Actuated);
    }
}
