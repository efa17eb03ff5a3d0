//! Timing configuration for the homing engine.
//!
//! All values are caller ticks. The TOML-facing schema lives in
//! `actuator_config`; `conversions` bridges the two.

use crate::error::BuildError;

/// Unitless caller ticks.
pub type Ticks = u64;

/// Counter ceiling of the switch debouncer.
pub const SETTLE_COUNTER_MAX: u8 = u8::MAX;

/// Allowed duration of one commanded transition.
///
/// Reaching the desired switch state at or before `min` is a fault (the
/// transition was implausibly fast); not reaching it before `max` is a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub min: Ticks,
    pub max: Ticks,
}

impl Window {
    pub const fn new(min: Ticks, max: Ticks) -> Self {
        Self { min, max }
    }
}

/// Per-actuator timing limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingCfg {
    /// Full travel from the X switch to the Y switch.
    pub x_to_y_travel: Window,
    /// Full travel from the Y switch to the X switch.
    pub y_to_x_travel: Window,
    /// Passing over the X switch.
    pub x_clearance: Window,
    /// Passing over the Y switch.
    pub y_clearance: Window,
    /// Longest wait for both switches to settle after reset.
    pub debounce_wait_max: Ticks,
    /// Consecutive identical reads required before a reading is accepted.
    pub settle_count: u8,
}

impl Default for TimingCfg {
    fn default() -> Self {
        Self {
            x_to_y_travel: Window::new(0x0001, 0x08FF),
            y_to_x_travel: Window::new(0x0001, 0x0AFF),
            x_clearance: Window::new(0x0001, 0x03FF),
            y_clearance: Window::new(0x0001, 0x03FF),
            debounce_wait_max: 0x000F,
            settle_count: 3,
        }
    }
}

impl TimingCfg {
    pub fn validate(&self) -> Result<(), BuildError> {
        let windows = [
            (self.x_to_y_travel, "x_to_y_travel.min must be < max"),
            (self.y_to_x_travel, "y_to_x_travel.min must be < max"),
            (self.x_clearance, "x_clearance.min must be < max"),
            (self.y_clearance, "y_clearance.min must be < max"),
        ];
        for (w, msg) in windows {
            if w.min >= w.max {
                return Err(BuildError::InvalidConfig(msg));
            }
        }
        if self.settle_count == SETTLE_COUNTER_MAX {
            return Err(BuildError::InvalidConfig(
                "settle_count must be below the debounce counter ceiling (255)",
            ));
        }
        if Ticks::from(self.settle_count) >= self.debounce_wait_max {
            return Err(BuildError::InvalidConfig(
                "settle_count must be < debounce_wait_max",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        TimingCfg::default().validate().unwrap();
    }

    #[test]
    fn equal_bounds_are_rejected() {
        let cfg = TimingCfg {
            y_clearance: Window::new(5, 5),
            ..TimingCfg::default()
        };
        match cfg.validate() {
            Err(BuildError::InvalidConfig(msg)) => assert!(msg.contains("y_clearance")),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn settle_count_must_fit_debounce_wait() {
        let cfg = TimingCfg {
            settle_count: 15,
            ..TimingCfg::default()
        };
        assert!(cfg.validate().is_err());
    }
}
