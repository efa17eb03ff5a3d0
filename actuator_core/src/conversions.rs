//! `From` implementations bridging `actuator_config` types to core types.

use crate::config::{TimingCfg, Window};

impl From<actuator_config::WindowToml> for Window {
    fn from(w: actuator_config::WindowToml) -> Self {
        Self::new(w.min, w.max)
    }
}

impl From<&actuator_config::Timing> for TimingCfg {
    fn from(c: &actuator_config::Timing) -> Self {
        Self {
            x_to_y_travel: c.x_to_y_travel.into(),
            y_to_x_travel: c.y_to_x_travel.into(),
            x_clearance: c.x_clearance.into(),
            y_clearance: c.y_clearance.into(),
            debounce_wait_max: c.debounce_wait_max,
            settle_count: c.settle_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_match_core_defaults() {
        let cfg = actuator_config::Timing::default();
        assert_eq!(TimingCfg::from(&cfg), TimingCfg::default());
    }
}
