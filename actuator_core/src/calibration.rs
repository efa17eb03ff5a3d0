use crate::config::Ticks;

/// Travel times measured during one homing run.
///
/// Each value is written at most once per run; `None` until measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TravelCalibration {
    pub x_to_y: Option<Ticks>,
    pub y_to_x: Option<Ticks>,
}

impl TravelCalibration {
    /// Record the X→Y travel time. Returns `false` if it was already set.
    #[must_use]
    pub fn record_x_to_y(&mut self, ticks: Ticks) -> bool {
        Self::record(&mut self.x_to_y, ticks)
    }

    /// Record the Y→X travel time. Returns `false` if it was already set.
    #[must_use]
    pub fn record_y_to_x(&mut self, ticks: Ticks) -> bool {
        Self::record(&mut self.y_to_x, ticks)
    }

    /// Ceiling of the midpoint seek: half the X→Y travel, truncating.
    pub fn midpoint_ticks(&self) -> Ticks {
        self.x_to_y.unwrap_or(0) / 2
    }

    fn record(slot: &mut Option<Ticks>, ticks: Ticks) -> bool {
        if slot.is_some() {
            return false;
        }
        *slot = Some(ticks);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_are_write_once() {
        let mut cal = TravelCalibration::default();
        assert!(cal.record_x_to_y(700));
        assert!(!cal.record_x_to_y(10));
        assert_eq!(cal.x_to_y, Some(700));
        assert_eq!(cal.y_to_x, None);
        assert!(cal.record_y_to_x(690));
        assert!(!cal.record_y_to_x(1));
        assert_eq!(cal.y_to_x, Some(690));
    }

    #[test]
    fn midpoint_truncates() {
        let cal = TravelCalibration {
            x_to_y: Some(701),
            y_to_x: None,
        };
        assert_eq!(cal.midpoint_ticks(), 350);
    }
}
