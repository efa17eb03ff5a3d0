//! Homing status returned from each poll.

use crate::phase::Phase;

/// Public status of a single poll of the homing state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomingStatus {
    /// Homing is still running; keep polling.
    InProgress,
    /// Parked at the midpoint; the actuator is stopped.
    Success,
    /// Homing failed in the given phase; the actuator is stopped.
    Error(Phase),
}

impl HomingStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, HomingStatus::InProgress)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HomingStatus::InProgress => "in_progress",
            HomingStatus::Success => "success",
            HomingStatus::Error(_) => "error",
        }
    }
}
