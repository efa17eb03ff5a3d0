//! Capabilities the homing core consumes from its host.
//!
//! Everything here is hardware-facing and intentionally thin: a pair of limit
//! switch reads, one drive command and a clock for pacing the tick loop.

pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Boxed error type used at every capability boundary.
pub type HwResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Commanded travel direction of the actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Move from the X end toward the Y end.
    TowardY,
    /// Move from the Y end toward the X end.
    TowardX,
    /// Both direction outputs released.
    #[default]
    Stop,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::TowardY => "toward_y",
            Direction::TowardX => "toward_x",
            Direction::Stop => "stop",
        }
    }
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw, undebounced limit switch inputs. `true` means the switch is actuated.
pub trait LimitSwitches {
    fn read_x(&mut self) -> HwResult<bool>;
    fn read_y(&mut self) -> HwResult<bool>;
}

/// Actuator direction drive. Implementations must treat repeated identical
/// commands as no-ops.
pub trait Actuator {
    fn drive(&mut self, direction: Direction) -> HwResult<()>;

    /// Convenience for `drive(Direction::Stop)`.
    fn stop(&mut self) -> HwResult<()> {
        self.drive(Direction::Stop)
    }
}

impl<T: LimitSwitches + ?Sized> LimitSwitches for Box<T> {
    fn read_x(&mut self) -> HwResult<bool> {
        (**self).read_x()
    }
    fn read_y(&mut self) -> HwResult<bool> {
        (**self).read_y()
    }
}

impl<T: Actuator + ?Sized> Actuator for Box<T> {
    fn drive(&mut self, direction: Direction) -> HwResult<()> {
        (**self).drive(direction)
    }
}
