//! Phase, zone and fault vocabulary of the homing state machine.

use core::fmt;

/// One discrete state of the homing state machine.
///
/// `code()` gives stable numeric phase codes for logs and telemetry. Their
/// ordering carries no meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Stop, clear calibration, then wait for switches.
    Reset,
    /// Wait for both switches to settle.
    DebounceWait,
    /// Branch on the settled switch pair.
    ZoneDisambiguate,
    /// Drive toward Y until either switch settles actuated.
    SeekY,
    /// Seek-Y timed out: one attempt in the opposite direction.
    SeekX,
    /// Resting on Y: drive back until X is actuated.
    ReturnToX,
    /// Leave the X switch toward Y.
    ClearX,
    /// Time the X→Y travel.
    MeasureXToY,
    /// Run past the Y switch.
    PassY,
    /// Reverse back onto the Y switch.
    ReenterY,
    /// Leave the Y switch toward X.
    ClearY,
    /// Time the Y→X travel.
    MeasureYToX,
    /// Run past the X switch.
    PassX,
    /// Reverse back onto the X switch.
    ReenterX,
    /// Leave the X switch toward Y, entering the span between switches.
    LeaveX,
    /// Drive toward Y for half the X→Y travel time.
    MidpointSeek,
    /// Homed at the midpoint.
    Parked,
    /// Terminal: a transition was too slow, never settled or was impossible.
    FaultMax,
    /// Terminal: a transition was too fast.
    FaultMin,
}

impl Phase {
    pub fn code(self) -> u8 {
        match self {
            Phase::Reset => 0,
            Phase::DebounceWait => 1,
            Phase::ZoneDisambiguate => 2,
            Phase::SeekY => 20,
            Phase::SeekX => 21,
            Phase::ReturnToX => 30,
            Phase::ClearX => 40,
            Phase::MeasureXToY => 44,
            Phase::PassY => 45,
            Phase::ReenterY => 46,
            Phase::ClearY => 47,
            Phase::MeasureYToX => 48,
            Phase::PassX => 49,
            Phase::ReenterX => 50,
            Phase::LeaveX => 51,
            Phase::MidpointSeek => 52,
            Phase::Parked => 53,
            Phase::FaultMax => 202,
            Phase::FaultMin => 203,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::Reset => "reset",
            Phase::DebounceWait => "debounce_wait",
            Phase::ZoneDisambiguate => "zone_disambiguate",
            Phase::SeekY => "seek_y",
            Phase::SeekX => "seek_x",
            Phase::ReturnToX => "return_to_x",
            Phase::ClearX => "clear_x",
            Phase::MeasureXToY => "measure_x_to_y",
            Phase::PassY => "pass_y",
            Phase::ReenterY => "reenter_y",
            Phase::ClearY => "clear_y",
            Phase::MeasureYToX => "measure_y_to_x",
            Phase::PassX => "pass_x",
            Phase::ReenterX => "reenter_x",
            Phase::LeaveX => "leave_x",
            Phase::MidpointSeek => "midpoint_seek",
            Phase::Parked => "parked",
            Phase::FaultMax => "fault_max",
            Phase::FaultMin => "fault_min",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Parked | Phase::FaultMax | Phase::FaultMin)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

/// Why a homing run stopped in a fault phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// Switches never settled after reset.
    DebounceTimeout,
    /// Both switches actuated at once.
    InvalidZone,
    /// Desired switch state not reached before the ceiling.
    MaxTimeout,
    /// Desired switch state reached at or before the floor.
    MinTimeout,
}

impl FaultKind {
    pub fn name(self) -> &'static str {
        match self {
            FaultKind::DebounceTimeout => "DebounceTimeout",
            FaultKind::InvalidZone => "InvalidZone",
            FaultKind::MaxTimeout => "MaxTimeout",
            FaultKind::MinTimeout => "MinTimeout",
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FaultKind::DebounceTimeout => "limit switches never settled",
            FaultKind::InvalidZone => "both limit switches actuated",
            FaultKind::MaxTimeout => "transition took too long",
            FaultKind::MinTimeout => "transition happened too fast",
        })
    }
}

/// Fault record kept until the next `start()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fault {
    pub phase: Phase,
    pub kind: FaultKind,
}

/// Coarse carriage position, ordered from the X end to the Y end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Zone {
    /// X end; also the value before the carriage has been located.
    #[default]
    A,
    /// Between the X end and the X switch.
    B,
    /// On the X switch.
    BC,
    /// Between the switches.
    C,
    /// On the Y switch.
    CD,
    /// Between the Y switch and the Y end.
    D,
    /// Y end.
    E,
}

impl Zone {
    pub fn name(self) -> &'static str {
        match self {
            Zone::A => "A",
            Zone::B => "B",
            Zone::BC => "BC",
            Zone::C => "C",
            Zone::CD => "CD",
            Zone::D => "D",
            Zone::E => "E",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
