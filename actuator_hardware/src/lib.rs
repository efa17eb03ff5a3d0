//! Host-side adapters for the homing capabilities.
//!
//! - `sim`: deterministic track model with simulated switches, drive and clock.
//! - `gpio` (feature `hardware`, Linux): Raspberry Pi pins through `rppal`.

pub mod error;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod gpio;
pub mod sim;

pub use error::HwError;
pub use sim::{SimActuator, SimClock, SimFaults, SimSwitches, SimTrack, TrackLayout};
