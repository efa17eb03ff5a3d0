use thiserror::Error;

use crate::phase::{FaultKind, Phase};

#[derive(Debug, Error, Clone)]
pub enum HomingError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("homing fault in {phase}: {kind}")]
    Fault { phase: Phase, kind: FaultKind },
    #[error("homing interrupted")]
    Interrupted,
    #[error("homing watchdog expired after {0} ticks")]
    Watchdog(u64),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing limit switches")]
    MissingSwitches,
    #[error("missing actuator")]
    MissingActuator,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
