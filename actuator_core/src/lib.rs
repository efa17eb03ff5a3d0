#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core homing logic (hardware-agnostic).
//!
//! This crate provides the homing engine for a two-position actuator whose
//! only position feedback is a limit switch at each end of travel. All
//! hardware interactions go through `actuator_traits::LimitSwitches` and
//! `actuator_traits::Actuator`.
//!
//! ## Architecture
//!
//! - **Debounce**: consecutive-sample filter per switch (`debounce` module)
//! - **Transition check**: drive, sample, classify against a tick window (`transition`)
//! - **State machine**: phase graph from reset to the parked midpoint (`HomingCore`)
//! - **Configuration**: tick windows and debounce limits (`config` module)
//! - **Runner**: paced host loop with retry policy and telemetry (`runner`)
//!
//! ## Ticks
//!
//! The engine never looks at wall time. Every limit is a count of caller
//! ticks, and `poll(tick)` only compares `tick` with the tick at which the
//! current phase was entered.

pub mod builder;
pub mod calibration;
pub mod config;
pub mod conversions;
pub mod core;
pub mod debounce;
pub mod error;
pub mod hw_error;
pub mod mocks;
pub mod phase;
pub mod runner;
pub mod session;
pub mod status;
pub mod transition;
pub mod util;

pub use crate::builder::{Homing, HomingBuilder, Missing, Set, build_homing};
pub use crate::calibration::TravelCalibration;
pub use crate::config::{SETTLE_COUNTER_MAX, Ticks, TimingCfg, Window};
pub use crate::core::HomingCore;
pub use crate::debounce::{DebounceResult, Debouncer, Switch, SwitchState};
pub use crate::error::{BuildError, HomingError, Result};
pub use crate::phase::{Fault, FaultKind, Phase, Zone};
pub use crate::runner::{HomingEngine, HomingReport, RunParams, TickRecord, run};
pub use crate::session::HomingSession;
pub use crate::status::HomingStatus;
pub use crate::transition::{SwitchExpect, TransitionOutcome, check_transition};
