#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the actuator homing controller.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Every section is optional; missing sections fall back to the defaults of
//!   the reference actuator (1 kHz tick, settle count 3).
use serde::Deserialize;
use serde::de::Deserializer;

/// BCM pin numbers used by the GPIO backend.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct Pins {
    pub limit_x: u8,
    pub limit_y: u8,
    pub dir_x_to_y: u8,
    pub dir_y_to_x: u8,
    /// Limit switches pull the input low when actuated.
    pub active_low: bool,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            limit_x: 17,
            limit_y: 27,
            dir_x_to_y: 22,
            dir_y_to_x: 23,
            active_low: false,
        }
    }
}

/// Inclusive tick bounds of one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowToml {
    pub min: u64,
    pub max: u64,
}

impl WindowToml {
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }
}

/// Timing limits in ticks.
///
/// Windows accept either form:
/// - table: `{ min = 1, max = 2303 }`
/// - pair: `[1, 2303]`
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Timing {
    #[serde(deserialize_with = "de_window")]
    pub x_to_y_travel: WindowToml,
    #[serde(deserialize_with = "de_window")]
    pub y_to_x_travel: WindowToml,
    #[serde(deserialize_with = "de_window")]
    pub x_clearance: WindowToml,
    #[serde(deserialize_with = "de_window")]
    pub y_clearance: WindowToml,
    pub debounce_wait_max: u64,
    pub settle_count: u8,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            x_to_y_travel: WindowToml::new(0x0001, 0x08FF),
            y_to_x_travel: WindowToml::new(0x0001, 0x0AFF),
            x_clearance: WindowToml::new(0x0001, 0x03FF),
            y_clearance: WindowToml::new(0x0001, 0x03FF),
            debounce_wait_max: 0x000F,
            settle_count: 3,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WindowRepr {
    Pair((u64, u64)),
    Table { min: u64, max: u64 },
}

fn de_window<'de, D>(deserializer: D) -> Result<WindowToml, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match WindowRepr::deserialize(deserializer)? {
        WindowRepr::Pair((min, max)) | WindowRepr::Table { min, max } => WindowToml { min, max },
    })
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Runner {
    /// Poll rate of the homing loop.
    pub tick_rate_hz: u32,
    /// Extra attempts after a homing fault (0 = fail on first fault).
    pub max_retries: u32,
    /// Host watchdog: give up after this many polls in total.
    pub max_ticks: Option<u64>,
}

impl Default for Runner {
    fn default() -> Self {
        Self {
            tick_rate_hz: 1000,
            max_retries: 0,
            max_ticks: None,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    pub rotation: Option<String>,
}

/// Forced level of a simulated switch.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StuckLevel {
    Rested,
    Actuated,
}

impl StuckLevel {
    pub fn is_actuated(self) -> bool {
        self == StuckLevel::Actuated
    }
}

/// Simulated rig used when no GPIO backend is compiled in.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Sim {
    pub length: u32,
    pub x_switch: (u32, u32),
    pub y_switch: (u32, u32),
    pub start: u32,
    pub bounce_reads: u8,
    pub stuck_x: Option<StuckLevel>,
    pub stuck_y: Option<StuckLevel>,
}

impl Default for Sim {
    fn default() -> Self {
        Self {
            length: 1000,
            x_switch: (50, 150),
            y_switch: (850, 950),
            start: 500,
            bounce_reads: 0,
            stuck_x: None,
            stuck_y: None,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub pins: Pins,
    pub timing: Timing,
    pub runner: Runner,
    pub logging: Logging,
    pub sim: Sim,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

const ROTATIONS: [&str; 3] = ["never", "daily", "hourly"];

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Timing
        let t = &self.timing;
        for (name, w) in [
            ("x_to_y_travel", t.x_to_y_travel),
            ("y_to_x_travel", t.y_to_x_travel),
            ("x_clearance", t.x_clearance),
            ("y_clearance", t.y_clearance),
        ] {
            if w.min >= w.max {
                eyre::bail!(
                    "timing.{name}: min ({}) must be < max ({})",
                    w.min,
                    w.max
                );
            }
        }
        if t.settle_count == u8::MAX {
            eyre::bail!("timing.settle_count must be < 255");
        }
        if u64::from(t.settle_count) >= t.debounce_wait_max {
            eyre::bail!(
                "timing.settle_count ({}) must be < timing.debounce_wait_max ({})",
                t.settle_count,
                t.debounce_wait_max
            );
        }

        // Runner
        if self.runner.tick_rate_hz == 0 {
            eyre::bail!("runner.tick_rate_hz must be > 0");
        }
        if self.runner.max_ticks == Some(0) {
            eyre::bail!("runner.max_ticks must be > 0 when set");
        }

        // Pins
        let p = &self.pins;
        let pins = [p.limit_x, p.limit_y, p.dir_x_to_y, p.dir_y_to_x];
        for (i, a) in pins.iter().enumerate() {
            if pins[i + 1..].contains(a) {
                eyre::bail!("pins: BCM pin {a} assigned more than once");
            }
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref() {
            if !ROTATIONS.contains(&r) {
                eyre::bail!("logging.rotation must be one of never|daily|hourly, got {r:?}");
            }
        }

        // Sim
        let s = &self.sim;
        let ordered = 0 < s.x_switch.0
            && s.x_switch.0 <= s.x_switch.1
            && s.x_switch.1 < s.y_switch.0
            && s.y_switch.0 <= s.y_switch.1
            && s.y_switch.1 < s.length;
        if !ordered {
            eyre::bail!(
                "sim: need 0 < x_switch.0 <= x_switch.1 < y_switch.0 <= y_switch.1 < length"
            );
        }
        if s.start > s.length {
            eyre::bail!("sim.start ({}) must be <= length ({})", s.start, s.length);
        }
        Ok(())
    }
}
