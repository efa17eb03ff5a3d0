//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "actuator", version, about = "Two-position actuator homing")]
pub struct Cli {
    /// Path to config TOML; built-in defaults are used when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log and report as JSON lines instead of pretty text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG wins when set
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Home the actuator and park it at the midpoint of its travel
    Home {
        /// Extra attempts after a homing fault (overrides runner.max_retries)
        #[arg(long, value_name = "N")]
        retries: Option<u32>,
        /// Write one CSV row per poll to this file
        #[arg(long, value_name = "FILE")]
        trace: Option<PathBuf>,
        /// Give up after this many polls in total (overrides runner.max_ticks)
        #[arg(long = "max-ticks", value_name = "N")]
        max_ticks: Option<u64>,
    },
    /// Sample both limit switches until they settle and print their state
    SelfCheck,
}

pub fn json_mode() -> bool {
    JSON_MODE.get().copied().unwrap_or(false)
}
