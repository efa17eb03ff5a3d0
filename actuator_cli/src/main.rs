mod cli;
mod error_fmt;
mod home;
mod logging;
mod trace;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use actuator_config::Config;
use actuator_core::HomingError;
use clap::Parser;
use eyre::{Result, WrapErr};

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::home::HomeOpts;

fn load_config(cli: &Cli) -> Result<Config> {
    let cfg = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("read config {}", path.display()))?;
            actuator_config::load_toml(&text)
                .wrap_err_with(|| format!("parse config {}", path.display()))?
        }
        None => Config::default(),
    };
    cfg.validate()
        .map_err(|e| eyre::Report::new(HomingError::Config(e.to_string())))?;
    Ok(cfg)
}

fn real_main(cli: Cli) -> Result<()> {
    let cfg = load_config(&cli)?;
    logging::init(&cli.log_level, cli.json, &cfg.logging)?;
    tracing::debug!(?cfg, "configuration loaded");

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&shutdown);
        if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
            tracing::warn!(error = %e, "ctrl-c handler not installed");
        }
    }

    match cli.cmd {
        Commands::Home {
            retries,
            trace,
            max_ticks,
        } => {
            let opts = HomeOpts {
                retries,
                trace,
                max_ticks,
            };
            home::home(&cfg, &opts, &shutdown)
        }
        Commands::SelfCheck => home::self_check(&cfg),
    }
}

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    if !cli.json {
        let _ = color_eyre::install();
    }

    if let Err(e) = real_main(cli) {
        tracing::error!(error = %e, "actuator command failed");
        if cli::json_mode() {
            println!("{}", error_fmt::format_error_json(&e));
        } else {
            eprintln!("{}", error_fmt::humanize(&e));
        }
        std::process::exit(error_fmt::exit_code_for_error(&e));
    }
}
