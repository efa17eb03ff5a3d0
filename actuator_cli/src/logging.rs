//! Tracing setup: console layer (pretty or JSON) plus an optional JSON-lines
//! file sink configured by `[logging]`.

use std::path::Path;

use actuator_config::Logging;
use eyre::WrapErr;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::cli::FILE_GUARD;

/// Install the global subscriber. `RUST_LOG` overrides `console_level`.
pub fn init(console_level: &str, json: bool, logging: &Logging) -> eyre::Result<()> {
    let console_filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(console_level)
            .wrap_err_with(|| format!("invalid --log-level {console_level:?}"))?,
    };
    let console = fmt::layer().with_writer(std::io::stderr).with_target(false);
    let console = if json {
        console.json().boxed()
    } else {
        console.boxed()
    };

    let file = match logging.file.as_deref() {
        Some(path) => {
            let level = logging.level.as_deref().unwrap_or("info");
            let filter = EnvFilter::try_new(level)
                .wrap_err_with(|| format!("invalid logging.level {level:?}"))?;
            let appender = file_appender(Path::new(path), logging.rotation.as_deref());
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .with_filter(filter),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console.with_filter(console_filter))
        .with(file)
        .try_init()
        .wrap_err("installing tracing subscriber")?;
    Ok(())
}

fn file_appender(path: &Path, rotation: Option<&str>) -> tracing_appender::rolling::RollingFileAppender {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .map_or_else(|| "actuator.log".into(), |n| n.to_os_string());
    match rotation {
        Some("daily") => tracing_appender::rolling::daily(dir, name),
        Some("hourly") => tracing_appender::rolling::hourly(dir, name),
        _ => tracing_appender::rolling::never(dir, name),
    }
}
