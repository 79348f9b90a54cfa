//! The `log` module provides initialisation of the application's logging
//! system.
//!
//! Logging goes to stderr with colourised levels when stderr is a terminal.
//! The level can be set in the scenarios file or overridden with the
//! `CELLAGE_LOG_LEVEL` environment variable; the environment variable wins.
use anyhow::{Result, bail};
use chrono::Local;
use fern::Dispatch;
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;
use std::env;
use std::io::IsTerminal;

/// The default log level for the program.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Name of the environment variable that overrides the log level.
const LOG_LEVEL_ENV_VAR: &str = "CELLAGE_LOG_LEVEL";

/// Initialise the program logger.
///
/// Possible log level options are: `off`, `error`, `warn`, `info`, `debug`
/// and `trace`. Fails if called twice or given an unknown level.
///
/// # Arguments
///
/// * `log_level_from_settings`: The log level specified in `scenarios.toml`
pub fn init(log_level_from_settings: Option<&str>) -> Result<()> {
    let log_level = env::var(LOG_LEVEL_ENV_VAR).unwrap_or_else(|_| {
        log_level_from_settings
            .unwrap_or(DEFAULT_LOG_LEVEL)
            .to_string()
    });

    let log_level = match log_level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        unknown => bail!("Unknown log level: {}", unknown),
    };

    let colours = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);

    let use_colour = std::io::stderr().is_terminal();

    Dispatch::new()
        .format(move |out, message, record| {
            let timestamp = Local::now().format("%H:%M:%S");
            if use_colour {
                out.finish(format_args!(
                    "[{timestamp} {} {}] {message}",
                    colours.color(record.level()),
                    record.target()
                ));
            } else {
                out.finish(format_args!(
                    "[{timestamp} {} {}] {message}",
                    record.level(),
                    record.target()
                ));
            }
        })
        .level(log_level)
        .chain(std::io::stderr())
        .apply()?;

    Ok(())
}
