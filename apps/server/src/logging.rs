use anyhow::{Context, Result};
use ocrhub::domain::config::LogConfig;
use ocrhub_logger::{LevelFilter, Logger};

/// Initializes the global subscriber from the `[log]` config section.
///
/// # Errors
/// Returns an error for an unknown level, an invalid filter, or when a
/// subscriber is already installed.
pub fn init_logger(name: &str, cfg: &LogConfig) -> Result<Logger> {
    let level = cfg
        .level
        .parse::<LevelFilter>()
        .with_context(|| format!("Invalid log level {:?}", cfg.level))?;

    let mut builder = Logger::builder(name).level(level).json(cfg.json);
    if let Some(filter) = &cfg.filter {
        builder = builder.directives(filter);
    }
    if let Some(dir) = &cfg.dir {
        builder = builder.dir(dir);
    }

    builder.init().context("Failed to initialize logging")
}
