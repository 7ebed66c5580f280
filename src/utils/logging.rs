//! Structured logging setup.
//!
//! Installs a global `tracing` subscriber from a [`LoggingConfig`]. `RUST_LOG`
//! takes precedence over the configured level when set.

use crate::config::LoggingConfig;
use crate::error::{CodecError, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

fn level_directive(level: Level) -> &'static str {
    match level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        Level::ERROR => "error",
    }
}

/// Install the global subscriber described by `config`.
///
/// File output takes precedence over console output when both are enabled.
/// Calling this again after a subscriber is installed is a no-op.
///
/// # Errors
/// Returns `CodecError::ConfigError` if the configuration is invalid or the
/// log file cannot be opened.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(CodecError::ConfigError(errors.join("; ")));
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_directive(config.log_level)));

    let file = match (config.log_to_file, config.log_file_path.as_deref()) {
        (true, Some(path)) => Some(
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| CodecError::ConfigError(format!("Failed to open log file: {e}")))?,
        ),
        _ => None,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match (config.json_format, file) {
        (true, Some(file)) => builder.json().with_writer(Mutex::new(file)).try_init(),
        (true, None) => builder.json().try_init(),
        (false, Some(file)) => builder
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init(),
        (false, None) => builder.try_init(),
    };

    match installed {
        Ok(()) => debug!(app = %config.app_name, "Logging initialized"),
        Err(_) => debug!(app = %config.app_name, "Subscriber already installed"),
    }

    Ok(())
}
