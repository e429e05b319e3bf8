//! # Logging Setup
//!
//! Installs the `tracing` subscriber: console output always, plus a
//! daily-rolling file when `logging.log_dir` is configured.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Prefix of rolling diagnostic log files
pub const LOG_FILE_PREFIX: &str = "cubesat-telemetry.log";

/// Build the filter: `RUST_LOG` directives first, configured level as fallback
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Initialize logging.
///
/// The returned guard flushes the file writer on drop and must be held for the
/// lifetime of the program.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let console = fmt::layer().with_writer(std::io::stderr);

    match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::registry()
                .with(env_filter(config))
                .with(console)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();

            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter(config))
                .with(console)
                .init();

            None
        }
    }
}
