//! # Error Types
//!
//! Custom error types for the telemetry receiver using `thiserror`.

use thiserror::Error;

/// Main error type for the telemetry receiver
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Serial port could not be opened or read
    #[error("Serial error: {0}")]
    Serial(String),

    /// None of the candidate serial devices could be opened
    #[error("No serial device found (tried: {0})")]
    SerialPortNotFound(String),

    /// Configuration file could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration parsed but holds an out-of-range value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV export errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Export was requested before any frame was received
    #[error("Nothing to export: no telemetry frames received yet")]
    NothingToExport,
}

/// Result type alias for the telemetry receiver
pub type Result<T> = std::result::Result<T, TelemetryError>;
