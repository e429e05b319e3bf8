//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, TelemetryError};
use crate::serial::reader::DEFAULT_READ_BUFFER_SIZE;
use crate::serial::DEFAULT_BAUD_RATE;
use crate::telemetry::aggregator::DEFAULT_WINDOW_SIZE;
use crate::telemetry::registry;

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,

    #[serde(default)]
    pub plot: PlotConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,
}

/// Live plot configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PlotConfig {
    /// Fields to track in recent windows, by registry name
    #[serde(default = "default_plot_fields")]
    pub fields: Vec<String>,

    #[serde(default = "default_window_size")]
    pub window_size: usize,

    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
}

/// CSV export configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    #[serde(default = "default_export_on_exit")]
    pub on_exit: bool,

    #[serde(default = "default_export_directory")]
    pub directory: String,
}

/// Diagnostic logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for a daily-rolling log file; console only when unset
    #[serde(default)]
    pub log_dir: Option<String>,
}

// Default value functions
fn default_serial_port() -> String { "auto".to_string() }
fn default_baud_rate() -> u32 { DEFAULT_BAUD_RATE }
fn default_read_buffer_size() -> usize { DEFAULT_READ_BUFFER_SIZE }

fn default_plot_fields() -> Vec<String> {
    vec!["Temp".to_string(), "Volt".to_string(), "Alt".to_string()]
}
fn default_window_size() -> usize { DEFAULT_WINDOW_SIZE }
fn default_refresh_interval_ms() -> u64 { 1000 }

fn default_export_on_exit() -> bool { true }
fn default_export_directory() -> String { "./exports".to_string() }

fn default_log_level() -> String { "info".to_string() }

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
            read_buffer_size: default_read_buffer_size(),
        }
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            fields: default_plot_fields(),
            window_size: default_window_size(),
            refresh_interval_ms: default_refresh_interval_ms(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            on_exit: default_export_on_exit(),
            directory: default_export_directory(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_dir: None,
        }
    }
}

impl ExportConfig {
    pub fn directory_path(&self) -> PathBuf {
        PathBuf::from(&self.directory)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use cubesat_telemetry::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Load from `path` if it exists, otherwise use the defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        // Validate serial port configuration
        if self.serial.port.is_empty() {
            return Err(invalid("serial port cannot be empty (use \"auto\" to auto-detect)"));
        }

        if ![9600, 19200, 38400, 57600, 115200, 230400].contains(&self.serial.baud_rate) {
            return Err(invalid(
                "baud_rate must be one of: 9600, 19200, 38400, 57600, 115200, 230400",
            ));
        }

        if self.serial.read_buffer_size == 0 || self.serial.read_buffer_size > 65536 {
            return Err(invalid("read_buffer_size must be between 1 and 65536"));
        }

        // Validate plot configuration
        for field in &self.plot.fields {
            if !registry::is_known(field) {
                return Err(invalid(format!(
                    "plot field '{}' is not a known telemetry field",
                    field
                )));
            }
        }

        if self.plot.window_size == 0 {
            return Err(invalid("window_size must be greater than 0"));
        }

        if self.plot.refresh_interval_ms == 0 || self.plot.refresh_interval_ms > 60000 {
            return Err(invalid("refresh_interval_ms must be between 1 and 60000"));
        }

        // Validate export configuration
        if self.export.on_exit && self.export.directory.is_empty() {
            return Err(invalid("export directory cannot be empty when on_exit is enabled"));
        }

        // Validate log level
        if !["trace", "debug", "info", "warn", "error"].contains(&self.logging.level.as_str()) {
            return Err(invalid("log level must be one of: trace, debug, info, warn, error"));
        }

        if matches!(&self.logging.log_dir, Some(dir) if dir.is_empty()) {
            return Err(invalid("log_dir cannot be empty when set"));
        }

        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> TelemetryError {
    TelemetryError::InvalidConfig(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_load_config_from_file() {
        let toml_content = r#"
[serial]
port = "/dev/ttyUSB1"

[plot]
fields = ["Pres", "Hum"]
window_size = 50

[export]
on_exit = false

[logging]
level = "debug"
log_dir = "./logs"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.serial.port, "/dev/ttyUSB1");
        assert_eq!(config.serial.baud_rate, 115200);
        assert_eq!(config.plot.fields, vec!["Pres", "Hum"]);
        assert_eq!(config.plot.window_size, 50);
        assert_eq!(config.plot.refresh_interval_ms, 1000);
        assert!(!config.export.on_exit);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.log_dir.as_deref(), Some("./logs"));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.serial.port, "auto");
        assert_eq!(config.plot.window_size, 100);
        assert_eq!(config.plot.fields, vec!["Temp", "Volt", "Alt"]);
        assert!(config.export.on_exit);
        assert_eq!(config.logging.log_dir, None);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.serial.baud_rate, 115200);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(dir.path().join("missing.toml"));
        assert!(matches!(result, Err(TelemetryError::Io(_))));
    }

    #[test]
    fn test_malformed_toml() {
        let result = Config::from_toml("[serial\nport = 1");
        assert!(matches!(result, Err(TelemetryError::Config(_))));
    }

    #[test]
    fn test_empty_serial_port() {
        let mut config = Config::default();
        config.serial.port = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_baud_rate() {
        let mut config = Config::default();
        config.serial.baud_rate = 420000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_baud_rates() {
        for &baud in &[9600, 19200, 38400, 57600, 115200, 230400] {
            let mut config = Config::default();
            config.serial.baud_rate = baud;
            assert!(config.validate().is_ok(), "Baud rate {} should be valid", baud);
        }
    }

    #[test]
    fn test_read_buffer_size_bounds() {
        let mut config = Config::default();
        config.serial.read_buffer_size = 0;
        assert!(config.validate().is_err());
        config.serial.read_buffer_size = 65537;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_plot_field() {
        let mut config = Config::default();
        config.plot.fields = vec!["Temp".to_string(), "temp".to_string()];
        match config.validate() {
            Err(TelemetryError::InvalidConfig(msg)) => assert!(msg.contains("'temp'")),
            other => panic!("Expected InvalidConfig, got: {:?}", other),
        }
    }

    #[test]
    fn test_empty_plot_fields_allowed() {
        let mut config = Config::default();
        config.plot.fields.clear();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_window_size_zero() {
        let mut config = Config::default();
        config.plot.window_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_refresh_interval_bounds() {
        let mut config = Config::default();
        config.plot.refresh_interval_ms = 0;
        assert!(config.validate().is_err());
        config.plot.refresh_interval_ms = 60001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_export_directory() {
        let mut config = Config::default();
        config.export.directory = String::new();
        assert!(config.validate().is_err());

        config.export.on_exit = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_log_dir() {
        let mut config = Config::default();
        config.logging.log_dir = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_serial_port(), "auto");
        assert_eq!(default_baud_rate(), 115200);
        assert_eq!(default_read_buffer_size(), 1024);
        assert_eq!(default_window_size(), 100);
        assert_eq!(default_refresh_interval_ms(), 1000);
        assert_eq!(default_export_on_exit(), true);
        assert_eq!(default_export_directory(), "./exports");
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn test_defaults_match_module_constants() {
        let config = Config::default();
        assert_eq!(config.serial.baud_rate, DEFAULT_BAUD_RATE);
        assert_eq!(config.serial.read_buffer_size, DEFAULT_READ_BUFFER_SIZE);
        assert_eq!(config.plot.window_size, DEFAULT_WINDOW_SIZE);
    }
}
