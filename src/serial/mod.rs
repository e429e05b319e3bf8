//! # Serial Communication Module
//!
//! Handles the serial link to the LoRa ground-station receiver.
//!
//! This module handles:
//! - Listing available serial ports
//! - Opening the receiver port at 115,200 baud (8N1)
//! - Auto-detecting the receiver on common device paths
//! - Splitting the byte stream into text lines (see [`reader`])

pub mod reader;

use crate::config::SerialConfig;
use crate::error::{Result, TelemetryError};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, warn};

/// Default baud rate of the LoRa receiver
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Port setting that requests auto-detection
pub const AUTO_PORT: &str = "auto";

/// Default receiver device paths to try (in order of preference)
const DEFAULT_DEVICE_PATHS: &[&str] = &[
    "/dev/ttyUSB0", // USB-to-serial bridges (CP210x, CH340) on most LoRa boards
    "/dev/ttyACM0", // Native USB CDC boards
];

/// Names of the serial ports currently available on this machine
pub fn list_ports() -> Result<Vec<String>> {
    let ports = tokio_serial::available_ports()
        .map_err(|e| TelemetryError::Serial(format!("Failed to list ports: {}", e)))?;

    Ok(ports.into_iter().map(|p| p.port_name).collect())
}

/// Receiver Serial Port Handler
///
/// Owns the open connection to the LoRa receiver.
pub struct TelemetrySerial {
    /// Serial port handle
    port: tokio_serial::SerialStream,
    /// Device path (e.g., /dev/ttyUSB0)
    device_path: String,
}

impl std::fmt::Debug for TelemetrySerial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetrySerial")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl TelemetrySerial {
    /// Open the port named in the serial configuration.
    ///
    /// A port of `auto` tries the default device paths in order.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use cubesat_telemetry::config::SerialConfig;
    /// use cubesat_telemetry::serial::TelemetrySerial;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let serial = TelemetrySerial::open_config(&SerialConfig::default())?;
    ///     println!("Connected to: {}", serial.device_path());
    ///     Ok(())
    /// }
    /// ```
    pub fn open_config(config: &SerialConfig) -> Result<Self> {
        if config.port == AUTO_PORT {
            Self::open_with_paths(DEFAULT_DEVICE_PATHS, config.baud_rate)
        } else {
            Self::open(&config.port, config.baud_rate)
        }
    }

    /// Open a specific port
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::Serial`] if the port is absent or busy
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        let port = Self::open_port(path, baud_rate)?;
        info!("Successfully opened receiver at {} ({} baud)", path, baud_rate);
        Ok(Self {
            port,
            device_path: path.to_string(),
        })
    }

    /// Open the first of `paths` that succeeds
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::SerialPortNotFound`] listing every path tried
    pub fn open_with_paths(paths: &[&str], baud_rate: u32) -> Result<Self> {
        for path in paths {
            debug!("Trying to open serial port: {}", path);

            match Self::open(path, baud_rate) {
                Ok(serial) => return Ok(serial),
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                    continue;
                }
            }
        }

        Err(TelemetryError::SerialPortNotFound(paths.join(", ")))
    }

    /// Open a port with 8N1 settings and no flow control
    fn open_port(path: &str, baud_rate: u32) -> Result<tokio_serial::SerialStream> {
        let port = tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| TelemetryError::Serial(format!("Failed to open {}: {}", path, e)))?;

        Ok(port)
    }

    /// Device path of the opened port
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Give up the handle, yielding the async byte stream
    pub fn into_stream(self) -> tokio_serial::SerialStream {
        self.port
    }
}
