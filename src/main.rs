//! # CubeSat Telemetry
//!
//! Receive CubeSat telemetry from a LoRa ground-station receiver over serial.
//!
//! This application reads telemetry lines from the receiver, shows the latest
//! value of every field on the terminal, and exports the session to CSV on
//! exit.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

use cubesat_telemetry::config::{Config, ExportConfig, PlotConfig, DEFAULT_CONFIG_PATH};
use cubesat_telemetry::error::TelemetryError;
use cubesat_telemetry::logging;
use cubesat_telemetry::serial::reader::{pump, LineReader};
use cubesat_telemetry::serial::{list_ports, TelemetrySerial};
use cubesat_telemetry::telemetry::{display, export, Aggregator};

/// Command-line options
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(version, about = "Receive CubeSat LoRa telemetry over serial")]
struct Options {
    /// Configuration file (defaults are used when it does not exist)
    #[arg(default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// List available serial ports and exit
    #[arg(long)]
    list_ports: bool,

    /// Print each received frame as a JSON line instead of the live view
    #[arg(long)]
    json: bool,
}

/// Main entry point
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (defaults when the file is missing)
///    - Set up logging
///    - Open the receiver serial port
///
/// 2. **Main Loop**
///    - A spawned task reads lines and appends frames to the session log
///    - Every refresh interval, print the latest values and recent windows
///    - Handle Ctrl+C for graceful shutdown
///
/// 3. **Shutdown**
///    - Stop the reader task
///    - Export the session to CSV if enabled
///
/// A lost connection ends the reader task only; the display keeps showing
/// the data received so far until Ctrl+C.
#[tokio::main]
async fn main() -> Result<()> {
    let options = Options::parse();
    let config = Config::load_or_default(&options.config)?;
    let _log_guard = logging::init(&config.logging);

    info!("CubeSat Telemetry v{} starting...", env!("CARGO_PKG_VERSION"));

    if options.list_ports {
        let ports = list_ports()?;
        if ports.is_empty() {
            println!("No serial ports available");
        }
        for port in ports {
            println!("{}", port);
        }
        return Ok(());
    }

    let serial = TelemetrySerial::open_config(&config.serial)?;
    info!(
        "Receiver serial port opened at: {} ({} baud)",
        serial.device_path(),
        config.serial.baud_rate
    );

    let aggregator = Arc::new(Aggregator::new());
    let reader = LineReader::with_read_size(serial.into_stream(), config.serial.read_buffer_size);

    let json = options.json;
    let mut producer = tokio::spawn(pump(reader, Arc::clone(&aggregator), move |frame| {
        if json {
            match frame.to_json() {
                Ok(line) => println!("{}", line),
                Err(e) => debug!("Failed to serialize frame: {}", e),
            }
        }
    }));
    let mut producer_running = true;

    let mut refresh = interval(Duration::from_millis(config.plot.refresh_interval_ms));

    info!("Receiving telemetry, press Ctrl+C to exit");

    loop {
        tokio::select! {
            _ = refresh.tick() => {
                if !json {
                    print_dashboard(&aggregator, &config.plot);
                }
            }

            result = &mut producer, if producer_running => {
                producer_running = false;
                match result {
                    Ok(Ok(stats)) => info!(
                        "Receiver disconnected: {} frames, {} notices, {} other lines",
                        stats.frames, stats.notices, stats.ignored
                    ),
                    Ok(Err(e)) => warn!("Receiver connection lost: {}", e),
                    Err(e) => warn!("Reader task failed: {}", e),
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    producer.abort();
    info!("Total frames received: {}", aggregator.len());

    if config.export.on_exit {
        export_session(&aggregator, &config.export)?;
    }

    Ok(())
}

fn print_dashboard(aggregator: &Aggregator, plot: &PlotConfig) {
    println!("==== {} | {} frames ====", Local::now().format("%H:%M:%S"), aggregator.len());
    print!("{}", display::render_latest(&aggregator.latest_values()));

    for field in &plot.fields {
        let window = aggregator.recent_window(field, plot.window_size);
        println!("{}", display::render_window(field, &window));
    }
}

/// Export the session log, treating an empty log as informational
fn export_session(aggregator: &Aggregator, config: &ExportConfig) -> Result<()> {
    let path = export::default_export_path(&config.directory_path(), Local::now());

    match export::export_to_path(&aggregator.snapshot(), &path) {
        Ok(rows) => {
            println!("Exported {} frames to {}", rows, path.display());
            Ok(())
        }
        Err(TelemetryError::NothingToExport) => {
            info!("No telemetry received, nothing to export");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
