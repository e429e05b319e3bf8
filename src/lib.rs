//! # CubeSat Telemetry Library
//!
//! Receive CubeSat telemetry from a LoRa ground-station receiver over serial.
//!
//! This library provides the core functionality for decoding telemetry lines,
//! keeping a session log with rolling per-field windows, and exporting the
//! session to CSV.

pub mod config;
pub mod error;
pub mod logging;
pub mod serial;
pub mod telemetry;
