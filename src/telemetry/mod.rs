//! # Telemetry Module
//!
//! Decoding, aggregation and export of CubeSat telemetry lines.
//!
//! This module handles:
//! - Recognising telemetry lines and parsing `key:value` fields
//! - The fixed registry of known fields and units
//! - The append-only session log and rolling numeric windows
//! - Best-effort numeric extraction from raw values
//! - CSV export and terminal rendering

pub mod aggregator;
pub mod decoder;
pub mod display;
pub mod export;
pub mod frame;
pub mod numeric;
pub mod registry;

pub use aggregator::{Aggregator, LatestValues, Sample};
pub use frame::TelemetryFrame;
