//! # Time-Series Aggregator
//!
//! Append-only session log of received frames, with per-field numeric windows
//! derived on demand for plotting.
//!
//! The serial reader task is the only writer; the display loop and the CSV
//! exporter read through snapshots. Frames are never evicted.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Local};
use tracing::debug;

use super::decoder;
use super::frame::TelemetryFrame;
use super::numeric::extract_number;
use super::registry::{self, FIELD_COUNT};

/// Default number of samples in a recent window
pub const DEFAULT_WINDOW_SIZE: usize = 100;

/// One point of a recent window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Arrival time of the frame this sample came from
    pub timestamp: DateTime<Local>,

    /// Numeric value, `None` if the frame lacks the field or it is not numeric
    pub value: Option<f64>,
}

/// Most recent raw value of every registry field, in registry order
///
/// `None` means the field has not been received this session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LatestValues {
    values: [Option<String>; FIELD_COUNT],
}

impl LatestValues {
    /// Most recent raw value of `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        registry::index_of(name).and_then(|i| self.values[i].as_deref())
    }

    /// `(name, value)` pairs in registry order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<&str>)> + '_ {
        registry::names().zip(self.values.iter().map(Option::as_deref))
    }
}

/// Session log of telemetry frames
#[derive(Debug, Default)]
pub struct Aggregator {
    log: RwLock<Vec<Arc<TelemetryFrame>>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a received line and append it, stamped with the current time.
    ///
    /// Returns the new frame, or `None` if the line is not a telemetry line
    /// (the log is then unchanged).
    pub fn append(&self, line: &str) -> Option<Arc<TelemetryFrame>> {
        self.append_at(line, Local::now())
    }

    /// Same as [`append`](Self::append) with an explicit arrival time
    pub fn append_at(
        &self,
        line: &str,
        timestamp: DateTime<Local>,
    ) -> Option<Arc<TelemetryFrame>> {
        let Some(payload) = decoder::extract_payload(line) else {
            debug!("Not a telemetry line: {:?}", line);
            return None;
        };

        let frame = Arc::new(TelemetryFrame::new(timestamp, payload));
        self.write_log().push(Arc::clone(&frame));
        Some(frame)
    }

    /// Numeric samples of `field` from the last `limit` frames, oldest first.
    ///
    /// Every frame in the window yields a sample so that windows of different
    /// fields stay aligned in time; frames without a usable value yield `None`.
    pub fn recent_window(&self, field: &str, limit: usize) -> Vec<Sample> {
        let log = self.read_log();
        let start = log.len().saturating_sub(limit);

        log[start..]
            .iter()
            .map(|frame| Sample {
                timestamp: frame.timestamp(),
                value: frame.field(field).as_deref().and_then(extract_number),
            })
            .collect()
    }

    /// Copy of the full log, in arrival order
    pub fn snapshot(&self) -> Vec<Arc<TelemetryFrame>> {
        self.read_log().clone()
    }

    /// Most recent raw value of every registry field
    pub fn latest_values(&self) -> LatestValues {
        let log = self.read_log();
        let mut latest = LatestValues::default();
        let mut missing = FIELD_COUNT;

        // Walk backwards and stop once every field has been seen
        for frame in log.iter().rev() {
            for (name, value) in frame.fields() {
                if let Some(i) = registry::index_of(name) {
                    if latest.values[i].is_none() {
                        latest.values[i] = Some(value);
                        missing -= 1;
                    }
                }
            }
            if missing == 0 {
                break;
            }
        }

        latest
    }

    /// Number of frames received
    pub fn len(&self) -> usize {
        self.read_log().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A poisoned lock only means a reader panicked mid-read; the Vec itself
    // is never left half-updated, so keep serving it.
    fn read_log(&self) -> RwLockReadGuard<'_, Vec<Arc<TelemetryFrame>>> {
        self.log.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_log(&self) -> RwLockWriteGuard<'_, Vec<Arc<TelemetryFrame>>> {
        self.log.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Y-axis bounds of a window: `(min, max)` over samples that have a value
pub fn value_range(samples: &[Sample]) -> Option<(f64, f64)> {
    samples
        .iter()
        .filter_map(|s| s.value)
        .fold(None, |range, v| match range {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
