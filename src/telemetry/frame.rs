//! # Telemetry Frame
//!
//! One accepted telemetry line, stamped with its arrival time.

use chrono::{DateTime, Local, SubsecRound};
use serde::Serialize;

use super::decoder::{self, FieldMap};

/// Timestamp format used for display and CSV export
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A received telemetry frame
///
/// Only the payload text is stored; field values are decoded on demand so the
/// frame always reflects exactly what was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryFrame {
    timestamp: DateTime<Local>,
    raw_line: String,
}

/// Serializable view of a frame, one JSON object per line in `--json` mode
#[derive(Debug, Serialize)]
struct FrameRecord<'a> {
    timestamp: String,
    raw: &'a str,
    fields: FieldMap,
}

impl TelemetryFrame {
    /// Create a frame from a payload, truncating the timestamp to whole seconds
    pub fn new(timestamp: DateTime<Local>, raw_line: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(0),
            raw_line: raw_line.into(),
        }
    }

    /// Arrival time (second resolution)
    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    /// Payload as received, with the marker stripped
    pub fn raw_line(&self) -> &str {
        &self.raw_line
    }

    /// Decoded field values
    pub fn fields(&self) -> FieldMap {
        decoder::parse_fields(&self.raw_line)
    }

    /// Raw value of a single field, if present in this frame
    pub fn field(&self, name: &str) -> Option<String> {
        self.fields().remove(name)
    }

    /// Timestamp formatted as `YYYY-MM-DD HH:MM:SS`
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Render the frame as a single-line JSON object
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&FrameRecord {
            timestamp: self.formatted_timestamp(),
            raw: &self.raw_line,
            fields: self.fields(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 6, 1, h, m, s).unwrap()
    }

    #[test]
    fn test_timestamp_truncated_to_seconds() {
        let ts = at(12, 0, 5) + chrono::Duration::milliseconds(750);
        let frame = TelemetryFrame::new(ts, "Temp:20");
        assert_eq!(frame.timestamp().nanosecond(), 0);
        assert_eq!(frame.timestamp().second(), 5);
    }

    #[test]
    fn test_formatted_timestamp() {
        let frame = TelemetryFrame::new(at(9, 3, 7), "Temp:20");
        assert_eq!(frame.formatted_timestamp(), "2025-06-01 09:03:07");
    }

    #[test]
    fn test_fields_decoded_on_demand() {
        let frame = TelemetryFrame::new(at(0, 0, 0), "Temp:23.5 Volt:3,7 Junk");
        let fields = frame.fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(frame.field("Volt").as_deref(), Some("3,7"));
        assert_eq!(frame.field("Alt"), None);
        assert_eq!(frame.raw_line(), "Temp:23.5 Volt:3,7 Junk");
    }

    #[test]
    fn test_to_json() {
        let frame = TelemetryFrame::new(at(10, 20, 30), "Temp:23.5 Alt:102m");
        let json: serde_json::Value = serde_json::from_str(&frame.to_json().unwrap()).unwrap();
        assert_eq!(json["timestamp"], "2025-06-01 10:20:30");
        assert_eq!(json["raw"], "Temp:23.5 Alt:102m");
        assert_eq!(json["fields"]["Temp"], "23.5");
        assert_eq!(json["fields"]["Alt"], "102m");
    }
}
