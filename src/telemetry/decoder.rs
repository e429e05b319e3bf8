//! # Telemetry Line Decoder
//!
//! Decodes text lines received from the LoRa ground-station module.
//!
//! The module prints two kinds of lines worth recognising:
//! - a "message received" notice, which is noise and is discarded
//! - a telemetry line, `🔹` followed by space-separated `key:value` tokens
//!
//! Everything else is ignored.

use std::collections::BTreeMap;

use tracing::debug;

use super::registry;

/// Marker that opens every telemetry line
pub const FRAME_MARKER: &str = "🔹";

/// Notice printed by the receiver module before each telemetry line
pub const RECEIVED_NOTICE: &str = "📥 LoRa Message Received:";

/// Separator between a field name and its value
pub const FIELD_SEPARATOR: char = ':';

/// Decoded field values keyed by canonical registry name
pub type FieldMap = BTreeMap<&'static str, String>;

/// Classification of one received line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// "Message received" notice, discarded
    Notice,
    /// Telemetry line; holds the payload with the marker stripped
    Frame(&'a str),
    /// Anything else, ignored
    Other,
}

/// Classify a received line.
///
/// The line is trimmed before matching. For telemetry lines the returned
/// payload has the marker and surrounding whitespace removed.
///
/// # Examples
///
/// ```
/// use cubesat_telemetry::telemetry::decoder::{classify_line, LineKind};
///
/// assert_eq!(classify_line("📥 LoRa Message Received:"), LineKind::Notice);
/// assert_eq!(classify_line("🔹 Temp:23.5"), LineKind::Frame("Temp:23.5"));
/// assert_eq!(classify_line("booting..."), LineKind::Other);
/// ```
pub fn classify_line(line: &str) -> LineKind<'_> {
    let line = line.trim();

    if line.starts_with(RECEIVED_NOTICE) {
        LineKind::Notice
    } else if let Some(payload) = line.strip_prefix(FRAME_MARKER) {
        LineKind::Frame(payload.trim())
    } else {
        LineKind::Other
    }
}

/// Extract the telemetry payload from a line, if it is a telemetry line
pub fn extract_payload(line: &str) -> Option<&str> {
    match classify_line(line) {
        LineKind::Frame(payload) => Some(payload),
        LineKind::Notice | LineKind::Other => None,
    }
}

/// Parse a telemetry payload into field values.
///
/// Tokens are separated by whitespace. Only tokens containing `:` are field
/// assignments; the first `:` splits name from value. Unknown names are
/// dropped. A token whose value holds another `:` is malformed and skipped
/// on its own; the remaining tokens are still parsed. When a name repeats,
/// the last value wins.
pub fn parse_fields(payload: &str) -> FieldMap {
    let mut fields = FieldMap::new();

    for token in payload.split_whitespace() {
        let Some((key, value)) = token.split_once(FIELD_SEPARATOR) else {
            continue;
        };

        if value.contains(FIELD_SEPARATOR) {
            debug!("Skipping malformed token: {}", token);
            continue;
        }

        match registry::canonical(key.trim()) {
            Some(name) => {
                fields.insert(name, value.trim().to_string());
            }
            None => debug!("Dropping unknown field: {}", key),
        }
    }

    fields
}
