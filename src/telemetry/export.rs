//! # CSV Export
//!
//! Writes the session log as a table: one row per frame, one column per
//! registry field. Values are written exactly as received so units and decimal
//! commas survive. The file starts with a UTF-8 byte-order mark so spreadsheet
//! tools pick the right encoding.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing::info;

use super::frame::TelemetryFrame;
use super::registry;
use crate::error::{Result, TelemetryError};

/// First header cell
pub const DATETIME_HEADER: &str = "Datetime";

/// UTF-8 byte-order mark
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Header row: `Datetime` followed by every registry field name
pub fn header() -> Vec<&'static str> {
    std::iter::once(DATETIME_HEADER)
        .chain(registry::names())
        .collect()
}

/// Write `frames` as CSV to `writer`, returning the number of data rows.
///
/// # Errors
///
/// Returns [`TelemetryError::NothingToExport`] without writing anything when
/// `frames` is empty, or a CSV/I/O error from the underlying writer.
pub fn write_csv<W: Write>(frames: &[Arc<TelemetryFrame>], mut writer: W) -> Result<usize> {
    if frames.is_empty() {
        return Err(TelemetryError::NothingToExport);
    }

    writer.write_all(UTF8_BOM)?;

    let mut out = csv::Writer::from_writer(writer);
    out.write_record(header())?;

    for frame in frames {
        let mut fields = frame.fields();
        let mut row = Vec::with_capacity(registry::FIELD_COUNT + 1);
        row.push(frame.formatted_timestamp());
        row.extend(registry::names().map(|name| fields.remove(name).unwrap_or_default()));
        out.write_record(&row)?;
    }

    out.flush()?;
    Ok(frames.len())
}

/// Export `frames` to a file at `path`.
///
/// The file is only created when there is something to write.
pub fn export_to_path(frames: &[Arc<TelemetryFrame>], path: &Path) -> Result<usize> {
    if frames.is_empty() {
        return Err(TelemetryError::NothingToExport);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = BufWriter::new(File::create(path)?);
    let rows = write_csv(frames, file)?;
    info!("Exported {} frames to {}", rows, path.display());
    Ok(rows)
}

/// Default export file name for a session ending at `now`
pub fn default_file_name(now: DateTime<Local>) -> String {
    format!("telemetry_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

/// Default export path inside `directory`
pub fn default_export_path(directory: &Path, now: DateTime<Local>) -> PathBuf {
    directory.join(default_file_name(now))
}
