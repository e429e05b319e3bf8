//! # Live Display
//!
//! Terminal rendering of live telemetry.

use std::fmt::Write;

use super::aggregator::{value_range, LatestValues, Sample};
use super::registry;

/// Shown for fields not received yet
pub const PLACEHOLDER: &str = "--";

/// One line per registry field: `Name: value unit`, or the placeholder
pub fn render_latest(latest: &LatestValues) -> String {
    let mut out = String::new();
    for (name, value) in latest.iter() {
        let unit = registry::unit(name);
        let shown = match value {
            Some(value) if !unit.is_empty() => format!("{} {}", value, unit),
            Some(value) => value.to_string(),
            None => PLACEHOLDER.to_string(),
        };
        // Writing to a String cannot fail
        let _ = writeln!(out, "{:>8}: {}", name, shown);
    }
    out
}

/// One-line summary of a recent window for `field`.
///
/// Samples without a value count toward the window length but not toward the
/// plotted points or the range.
pub fn render_window(field: &str, samples: &[Sample]) -> String {
    let points = samples.iter().filter(|s| s.value.is_some()).count();
    let last = samples.iter().rev().find_map(|s| s.value);
    let unit = registry::unit(field);

    match (last, value_range(samples)) {
        (Some(last), Some((min, max))) => format!(
            "{}: {} points of {}, last {:.2}{u} [min {:.2}{u}, max {:.2}{u}]",
            field,
            points,
            samples.len(),
            last,
            min,
            max,
            u = unit,
        ),
        _ => format!("{}: no numeric samples in last {} frames", field, samples.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::aggregator::Aggregator;

    #[test]
    fn test_render_latest_uses_placeholder() {
        let agg = Aggregator::new();
        agg.append("🔹 Temp:23.5 Lat:-34,6");

        let text = render_latest(&agg.latest_values());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), registry::FIELD_COUNT);
        assert_eq!(lines[0].trim(), "Volt: --");
        assert!(lines.iter().any(|l| l.trim() == "Temp: 23.5 °C"));
        // Unitless fields get no trailing unit
        assert!(lines.iter().any(|l| l.trim() == "Lat: -34,6"));
    }

    #[test]
    fn test_render_window() {
        let agg = Aggregator::new();
        agg.append("🔹 Alt:100m");
        agg.append("🔹 Temp:1");
        agg.append("🔹 Alt:120m");

        let line = render_window("Alt", &agg.recent_window("Alt", 10));
        assert_eq!(line, "Alt: 2 points of 3, last 120.00m [min 100.00m, max 120.00m]");
    }

    #[test]
    fn test_render_window_without_values() {
        let agg = Aggregator::new();
        agg.append("🔹 Temp:1");
        let line = render_window("Hum", &agg.recent_window("Hum", 10));
        assert_eq!(line, "Hum: no numeric samples in last 1 frames");
    }
}
