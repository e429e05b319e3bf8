//! # Numeric Extractor
//!
//! Best-effort conversion of raw telemetry values to `f64`. Values arrive with
//! units glued on ("12.3m", "-4,5°C") and sometimes with a decimal comma, so
//! the first embedded numeric literal is taken.

/// Extract the first numeric literal from a raw value string.
///
/// A decimal comma is normalized to a point first. The literal is an optional
/// sign, one or more ASCII digits, and an optional fractional part (a point
/// followed by at least one digit). Returns `None` when no literal is found.
///
/// # Examples
///
/// ```
/// use cubesat_telemetry::telemetry::numeric::extract_number;
///
/// assert_eq!(extract_number("12.3m"), Some(12.3));
/// assert_eq!(extract_number("-4,5°C"), Some(-4.5));
/// assert_eq!(extract_number("abc"), None);
/// ```
pub fn extract_number(raw: &str) -> Option<f64> {
    let normalized = raw.replace(',', ".");
    let bytes = normalized.as_bytes();

    let start = bytes.iter().position(u8::is_ascii_digit)?;

    // Only a sign directly in front of the first digit run belongs to it
    let literal_start = match start.checked_sub(1).map(|i| bytes[i]) {
        Some(b'-') | Some(b'+') => start - 1,
        _ => start,
    };

    let mut end = start + count_digits(&bytes[start..]);

    if bytes.get(end) == Some(&b'.') {
        let fraction = count_digits(&bytes[end + 1..]);
        if fraction > 0 {
            end += 1 + fraction;
        }
    }

    // The slice is pure ASCII so it is always a valid str boundary
    normalized[literal_start..end].parse().ok()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
