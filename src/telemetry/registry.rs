//! # Field Registry
//!
//! The fixed, ordered set of telemetry fields the CubeSat transmits, with
//! their display units. Registry order drives display and CSV column order.

/// Static descriptor of one telemetry field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Canonical field name as sent on the wire (e.g. "Temp")
    pub name: &'static str,

    /// Display unit, empty when the field is unitless
    pub unit: &'static str,
}

impl FieldSpec {
    const fn new(name: &'static str, unit: &'static str) -> Self {
        Self { name, unit }
    }
}

/// Number of known telemetry fields
pub const FIELD_COUNT: usize = 20;

/// All known telemetry fields, in display order
pub const FIELDS: [FieldSpec; FIELD_COUNT] = [
    FieldSpec::new("Volt", "V"),
    FieldSpec::new("Descent", "m/s"),
    FieldSpec::new("Temp", "°C"),
    FieldSpec::new("BMP_T", "°C"),
    FieldSpec::new("Pres", "hPa"),
    FieldSpec::new("Hum", "%"),
    FieldSpec::new("GyX", "°/s"),
    FieldSpec::new("GyY", "°/s"),
    FieldSpec::new("GyZ", "°/s"),
    FieldSpec::new("AccX", "m/s²"),
    FieldSpec::new("AccY", "m/s²"),
    FieldSpec::new("AccZ", "m/s²"),
    FieldSpec::new("MagX", "µT"),
    FieldSpec::new("MagY", "µT"),
    FieldSpec::new("MagZ", "µT"),
    FieldSpec::new("Head", "°"),
    FieldSpec::new("Alt", "m"),
    FieldSpec::new("Lat", ""),
    FieldSpec::new("Lon", ""),
    FieldSpec::new("AltGPS", "m"),
];

/// Look up the canonical name for a decoded key.
///
/// Matching is exact: no case folding, no fuzzy aliases. The returned
/// `&'static str` lets decoded maps key on registry names without allocating.
pub fn canonical(key: &str) -> Option<&'static str> {
    FIELDS.iter().find(|spec| spec.name == key).map(|spec| spec.name)
}

/// Whether `name` is a known field
pub fn is_known(name: &str) -> bool {
    canonical(name).is_some()
}

/// Display unit for `name`, or `""` for unknown or unitless fields
pub fn unit(name: &str) -> &'static str {
    FIELDS
        .iter()
        .find(|spec| spec.name == name)
        .map(|spec| spec.unit)
        .unwrap_or("")
}

/// Position of `name` in registry order
pub fn index_of(name: &str) -> Option<usize> {
    FIELDS.iter().position(|spec| spec.name == name)
}

/// Field names in registry order
pub fn names() -> impl Iterator<Item = &'static str> {
    FIELDS.iter().map(|spec| spec.name)
}
