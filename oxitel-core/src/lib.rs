use serde::{Deserialize, Serialize};

pub mod protocol;

/// Identifier of the person a measurement cycle belongs to.
///
/// Stored alongside each aggregate in the relational sink. Passed on the
/// command line; defaults to `1` when omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectId(pub i64);

/// One decoded frame worth of vitals.
///
/// Both fields are whole numbers; with two BCD byte pairs per field the
/// representable range is 0–9999, though real devices stay well inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VitalSample {
    /// Heart rate in beats per minute.
    pub heart_rate: u16,
    /// Blood-oxygen saturation in percent.
    pub spo2: u16,
}

/// The reduced result of one measurement cycle.
///
/// Averages default to `0.0` when the cycle produced no usable samples.
/// The date is stamped when aggregation completes, at day granularity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRecord {
    pub avg_heart_rate: f64,
    pub avg_spo2: f64,
    pub measured_on: jiff::civil::Date,
}
