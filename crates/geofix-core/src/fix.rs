//! Location Fix
//!
//! One reported position sample from a tracked device. A fix is
//! constructed transiently by the decoder for the duration of a single
//! ingest request; it either becomes a persisted row or is discarded.
//!
//! `receiver_id` is deliberately not a field here - it identifies the
//! ingestion node, is fixed per deployment, and is injected by the
//! persistence gateway at write time, never taken from the client.

use chrono::NaiveDateTime;

/// Fixed wire pattern for fix timestamps: `2024-01-01 12:00:00`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single decoded location fix, as reported by a tracking client.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationFix {
    /// Signed degrees, finite.
    pub latitude: f64,
    /// Signed degrees, finite.
    pub longitude: f64,
    /// Meters. Absent on receiver variants that do not report altitude.
    pub altitude: Option<f64>,
    /// Client-supplied naive local time, second resolution.
    pub timestamp: NaiveDateTime,
}
