//! API models for the read endpoints.
//!
//! Coordinates are serialized as fixed-precision strings (6 decimals
//! for degrees, 2 for altitude meters) because the dashboard renders
//! them verbatim.

use serde::{Deserialize, Serialize};

use geofix_core::TIMESTAMP_FORMAT;
use geofix_store::FixRecord;

/// Placeholder rendered by the dashboard while no real data is
/// available - returned both for an empty store and for an unreachable
/// one.
pub const NO_FIX_SENTINEL: &str = "waiting for fix";

#[derive(Debug, Serialize, Deserialize)]
pub struct LocationResponse {
    pub latitude: String,
    pub longitude: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude: Option<String>,
    pub datetime: String,
}

impl LocationResponse {
    /// The documented sentinel payload (altitude omitted).
    pub fn sentinel() -> Self {
        Self {
            latitude: NO_FIX_SENTINEL.to_string(),
            longitude: NO_FIX_SENTINEL.to_string(),
            altitude: None,
            datetime: NO_FIX_SENTINEL.to_string(),
        }
    }

    pub fn from_record(record: &FixRecord) -> Self {
        Self {
            latitude: format!("{:.6}", record.latitude),
            longitude: format!("{:.6}", record.longitude),
            altitude: record.altitude.map(|a| format!("{:.2}", a)),
            datetime: record.timestamp.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub locations: Vec<LocationResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub start: Option<String>,
    pub end: Option<String>,
}
