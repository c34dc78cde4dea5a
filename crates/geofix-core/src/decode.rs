//! Wire Decoder
//!
//! Parses a raw ingest payload into a [`LocationFix`].
//!
//! The wire encoding is a flat JSON object (see crate docs). The decoder
//! is deliberately hand-rolled over `serde_json::Value` instead of using
//! a derived struct: the error taxonomy distinguishes a missing key from
//! a malformed document from a bad timestamp, and serde's derived errors
//! collapse all three into one.
//!
//! JSON numbers are always finite, so the finiteness requirement on
//! latitude/longitude holds by construction.

use chrono::NaiveDateTime;
use serde_json::Value;

use crate::error::{DecodeError, Result};
use crate::fix::{LocationFix, TIMESTAMP_FORMAT};

/// Decode one raw payload into a [`LocationFix`].
///
/// Pure and total: any byte sequence yields either a fix or a
/// [`DecodeError`], never a panic.
pub fn decode(raw: &[u8]) -> Result<LocationFix> {
    let text = std::str::from_utf8(raw).map_err(|_| DecodeError::Syntax)?;
    let value: Value = serde_json::from_str(text.trim()).map_err(|_| DecodeError::Syntax)?;
    let obj = value.as_object().ok_or(DecodeError::Syntax)?;

    let latitude = number_field(obj, "latitude")?;
    let longitude = number_field(obj, "longitude")?;

    // Optional; JSON null is treated the same as absent.
    let altitude = match obj.get("altitude") {
        None | Some(Value::Null) => None,
        Some(v) => Some(v.as_f64().ok_or(DecodeError::Syntax)?),
    };

    let ts = obj
        .get("timestamp")
        .ok_or(DecodeError::MissingField("timestamp"))?
        .as_str()
        .ok_or(DecodeError::BadTimestamp)?;
    let timestamp =
        NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).map_err(|_| DecodeError::BadTimestamp)?;

    Ok(LocationFix {
        latitude,
        longitude,
        altitude,
        timestamp,
    })
}

fn number_field(obj: &serde_json::Map<String, Value>, name: &'static str) -> Result<f64> {
    obj.get(name)
        .ok_or(DecodeError::MissingField(name))?
        .as_f64()
        .ok_or(DecodeError::Syntax)
}
