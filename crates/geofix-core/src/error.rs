//! Decode Error Types
//!
//! This module defines the error taxonomy for wire decoding.
//!
//! ## Error Categories
//!
//! - `Syntax`: payload is not valid UTF-8 JSON, not an object, or a
//!   coordinate field is present but not a number
//! - `MissingField`: a required key (`latitude`, `longitude`,
//!   `timestamp`) is absent
//! - `BadTimestamp`: `timestamp` is not a string matching
//!   `YYYY-MM-DD HH:MM:SS`
//!
//! Every variant is recoverable: the listener logs it, discards the
//! payload, and keeps serving. Nothing in here is ever fatal to the
//! process.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DecodeError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed payload: not a valid JSON object")]
    Syntax,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("timestamp does not match YYYY-MM-DD HH:MM:SS")]
    BadTimestamp,
}
