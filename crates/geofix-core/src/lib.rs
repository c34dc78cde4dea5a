//! GeoFix Core Types
//!
//! This crate defines the unit of ingestion for the GeoFix tracking
//! pipeline - the [`LocationFix`] - and the wire decoder that turns a raw
//! payload into one.
//!
//! ## What Is a Fix?
//!
//! Remote tracking clients periodically report their position as a small
//! UTF-8 JSON document:
//!
//! ```json
//! {"latitude": 19.432608, "longitude": -99.133209, "altitude": 2240.5,
//!  "timestamp": "2024-01-01 12:00:00"}
//! ```
//!
//! `altitude` is optional - some receiver variants never report it.
//! Timestamps are client-supplied naive local time with second
//! resolution; this crate performs no timezone normalization.
//!
//! ## Decoding
//!
//! [`decode`] is a pure, total function: for any byte sequence it either
//! produces a valid [`LocationFix`] or a [`DecodeError`], and it never
//! panics. Listeners call it on every datagram and every accepted
//! connection payload; a decode failure is always recoverable.
//!
//! ## What Lives Elsewhere
//!
//! Persistence (and the `receiver_id` that gets attached at write time)
//! lives in `geofix-store`. The socket listeners live in
//! `geofix-ingest`. This crate does no I/O.

pub mod decode;
pub mod error;
pub mod fix;

pub use decode::decode;
pub use error::{DecodeError, Result};
pub use fix::{LocationFix, TIMESTAMP_FORMAT};
