//! Store-facing types.

use chrono::NaiveDateTime;
use std::fmt;

/// Result of an idempotent fix write.
///
/// Both variants are success: `Duplicate` means the row was already
/// durable before this call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A new row was persisted.
    Inserted,
    /// The storage-enforced `(timestamp, receiver_id)` key already
    /// existed; nothing was written.
    Duplicate,
}

impl fmt::Display for RecordOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordOutcome::Inserted => write!(f, "inserted"),
            RecordOutcome::Duplicate => write!(f, "duplicate"),
        }
    }
}

/// A persisted fix as read back from storage.
///
/// Unlike the transient `LocationFix`, a record carries the
/// `receiver_id` of the ingestion node that accepted it.
#[derive(Debug, Clone, PartialEq)]
pub struct FixRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub timestamp: NaiveDateTime,
    pub receiver_id: u32,
}
