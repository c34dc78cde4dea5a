//! Store Error Types
//!
//! ## Error Categories
//!
//! - `Unreachable`: the backend could not be reached and one reconnect
//!   attempt also failed. The in-flight fix is dropped (there is no
//!   durable retry buffer); the next submission gets a fresh attempt.
//! - `Database`: the backend was reachable but the operation failed.
//!   For writes the in-flight transaction has been rolled back.
//! - `Migration`: the embedded SQLite schema could not be applied at
//!   startup.
//!
//! A uniqueness violation is *not* represented here - it is the
//! successful `RecordOutcome::Duplicate`, classified in the store
//! implementations via [`is_unique_violation`].

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unreachable: {0}")]
    Unreachable(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(String),
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        StoreError::Migration(e.to_string())
    }
}

/// True when the error is the storage engine rejecting a duplicate
/// `(timestamp, receiver_id)` key.
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}
