//! GeoFix Persistence Gateway
//!
//! This crate owns the storage side of the ingestion pipeline: it turns a
//! decoded [`LocationFix`] into exactly one durable row, and serves the
//! two read queries the dashboard needs.
//!
//! ## The Idempotent Write Contract
//!
//! Tracking clients resend fixes (flaky radio links, app restarts), so
//! the same fix routinely arrives more than once, sometimes over both
//! transports. The gateway absorbs repeats instead of erroring:
//!
//! ```text
//! record_fix(fix)
//!   ├── Ok(Inserted)   new row persisted
//!   ├── Ok(Duplicate)  row already there - success, nothing written
//!   └── Err(StoreError)
//!         ├── Unreachable   handle down and one reconnect failed; fix dropped
//!         └── Database      insert failed; transaction rolled back; fix dropped
//! ```
//!
//! Duplicate detection is delegated to the storage engine: the
//! `location_data` table enforces `UNIQUE (timestamp, receiver_id)`, and
//! a uniqueness violation on insert is classified as `Duplicate` rather
//! than surfaced as an error. The decision is visible in the return
//! type, not buried in error handling.
//!
//! ## Backends
//!
//! - [`SqliteFixStore`]: embedded, zero-configuration; used for local
//!   development and all tests (in-memory or file-backed).
//! - `MySqlFixStore` (feature `mysql`): the production backend, built as
//!   a [`gateway::FixGateway`] over a MySQL link. Holds a single
//!   lazily-created connection behind a mutex, health-checks it before
//!   every operation, and replaces it wholesale after a failed check
//!   (one reconnect attempt, then the fix is dropped).
//!
//! Both use runtime queries (`sqlx::query`) rather than the compile-time
//! macros so the workspace builds without a `DATABASE_URL`.
//!
//! ## Who Calls This
//!
//! The socket listeners in `geofix-ingest` call [`FixStore::record_fix`]
//! and never touch sqlx themselves; the HTTP read API in `geofix-api`
//! calls [`FixStore::latest_fix`] and [`FixStore::history`]. The trait
//! object `Arc<dyn FixStore>` is the only seam between them.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use geofix_core::LocationFix;

pub mod error;
#[cfg(feature = "mysql")]
pub mod gateway;
#[cfg(feature = "mysql")]
pub mod mysql;
pub mod store;
pub mod types;

pub use error::{Result, StoreError};
#[cfg(feature = "mysql")]
pub use gateway::FixGateway;
#[cfg(feature = "mysql")]
pub use mysql::MySqlFixStore;
pub use store::SqliteFixStore;
pub use types::{FixRecord, RecordOutcome};

/// Persistence gateway interface.
///
/// One implementation per storage backend. All implementations must
/// uphold the idempotency invariant: repeating `record_fix` with the
/// same `(timestamp, receiver_id)` yields `Duplicate` and no second row.
#[async_trait]
pub trait FixStore: Send + Sync {
    /// Persist one fix, attaching this gateway's configured receiver id.
    ///
    /// `Ok(Duplicate)` is a successful outcome: the data is already
    /// durable. Only `Err` means the fix was lost.
    async fn record_fix(&self, fix: &LocationFix) -> Result<RecordOutcome>;

    /// Most recent fix by timestamp across all receivers, if any.
    async fn latest_fix(&self) -> Result<Option<FixRecord>>;

    /// Fixes with `start <= timestamp <= end`, ascending by timestamp.
    ///
    /// An empty range is an empty vec, never an error.
    async fn history(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<Vec<FixRecord>>;
}
