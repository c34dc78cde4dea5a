//! SQLite Fix Store
//!
//! Embedded backend used for local development and tests. The schema is
//! applied on startup via `sqlx::migrate!`, so opening a fresh path is
//! all the setup there is.
//!
//! Queries are runtime `sqlx::query` calls rather than the compile-time
//! macros: the macros need a `DATABASE_URL` at build time, which would
//! break building the MySQL backend alongside this one.
//!
//! Unlike the production MySQL backend there is no health-check or
//! reconnect dance here - the database is a local file (or in-memory),
//! so the pool is always reachable.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;

use geofix_core::LocationFix;

use crate::error::{is_unique_violation, Result};
use crate::types::{FixRecord, RecordOutcome};
use crate::FixStore;

const INSERT_FIX: &str = "INSERT INTO location_data (latitude, longitude, altitude, timestamp, receiver_id) \
     VALUES (?, ?, ?, ?, ?)";

const SELECT_LATEST: &str = "SELECT latitude, longitude, altitude, timestamp, receiver_id \
     FROM location_data ORDER BY timestamp DESC LIMIT 1";

const SELECT_RANGE: &str = "SELECT latitude, longitude, altitude, timestamp, receiver_id \
     FROM location_data WHERE timestamp >= ? AND timestamp <= ? ORDER BY timestamp ASC";

/// SQLite-backed fix store.
pub struct SqliteFixStore {
    pool: SqlitePool,
    receiver_id: u32,
}

impl SqliteFixStore {
    /// Open (or create) a file-backed store and apply the schema.
    pub async fn new<P: AsRef<Path>>(path: P, receiver_id: u32) -> Result<Self> {
        let options =
            SqliteConnectOptions::from_str(&format!("sqlite://{}", path.as_ref().display()))?
                .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool, receiver_id })
    }

    /// In-memory store for tests.
    ///
    /// Capped at one connection: each SQLite in-memory connection is its
    /// own database, so a larger pool would see an empty schema.
    pub async fn new_in_memory(receiver_id: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool, receiver_id })
    }
}

fn row_to_record(row: &SqliteRow) -> FixRecord {
    FixRecord {
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        altitude: row.get("altitude"),
        timestamp: row.get("timestamp"),
        receiver_id: row.get::<i64, _>("receiver_id") as u32,
    }
}

#[async_trait]
impl FixStore for SqliteFixStore {
    async fn record_fix(&self, fix: &LocationFix) -> Result<RecordOutcome> {
        let result = sqlx::query(INSERT_FIX)
            .bind(fix.latitude)
            .bind(fix.longitude)
            .bind(fix.altitude)
            .bind(fix.timestamp)
            .bind(self.receiver_id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(RecordOutcome::Inserted),
            Err(e) if is_unique_violation(&e) => Ok(RecordOutcome::Duplicate),
            Err(e) => Err(e.into()),
        }
    }

    async fn latest_fix(&self) -> Result<Option<FixRecord>> {
        let row = sqlx::query(SELECT_LATEST).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(row_to_record))
    }

    async fn history(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<Vec<FixRecord>> {
        let rows = sqlx::query(SELECT_RANGE)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(row_to_record).collect())
    }
}
