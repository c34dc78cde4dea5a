//! MySQL Fix Store
//!
//! Production backend, pointed at an external MySQL (typically RDS) via
//! a connection string. The schema is owned by the external store and is
//! expected to exist already:
//!
//! ```sql
//! CREATE TABLE location_data (
//!     id          BIGINT PRIMARY KEY AUTO_INCREMENT,
//!     latitude    DOUBLE NOT NULL,
//!     longitude   DOUBLE NOT NULL,
//!     altitude    DOUBLE NULL,
//!     timestamp   DATETIME NOT NULL,
//!     receiver_id INT NOT NULL,
//!     UNIQUE KEY uniq_fix (timestamp, receiver_id)
//! );
//! ```
//!
//! [`MySqlFixStore`] is a [`FixGateway`] over the MySQL wire types in
//! this module; the connection lifecycle (single health-checked handle,
//! one reconnect attempt, drop-on-failure) lives in [`crate::gateway`].

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::mysql::{MySqlConnection, MySqlRow};
use sqlx::{Connection, Row};
use tracing::warn;

use geofix_core::LocationFix;

use crate::error::is_unique_violation;
use crate::gateway::{FixGateway, LinkConnector, StorageLink};
use crate::types::{FixRecord, RecordOutcome};

const INSERT_FIX: &str = "INSERT INTO location_data (latitude, longitude, altitude, timestamp, receiver_id) \
     VALUES (?, ?, ?, ?, ?)";

const SELECT_LATEST: &str = "SELECT latitude, longitude, altitude, timestamp, receiver_id \
     FROM location_data ORDER BY timestamp DESC LIMIT 1";

const SELECT_RANGE: &str = "SELECT latitude, longitude, altitude, timestamp, receiver_id \
     FROM location_data WHERE timestamp >= ? AND timestamp <= ? ORDER BY timestamp ASC";

/// MySQL-backed fix store with a single health-checked connection.
pub type MySqlFixStore = FixGateway<MySqlConnector>;

impl MySqlFixStore {
    /// Create a store for the given connection URL.
    ///
    /// No connection is made here; the handle is established on first
    /// use so the server can start while the database is still coming
    /// up.
    pub fn new(url: impl Into<String>, receiver_id: u32) -> Self {
        FixGateway::with_connector(MySqlConnector { url: url.into() }, receiver_id)
    }
}

/// Dials MySQL with the configured URL.
pub struct MySqlConnector {
    url: String,
}

#[async_trait]
impl LinkConnector for MySqlConnector {
    type Link = MySqlLink;

    async fn connect(&self) -> sqlx::Result<MySqlLink> {
        let conn = MySqlConnection::connect(&self.url).await?;
        Ok(MySqlLink { conn })
    }
}

/// One live MySQL connection.
pub struct MySqlLink {
    conn: MySqlConnection,
}

#[async_trait]
impl StorageLink for MySqlLink {
    async fn ping(&mut self) -> sqlx::Result<()> {
        self.conn.ping().await
    }

    async fn insert_fix(
        &mut self,
        fix: &LocationFix,
        receiver_id: u32,
    ) -> sqlx::Result<RecordOutcome> {
        let mut tx = self.conn.begin().await?;
        let result = sqlx::query(INSERT_FIX)
            .bind(fix.latitude)
            .bind(fix.longitude)
            .bind(fix.altitude)
            .bind(fix.timestamp)
            .bind(receiver_id as i32)
            .execute(&mut *tx)
            .await;

        match result {
            Ok(_) => {
                tx.commit().await?;
                Ok(RecordOutcome::Inserted)
            }
            Err(e) if is_unique_violation(&e) => {
                // Already durable from an earlier submission. Roll back
                // the no-op transaction and report success.
                if let Err(re) = tx.rollback().await {
                    warn!(error = %re, "rollback after duplicate insert failed");
                }
                Ok(RecordOutcome::Duplicate)
            }
            Err(e) => {
                if let Err(re) = tx.rollback().await {
                    warn!(error = %re, "rollback after failed insert failed");
                }
                Err(e)
            }
        }
    }

    async fn fetch_latest(&mut self) -> sqlx::Result<Option<FixRecord>> {
        let row = sqlx::query(SELECT_LATEST)
            .fetch_optional(&mut self.conn)
            .await?;
        Ok(row.as_ref().map(row_to_record))
    }

    async fn fetch_range(
        &mut self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> sqlx::Result<Vec<FixRecord>> {
        let rows = sqlx::query(SELECT_RANGE)
            .bind(start)
            .bind(end)
            .fetch_all(&mut self.conn)
            .await?;
        Ok(rows.iter().map(row_to_record).collect())
    }
}

fn row_to_record(row: &MySqlRow) -> FixRecord {
    FixRecord {
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        altitude: row.get("altitude"),
        timestamp: row.get("timestamp"),
        // Column is signed INT; decode as such and widen.
        receiver_id: row.get::<i32, _>("receiver_id") as u32,
    }
}
