//! Append-Only Audit Log
//!
//! A durability-independent side trail of every payload the TCP listener
//! accepted, one line per message:
//!
//! ```text
//! 2024-01-01 12:00:00 | 203.0.113.7 | {"latitude":19.432608,...}
//! ```
//!
//! This is separate from the database write on purpose: the line is what
//! the client actually sent, before any normalization, and it survives
//! storage outages. The inverse also holds - an audit failure (disk
//! full, bad path) is logged and the database write proceeds.

use chrono::{Local, NaiveDateTime};
use std::net::IpAddr;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use geofix_core::TIMESTAMP_FORMAT;

/// Append-only audit log of raw accepted payloads.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append one entry stamped with the current local time.
    pub async fn append(&self, peer: IpAddr, raw: &str) -> std::io::Result<()> {
        let line = format_entry(Local::now().naive_local(), peer, raw);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

fn format_entry(at: NaiveDateTime, peer: IpAddr, raw: &str) -> String {
    format!("{} | {} | {}\n", at.format(TIMESTAMP_FORMAT), peer, raw.trim())
}
