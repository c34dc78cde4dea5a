//! GeoFix Socket Listeners
//!
//! Two ingest paths feed the persistence gateway, matching the two ways
//! tracking clients report fixes:
//!
//! - [`UdpIngestServer`]: discrete datagrams, one fix per datagram,
//!   processed strictly in arrival order by a single task.
//! - [`TcpIngestServer`]: one short-lived connection per fix, handled
//!   concurrently (one spawned task per accepted connection) with an
//!   append-only audit side log of every accepted payload.
//!
//! ```text
//! client ──UDP datagram──► UdpIngestServer ─┐
//!                                           ├─ decode ──► FixStore::record_fix
//! client ──TCP connect───► TcpIngestServer ─┘    │
//!                                │               └─ DecodeError: log, discard
//!                                └──► AuditLog (side effect, never blocks the write)
//! ```
//!
//! Nothing in the per-fix path is fatal: malformed payloads, audit I/O
//! errors and gateway failures are logged and the listener moves on.
//! The only fatal conditions are a bind failure at startup and the
//! operator's shutdown signal, delivered through [`ShutdownHandle`].

pub mod audit;
pub mod error;
pub mod shutdown;
pub mod tcp;
pub mod udp;

pub use audit::AuditLog;
pub use error::{IngestError, Result};
pub use shutdown::{wait_for_signal, ShutdownHandle, ShutdownSignal};
pub use tcp::TcpIngestServer;
pub use udp::UdpIngestServer;

/// Upper bound on a single ingest payload, wire-for-wire with the
/// original receiver's datagram buffer. One bounded read per
/// connection; anything longer is truncated and will fail to decode.
pub const MAX_PAYLOAD_BYTES: usize = 4096;
