//! Connection-Oriented Listener
//!
//! TCP ingest: each connection carries exactly one fix payload. The
//! accept loop spawns a task per connection, so a slow client never
//! holds up the next one; the shared storage handle serializes the
//! actual writes inside the gateway.
//!
//! Per-connection lifecycle: accept, one bounded read, decode, audit +
//! record on success (or log and skip on decode failure), close. The
//! socket closes on every exit path because the stream is owned by the
//! handler task and dropped when it returns.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use geofix_store::{FixStore, RecordOutcome};

use crate::audit::AuditLog;
use crate::error::Result;
use crate::shutdown::ShutdownHandle;
use crate::MAX_PAYLOAD_BYTES;

/// Shared state for all connection handlers.
struct TcpState {
    store: Arc<dyn FixStore>,
    audit: AuditLog,
}

/// TCP ingest server.
pub struct TcpIngestServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    state: Arc<TcpState>,
}

impl TcpIngestServer {
    /// Bind the listening socket. A failure here is fatal to startup.
    pub async fn bind(
        addr: SocketAddr,
        store: Arc<dyn FixStore>,
        audit: AuditLog,
    ) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("tcp ingest listening on {}", local_addr);

        Ok(Self {
            listener,
            local_addr,
            state: Arc::new(TcpState { store, audit }),
        })
    }

    /// Address actually bound (resolves port 0 for tests).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept connections until the shutdown signal fires.
    ///
    /// Per-connection failures are logged and never break the loop.
    /// Handlers run in a [`JoinSet`] so that after the signal fires the
    /// server stops accepting, closes the socket, and still waits for
    /// every in-flight handler before returning.
    pub async fn run_until(self, mut shutdown: ShutdownHandle) -> Result<()> {
        let mut handlers = JoinSet::new();
        loop {
            tokio::select! {
                result = self.listener.accept() => {
                    match result {
                        Ok((stream, peer)) => {
                            let state = self.state.clone();
                            handlers.spawn(handle_connection(stream, peer, state));
                        }
                        Err(e) => {
                            warn!(error = %e, "tcp accept failed");
                        }
                    }
                }
                // Reap finished handlers so the set does not grow with
                // the total connection count.
                Some(_) = handlers.join_next(), if !handlers.is_empty() => {}
                signal = shutdown.wait() => {
                    info!("tcp ingest shutting down ({})", signal);
                    break;
                }
            }
        }
        // Close the socket first so no new work starts, then let the
        // handlers that already accepted a payload run to completion.
        drop(self.listener);
        if !handlers.is_empty() {
            info!("waiting for {} in-flight tcp handlers", handlers.len());
        }
        while handlers.join_next().await.is_some() {}
        Ok(())
    }
}

/// One accepted connection: read, decode, audit, record, close.
async fn handle_connection(mut stream: TcpStream, peer: SocketAddr, state: Arc<TcpState>) {
    debug!(%peer, "connection accepted");

    // Single bounded read; the protocol is one payload per connection,
    // not a stream of messages.
    let mut buf = vec![0u8; MAX_PAYLOAD_BYTES];
    let n = match stream.read(&mut buf).await {
        Ok(n) => n,
        Err(e) => {
            warn!(%peer, error = %e, "read failed");
            return;
        }
    };
    let raw = &buf[..n];

    let fix = match geofix_core::decode(raw) {
        Ok(fix) => fix,
        Err(e) => {
            warn!(%peer, error = %e, payload = %String::from_utf8_lossy(raw),
                "discarding malformed payload");
            return;
        }
    };

    // Audit trail first. Its failure must not block the database write.
    let text = String::from_utf8_lossy(raw);
    if let Err(e) = state.audit.append(peer.ip(), &text).await {
        warn!(%peer, error = %e, "audit log append failed");
    }

    match state.store.record_fix(&fix).await {
        Ok(RecordOutcome::Inserted) => debug!(%peer, timestamp = %fix.timestamp, "fix recorded"),
        Ok(RecordOutcome::Duplicate) => debug!(%peer, timestamp = %fix.timestamp, "duplicate fix absorbed"),
        Err(e) => warn!(%peer, error = %e, "failed to record fix"),
    }
    // Stream dropped here: connection closed on every exit path.
}
