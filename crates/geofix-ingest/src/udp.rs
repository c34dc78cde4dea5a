//! Connectionless Listener
//!
//! UDP ingest: one fix per datagram, processed strictly in arrival
//! order by a single task. No concurrency on this path means no
//! contention on the storage handle from here; the handler for each
//! datagram is awaited to completion before the next receive.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

use geofix_store::{FixStore, RecordOutcome};

use crate::error::Result;
use crate::shutdown::ShutdownHandle;
use crate::MAX_PAYLOAD_BYTES;

/// UDP ingest server.
pub struct UdpIngestServer {
    socket: UdpSocket,
    local_addr: SocketAddr,
    store: Arc<dyn FixStore>,
}

impl UdpIngestServer {
    /// Bind the datagram socket. A failure here is fatal to startup.
    pub async fn bind(addr: SocketAddr, store: Arc<dyn FixStore>) -> Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        let local_addr = socket.local_addr()?;
        info!("udp ingest listening on {}", local_addr);

        Ok(Self {
            socket,
            local_addr,
            store,
        })
    }

    /// Address actually bound (resolves port 0 for tests).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Receive datagrams until the shutdown signal fires.
    ///
    /// A decode failure or a gateway failure for one datagram never
    /// stops the loop from processing the next one.
    pub async fn run_until(self, mut shutdown: ShutdownHandle) -> Result<()> {
        let mut buf = vec![0u8; MAX_PAYLOAD_BYTES];
        loop {
            tokio::select! {
                result = self.socket.recv_from(&mut buf) => {
                    match result {
                        Ok((n, peer)) => self.handle_datagram(&buf[..n], peer).await,
                        Err(e) => warn!(error = %e, "udp receive failed"),
                    }
                }
                signal = shutdown.wait() => {
                    info!("udp ingest shutting down ({})", signal);
                    break;
                }
            }
        }
        // Socket dropped here, closing it.
        Ok(())
    }

    async fn handle_datagram(&self, raw: &[u8], peer: SocketAddr) {
        let fix = match geofix_core::decode(raw) {
            Ok(fix) => fix,
            Err(e) => {
                warn!(%peer, error = %e, payload = %String::from_utf8_lossy(raw),
                    "discarding malformed datagram");
                return;
            }
        };

        match self.store.record_fix(&fix).await {
            Ok(RecordOutcome::Inserted) => debug!(%peer, timestamp = %fix.timestamp, "fix recorded"),
            Ok(RecordOutcome::Duplicate) => debug!(%peer, timestamp = %fix.timestamp, "duplicate fix absorbed"),
            Err(e) => warn!(%peer, error = %e, "failed to record fix"),
        }
    }
}
