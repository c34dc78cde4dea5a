//! Graceful Shutdown
//!
//! A watch-channel handle shared by both listeners and the HTTP server.
//! On an operator signal every subscriber stops accepting new work and
//! closes its socket; in-flight TCP handlers are allowed to finish.

use tokio::sync::watch;

/// What triggered the shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// SIGINT (Ctrl+C)
    SigInt,
    /// SIGTERM
    SigTerm,
    /// Requested in code (tests, embedding)
    Manual,
}

impl std::fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SigInt => write!(f, "SIGINT (Ctrl+C)"),
            Self::SigTerm => write!(f, "SIGTERM"),
            Self::Manual => write!(f, "manual shutdown"),
        }
    }
}

/// Cloneable handle for triggering and observing shutdown.
#[derive(Clone)]
pub struct ShutdownHandle {
    sender: watch::Sender<Option<ShutdownSignal>>,
    receiver: watch::Receiver<Option<ShutdownSignal>>,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(None);
        Self { sender, receiver }
    }

    /// Trigger shutdown with the given signal.
    pub fn trigger(&self, signal: ShutdownSignal) {
        let _ = self.sender.send(Some(signal));
    }

    /// Trigger a manual shutdown.
    pub fn shutdown(&self) {
        self.trigger(ShutdownSignal::Manual);
    }

    /// Wait until shutdown has been triggered.
    pub async fn wait(&mut self) -> ShutdownSignal {
        loop {
            if let Some(signal) = *self.receiver.borrow() {
                return signal;
            }
            if self.receiver.changed().await.is_err() {
                // All senders gone counts as shutdown.
                return ShutdownSignal::Manual;
            }
        }
    }

    /// True once shutdown has been triggered.
    pub fn is_shutdown(&self) -> bool {
        self.receiver.borrow().is_some()
    }
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Block until the process receives SIGINT or SIGTERM.
///
/// The server binary spawns this and forwards the result into a
/// [`ShutdownHandle`].
pub async fn wait_for_signal() -> ShutdownSignal {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(_) => {
                // No SIGTERM stream; fall back to Ctrl+C only.
                let _ = tokio::signal::ctrl_c().await;
                return ShutdownSignal::SigInt;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => ShutdownSignal::SigInt,
            _ = sigterm.recv() => ShutdownSignal::SigTerm,
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        ShutdownSignal::SigInt
    }
}
