//! Gateway Connection Lifecycle
//!
//! Reconnect policy for backends reached over a network link. The
//! policy is deliberately separated from the MySQL wire code so it can
//! be driven deterministically in tests:
//!
//! - [`StorageLink`] is one live connection to the backend: it can be
//!   health-checked, run the idempotent insert, and serve the two read
//!   queries.
//! - [`LinkConnector`] establishes links; it is the single seam through
//!   which the gateway (re)connects.
//! - [`FixGateway`] owns at most one link behind a mutex and implements
//!   [`FixStore`] on top of the two traits.
//!
//! ## The Lifecycle Contract
//!
//! Before every operation the current link gets a liveness check. On
//! failure the link is discarded and the connector is asked for a new
//! one exactly once; if that also fails the operation reports
//! [`StoreError::Unreachable`] and, for a write, the fix is dropped -
//! there is no retry buffer. The next submission starts from an empty
//! slot and connects fresh, so an outage heals without intervention.
//!
//! The whole check-then-operate sequence runs under one lock: the link
//! is a single physical connection shared by every concurrent handler,
//! and two handlers must never interleave protocol state on it.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use geofix_core::LocationFix;

use crate::error::{Result, StoreError};
use crate::types::{FixRecord, RecordOutcome};
use crate::FixStore;

/// One live connection to the storage backend.
///
/// `insert_fix` owns transaction handling and duplicate classification;
/// a uniqueness violation comes back as `Ok(Duplicate)`, never as an
/// error.
#[async_trait]
pub trait StorageLink: Send {
    async fn ping(&mut self) -> sqlx::Result<()>;

    async fn insert_fix(
        &mut self,
        fix: &LocationFix,
        receiver_id: u32,
    ) -> sqlx::Result<RecordOutcome>;

    async fn fetch_latest(&mut self) -> sqlx::Result<Option<FixRecord>>;

    async fn fetch_range(
        &mut self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> sqlx::Result<Vec<FixRecord>>;
}

/// Establishes [`StorageLink`]s. The gateway's only way to (re)connect.
#[async_trait]
pub trait LinkConnector: Send + Sync {
    type Link: StorageLink;

    async fn connect(&self) -> sqlx::Result<Self::Link>;
}

/// Fix store over a single health-checked link.
pub struct FixGateway<C: LinkConnector> {
    connector: C,
    receiver_id: u32,
    link: Mutex<Option<C::Link>>,
}

impl<C: LinkConnector> FixGateway<C> {
    /// No connection is made here; the link is established on first use
    /// so the server can start while the backend is still coming up.
    pub fn with_connector(connector: C, receiver_id: u32) -> Self {
        Self {
            connector,
            receiver_id,
            link: Mutex::new(None),
        }
    }

    /// Health-check the current link and replace it if unhealthy.
    ///
    /// Makes at most one reconnect attempt; on failure the slot is left
    /// empty and the caller reports `Unreachable`.
    async fn ensure_healthy(&self, slot: &mut Option<C::Link>) -> Result<()> {
        if let Some(link) = slot.as_mut() {
            if link.ping().await.is_ok() {
                return Ok(());
            }
            warn!("storage link failed liveness check, replacing it");
            *slot = None;
        }

        match self.connector.connect().await {
            Ok(link) => {
                debug!("storage link established");
                *slot = Some(link);
                Ok(())
            }
            Err(e) => Err(StoreError::Unreachable(e.to_string())),
        }
    }
}

#[async_trait]
impl<C: LinkConnector> FixStore for FixGateway<C> {
    async fn record_fix(&self, fix: &LocationFix) -> Result<RecordOutcome> {
        // One critical section from liveness check to commit.
        let mut slot = self.link.lock().await;
        self.ensure_healthy(&mut slot).await?;
        let link = match slot.as_mut() {
            Some(link) => link,
            None => return Err(StoreError::Unreachable("no storage link".into())),
        };

        link.insert_fix(fix, self.receiver_id)
            .await
            .map_err(StoreError::Database)
    }

    async fn latest_fix(&self) -> Result<Option<FixRecord>> {
        let mut slot = self.link.lock().await;
        self.ensure_healthy(&mut slot).await?;
        let link = match slot.as_mut() {
            Some(link) => link,
            None => return Err(StoreError::Unreachable("no storage link".into())),
        };

        link.fetch_latest().await.map_err(StoreError::Database)
    }

    async fn history(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<Vec<FixRecord>> {
        let mut slot = self.link.lock().await;
        self.ensure_healthy(&mut slot).await?;
        let link = match slot.as_mut() {
            Some(link) => link,
            None => return Err(StoreError::Unreachable("no storage link".into())),
        };

        link.fetch_range(start, end).await.map_err(StoreError::Database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex as StdMutex};

    fn fix() -> LocationFix {
        LocationFix {
            latitude: 19.432608,
            longitude: -99.133209,
            altitude: None,
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        }
    }

    /// What the scripted link should do on the next insert.
    #[derive(Clone, Copy)]
    enum InsertScript {
        Inserted,
        Duplicate,
        Fail,
    }

    /// Shared script driving the fake backend. Each queue is consumed
    /// one entry per call; an empty queue means "succeed".
    #[derive(Default)]
    struct Script {
        ping_failures: StdMutex<VecDeque<bool>>,
        connect_failures: StdMutex<VecDeque<bool>>,
        inserts: StdMutex<VecDeque<InsertScript>>,
        connects: AtomicUsize,
        rows_written: AtomicUsize,
    }

    impl Script {
        fn pop(queue: &StdMutex<VecDeque<bool>>) -> bool {
            queue.lock().unwrap().pop_front().unwrap_or(false)
        }

        fn fail_next_ping(&self) {
            self.ping_failures.lock().unwrap().push_back(true);
        }

        fn fail_next_connect(&self) {
            self.connect_failures.lock().unwrap().push_back(true);
        }

        fn script_insert(&self, s: InsertScript) {
            self.inserts.lock().unwrap().push_back(s);
        }
    }

    struct ScriptedLink {
        script: Arc<Script>,
    }

    #[async_trait]
    impl StorageLink for ScriptedLink {
        async fn ping(&mut self) -> sqlx::Result<()> {
            if Script::pop(&self.script.ping_failures) {
                Err(sqlx::Error::PoolClosed)
            } else {
                Ok(())
            }
        }

        async fn insert_fix(
            &mut self,
            _fix: &LocationFix,
            _receiver_id: u32,
        ) -> sqlx::Result<RecordOutcome> {
            let action = self
                .script
                .inserts
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(InsertScript::Inserted);
            match action {
                InsertScript::Inserted => {
                    self.script.rows_written.fetch_add(1, Ordering::SeqCst);
                    Ok(RecordOutcome::Inserted)
                }
                InsertScript::Duplicate => Ok(RecordOutcome::Duplicate),
                InsertScript::Fail => Err(sqlx::Error::PoolClosed),
            }
        }

        async fn fetch_latest(&mut self) -> sqlx::Result<Option<FixRecord>> {
            Ok(None)
        }

        async fn fetch_range(
            &mut self,
            _start: NaiveDateTime,
            _end: NaiveDateTime,
        ) -> sqlx::Result<Vec<FixRecord>> {
            Ok(vec![])
        }
    }

    struct ScriptedConnector {
        script: Arc<Script>,
    }

    #[async_trait]
    impl LinkConnector for ScriptedConnector {
        type Link = ScriptedLink;

        async fn connect(&self) -> sqlx::Result<ScriptedLink> {
            self.script.connects.fetch_add(1, Ordering::SeqCst);
            if Script::pop(&self.script.connect_failures) {
                Err(sqlx::Error::PoolTimedOut)
            } else {
                Ok(ScriptedLink {
                    script: self.script.clone(),
                })
            }
        }
    }

    fn gateway(script: &Arc<Script>) -> FixGateway<ScriptedConnector> {
        FixGateway::with_connector(
            ScriptedConnector {
                script: script.clone(),
            },
            1,
        )
    }

    #[tokio::test]
    async fn connects_lazily_on_first_write() {
        let script = Arc::new(Script::default());
        let gw = gateway(&script);
        assert_eq!(script.connects.load(Ordering::SeqCst), 0);

        let outcome = gw.record_fix(&fix()).await.unwrap();
        assert_eq!(outcome, RecordOutcome::Inserted);
        assert_eq!(script.connects.load(Ordering::SeqCst), 1);
        assert_eq!(script.rows_written.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn healthy_link_is_reused_across_writes() {
        let script = Arc::new(Script::default());
        let gw = gateway(&script);

        gw.record_fix(&fix()).await.unwrap();
        gw.record_fix(&fix()).await.unwrap();

        assert_eq!(script.connects.load(Ordering::SeqCst), 1);
        assert_eq!(script.rows_written.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_liveness_check_reconnects_once_then_writes() {
        let script = Arc::new(Script::default());
        let gw = gateway(&script);
        gw.record_fix(&fix()).await.unwrap();

        script.fail_next_ping();
        let outcome = gw.record_fix(&fix()).await.unwrap();

        assert_eq!(outcome, RecordOutcome::Inserted);
        // Exactly one reconnect on top of the initial connection.
        assert_eq!(script.connects.load(Ordering::SeqCst), 2);
        assert_eq!(script.rows_written.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_reconnect_is_unreachable_and_drops_the_fix() {
        let script = Arc::new(Script::default());
        let gw = gateway(&script);
        gw.record_fix(&fix()).await.unwrap();

        script.fail_next_ping();
        script.fail_next_connect();
        let err = gw.record_fix(&fix()).await.unwrap_err();

        assert!(matches!(err, StoreError::Unreachable(_)));
        // One reconnect attempt, no second write.
        assert_eq!(script.connects.load(Ordering::SeqCst), 2);
        assert_eq!(script.rows_written.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn outage_heals_on_the_next_submission() {
        let script = Arc::new(Script::default());
        let gw = gateway(&script);
        script.fail_next_connect();

        // Backend down at submission time: dropped, not queued.
        let err = gw.record_fix(&fix()).await.unwrap_err();
        assert!(matches!(err, StoreError::Unreachable(_)));
        assert_eq!(script.rows_written.load(Ordering::SeqCst), 0);

        // Backend back before the next submission: succeeds with no
        // manual intervention.
        let outcome = gw.record_fix(&fix()).await.unwrap();
        assert_eq!(outcome, RecordOutcome::Inserted);
        assert_eq!(script.connects.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn duplicate_from_link_passes_through_as_success() {
        let script = Arc::new(Script::default());
        let gw = gateway(&script);
        script.script_insert(InsertScript::Duplicate);

        let outcome = gw.record_fix(&fix()).await.unwrap();
        assert_eq!(outcome, RecordOutcome::Duplicate);
        assert_eq!(script.rows_written.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn insert_failure_is_database_error_and_keeps_the_link() {
        let script = Arc::new(Script::default());
        let gw = gateway(&script);
        script.script_insert(InsertScript::Fail);

        let err = gw.record_fix(&fix()).await.unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));

        // A write failure is not a liveness failure: the next write
        // reuses the link instead of reconnecting.
        let outcome = gw.record_fix(&fix()).await.unwrap();
        assert_eq!(outcome, RecordOutcome::Inserted);
        assert_eq!(script.connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn reads_reconnect_the_same_way_as_writes() {
        let script = Arc::new(Script::default());
        let gw = gateway(&script);
        gw.latest_fix().await.unwrap();

        script.fail_next_ping();
        assert!(gw.latest_fix().await.unwrap().is_none());
        assert_eq!(script.connects.load(Ordering::SeqCst), 2);
    }
}
