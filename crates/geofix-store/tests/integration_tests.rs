//! Integration tests for the fix store.
//!
//! Exercises the idempotent write contract and the two read queries
//! against the SQLite backend (in-memory for isolation, file-backed
//! where two gateway instances need to share one database).

use chrono::{NaiveDate, NaiveDateTime};
use geofix_core::LocationFix;
use geofix_store::{FixStore, RecordOutcome, SqliteFixStore};

fn ts(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

fn fix_at(t: NaiveDateTime) -> LocationFix {
    LocationFix {
        latitude: 19.432608,
        longitude: -99.133209,
        altitude: Some(2240.5),
        timestamp: t,
    }
}

const DAY_START: (u32, u32, u32) = (0, 0, 0);
const DAY_END: (u32, u32, u32) = (23, 59, 59);

async fn full_day(store: &SqliteFixStore) -> Vec<geofix_store::FixRecord> {
    let (sh, sm, ss) = DAY_START;
    let (eh, em, es) = DAY_END;
    store.history(ts(sh, sm, ss), ts(eh, em, es)).await.unwrap()
}

#[tokio::test]
async fn record_then_latest_roundtrip() {
    let store = SqliteFixStore::new_in_memory(1).await.unwrap();
    let fix = fix_at(ts(12, 0, 0));

    let outcome = store.record_fix(&fix).await.unwrap();
    assert_eq!(outcome, RecordOutcome::Inserted);

    let latest = store.latest_fix().await.unwrap().unwrap();
    assert_eq!(latest.latitude, fix.latitude);
    assert_eq!(latest.longitude, fix.longitude);
    assert_eq!(latest.altitude, fix.altitude);
    assert_eq!(latest.timestamp, fix.timestamp);
    assert_eq!(latest.receiver_id, 1);
}

#[tokio::test]
async fn duplicate_submission_is_absorbed() {
    let store = SqliteFixStore::new_in_memory(1).await.unwrap();
    let fix = fix_at(ts(12, 0, 0));

    assert_eq!(
        store.record_fix(&fix).await.unwrap(),
        RecordOutcome::Inserted
    );
    assert_eq!(
        store.record_fix(&fix).await.unwrap(),
        RecordOutcome::Duplicate
    );

    // Exactly one row, not two and not zero.
    assert_eq!(full_day(&store).await.len(), 1);
}

#[tokio::test]
async fn duplicate_key_ignores_coordinate_changes() {
    // The dedup key is (timestamp, receiver_id); a resend with drifted
    // coordinates at the same second is still a duplicate.
    let store = SqliteFixStore::new_in_memory(1).await.unwrap();
    let first = fix_at(ts(12, 0, 0));
    let mut drifted = first.clone();
    drifted.latitude += 0.000004;

    assert_eq!(
        store.record_fix(&first).await.unwrap(),
        RecordOutcome::Inserted
    );
    assert_eq!(
        store.record_fix(&drifted).await.unwrap(),
        RecordOutcome::Duplicate
    );
    let rows = full_day(&store).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].latitude, first.latitude);
}

#[tokio::test]
async fn missing_altitude_persists_as_null() {
    let store = SqliteFixStore::new_in_memory(1).await.unwrap();
    let fix = LocationFix {
        altitude: None,
        ..fix_at(ts(12, 0, 0))
    };

    store.record_fix(&fix).await.unwrap();
    let latest = store.latest_fix().await.unwrap().unwrap();
    assert_eq!(latest.altitude, None);
}

#[tokio::test]
async fn latest_on_empty_store_is_none() {
    let store = SqliteFixStore::new_in_memory(1).await.unwrap();
    assert!(store.latest_fix().await.unwrap().is_none());
}

#[tokio::test]
async fn latest_picks_newest_timestamp_not_newest_insert() {
    let store = SqliteFixStore::new_in_memory(1).await.unwrap();
    store.record_fix(&fix_at(ts(12, 0, 0))).await.unwrap();
    store.record_fix(&fix_at(ts(9, 0, 0))).await.unwrap();

    let latest = store.latest_fix().await.unwrap().unwrap();
    assert_eq!(latest.timestamp, ts(12, 0, 0));
}

#[tokio::test]
async fn history_is_ascending_and_inclusive() {
    let store = SqliteFixStore::new_in_memory(1).await.unwrap();
    // Inserted out of order on purpose.
    for t in [ts(12, 0, 0), ts(10, 0, 0), ts(11, 0, 0), ts(13, 0, 0)] {
        store.record_fix(&fix_at(t)).await.unwrap();
    }

    let rows = store.history(ts(10, 0, 0), ts(12, 0, 0)).await.unwrap();
    let stamps: Vec<_> = rows.iter().map(|r| r.timestamp).collect();
    assert_eq!(stamps, vec![ts(10, 0, 0), ts(11, 0, 0), ts(12, 0, 0)]);
}

#[tokio::test]
async fn history_empty_range_is_empty_not_error() {
    let store = SqliteFixStore::new_in_memory(1).await.unwrap();
    let rows = store.history(ts(0, 0, 0), ts(0, 0, 0)).await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn history_single_instant_range_matches_exact_fix() {
    let store = SqliteFixStore::new_in_memory(1).await.unwrap();
    store.record_fix(&fix_at(ts(12, 0, 0))).await.unwrap();

    let rows = store.history(ts(12, 0, 0), ts(12, 0, 0)).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn same_timestamp_different_receivers_both_persist() {
    // Two gateway instances (distinct receiver ids) sharing one
    // database file: the dedup key includes the receiver.
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("geofix.db");

    let receiver_1 = SqliteFixStore::new(&path, 1).await.unwrap();
    let receiver_2 = SqliteFixStore::new(&path, 2).await.unwrap();

    let fix = fix_at(ts(12, 0, 0));
    assert_eq!(
        receiver_1.record_fix(&fix).await.unwrap(),
        RecordOutcome::Inserted
    );
    assert_eq!(
        receiver_2.record_fix(&fix).await.unwrap(),
        RecordOutcome::Inserted
    );

    assert_eq!(full_day(&receiver_1).await.len(), 2);
}

#[tokio::test]
async fn file_backed_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("geofix.db");

    {
        let store = SqliteFixStore::new(&path, 1).await.unwrap();
        store.record_fix(&fix_at(ts(12, 0, 0))).await.unwrap();
    }

    let reopened = SqliteFixStore::new(&path, 1).await.unwrap();
    let latest = reopened.latest_fix().await.unwrap().unwrap();
    assert_eq!(latest.timestamp, ts(12, 0, 0));

    // And the dedup constraint still holds across restarts.
    assert_eq!(
        reopened.record_fix(&fix_at(ts(12, 0, 0))).await.unwrap(),
        RecordOutcome::Duplicate
    );
}
