//! Scheduled pass from ingest to delivery.

mod support;

use std::time::Duration;

use pmd::application::cancel::CancelToken;
use pmd::application::keyspace;
use pmd::application::pipeline::report::PassStatus;
use pmd::domain::alert::{AlertType, Strength};
use pmd::domain::id::TenantId;
use pmd::port::outbound::kv::KeyValueStore;
use pmd::port::outbound::store::AlertStore;
use pmd::testkit::domain::{snapshot_at, user};

use support::fixtures::{t, Harness};

async fn primed() -> Harness {
    let h = Harness::new(vec![user("bob", 22, "basic")]);
    h.seed_snapshots(&[snapshot_at("c1", t(0), 0.40)]).await;
    h.source.stage(vec![snapshot_at("c1", t(30), 0.45)]);
    h
}

#[tokio::test]
async fn pass_detects_and_delivers() {
    let h = primed().await;

    let report = h.pass.run_once(t(30), &CancelToken::new()).await;

    assert_eq!(report.status, PassStatus::Completed);
    assert_eq!(report.snapshots_fetched, 1);
    assert_eq!(report.snapshots_inserted, 1);
    assert_eq!(report.alerts_inserted, 1);
    assert_eq!(report.fast_alerts_inserted, 0);
    assert_eq!(report.users_expected, 1);
    assert_eq!(report.users_succeeded, 1);
    assert_eq!(report.digests_sent, 1);
    assert_eq!(report.recommendations_sent, 0);
    assert_eq!(h.messenger.count(), 1);

    let alerts = h
        .store
        .created_since(&TenantId::default(), AlertType::StandardDislocation, t(0))
        .await
        .unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].old_price, 0.40);
    assert_eq!(alerts[0].new_price, 0.45);
    assert_eq!(alerts[0].strength, Strength::Strong);
}

#[tokio::test]
async fn pass_report_and_timestamp_are_stored() {
    let h = primed().await;
    let report = h.pass.run_once(t(30), &CancelToken::new()).await;

    let raw = h
        .kv
        .get(keyspace::INGEST_LAST_RESULT)
        .await
        .unwrap()
        .expect("report stored");
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["status"], "completed");
    assert_eq!(value["run_id"], report.run_id.as_str());
    assert_eq!(value["alerts_inserted"], 1);
    assert!(h.kv.get(keyspace::INGEST_LAST_TS).await.unwrap().is_some());
    assert!(
        h.kv.get(keyspace::INGEST_LOCK).await.unwrap().is_none(),
        "lock is released after the pass"
    );
}

#[tokio::test]
async fn held_lock_skips_the_pass() {
    let h = primed().await;
    h.kv.set(keyspace::INGEST_LOCK, "other-run", Some(Duration::from_secs(600)))
        .await
        .unwrap();

    let report = h.pass.run_once(t(30), &CancelToken::new()).await;

    assert_eq!(report.status, PassStatus::IngestLocked);
    assert_eq!(report.snapshots_fetched, 0);
    assert_eq!(h.messenger.count(), 0);
    assert_eq!(
        h.kv.get(keyspace::INGEST_LOCK).await.unwrap().as_deref(),
        Some("other-run")
    );
}

#[tokio::test]
async fn repeated_pass_neither_duplicates_nor_resends() {
    let h = primed().await;
    h.pass.run_once(t(30), &CancelToken::new()).await;

    let second = h.pass.run_once(t(35), &CancelToken::new()).await;

    assert_eq!(second.status, PassStatus::Completed);
    assert_eq!(second.snapshots_fetched, 1);
    assert_eq!(second.snapshots_inserted, 0);
    assert_eq!(second.alerts_inserted, 0);
    assert_eq!(second.digests_sent, 0);
    assert_eq!(h.messenger.count(), 1);
}

#[tokio::test]
async fn cancelled_pass_stops_after_ingest() {
    let h = primed().await;
    let cancel = CancelToken::new();
    cancel.cancel();

    let report = h.pass.run_once(t(30), &cancel).await;

    assert_eq!(report.status, PassStatus::Cancelled);
    assert_eq!(report.snapshots_inserted, 1);
    assert_eq!(report.alerts_inserted, 0);
    assert_eq!(report.users_attempted, 0);
    assert_eq!(h.messenger.count(), 0);
    assert!(h.kv.get(keyspace::INGEST_LOCK).await.unwrap().is_none());
}

#[tokio::test]
async fn empty_batch_completes_quietly() {
    let h = Harness::new(vec![user("bob", 22, "basic")]);
    let report = h.pass.run_once(t(0), &CancelToken::new()).await;
    assert_eq!(report.status, PassStatus::Completed);
    assert_eq!(report.snapshots_fetched, 0);
    assert_eq!(report.digests_sent, 0);
}
