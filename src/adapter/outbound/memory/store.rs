//! In-memory record store.
//!
//! Implements every persistence port over `parking_lot` guarded maps.
//! Used by tests and by single-process deployments for the records that do
//! not need to survive a restart (recommendations, mutes).

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::domain::alert::{Alert, AlertType, InsertOutcome};
use crate::domain::id::{AlertId, ContractId, RecommendationId, TenantId, UserId};
use crate::domain::mute::{Mute, MuteScope};
use crate::domain::recommendation::{AuditEvent, Recommendation, RecommendationStatus};
use crate::domain::snapshot::Snapshot;
use crate::error::Result;
use crate::port::outbound::store::{AlertStore, MuteStore, RecommendationStore, SnapshotStore};

type AlertKey = (AlertType, ContractId, DateTime<Utc>);
type MuteKey = (UserId, MuteScope, String);

#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshots: RwLock<BTreeMap<(ContractId, DateTime<Utc>), Snapshot>>,
    alerts: RwLock<Vec<Alert>>,
    alert_keys: RwLock<HashSet<AlertKey>>,
    recommendations: RwLock<HashMap<RecommendationId, Recommendation>>,
    events: RwLock<Vec<AuditEvent>>,
    mutes: RwLock<HashMap<MuteKey, Mute>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored alerts.
    #[must_use]
    pub fn alert_count(&self) -> usize {
        self.alerts.read().len()
    }

    /// Number of stored snapshots.
    #[must_use]
    pub fn snapshot_count(&self) -> usize {
        self.snapshots.read().len()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn insert_snapshot(&self, snapshot: &Snapshot) -> Result<InsertOutcome> {
        let key = (snapshot.contract_id.clone(), snapshot.bucket_ts);
        let mut snapshots = self.snapshots.write();
        if snapshots.contains_key(&key) {
            return Ok(InsertOutcome::Duplicate);
        }
        snapshots.insert(key, snapshot.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn range(
        &self,
        contract_id: &ContractId,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Snapshot>> {
        if from >= until {
            return Ok(Vec::new());
        }
        let snapshots = self.snapshots.read();
        Ok(snapshots
            .range((contract_id.clone(), from)..(contract_id.clone(), until))
            .map(|(_, s)| s.clone())
            .collect())
    }

    async fn before(
        &self,
        contract_id: &ContractId,
        bucket: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Snapshot>> {
        let snapshots = self.snapshots.read();
        Ok(snapshots
            .range(..(contract_id.clone(), bucket))
            .rev()
            .take_while(|((id, _), _)| id == contract_id)
            .take(limit)
            .map(|(_, s)| s.clone())
            .collect())
    }

    async fn from_bucket(
        &self,
        contract_id: &ContractId,
        bucket: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Snapshot>> {
        let snapshots = self.snapshots.read();
        Ok(snapshots
            .range((contract_id.clone(), bucket)..)
            .take_while(|((id, _), _)| id == contract_id)
            .take(limit)
            .map(|(_, s)| s.clone())
            .collect())
    }
}

#[async_trait]
impl AlertStore for MemoryStore {
    async fn insert_alert(&self, alert: &Alert) -> Result<InsertOutcome> {
        let key = (alert.alert_type, alert.contract_id.clone(), alert.bucket_ts);
        let mut keys = self.alert_keys.write();
        if !keys.insert(key) {
            return Ok(InsertOutcome::Duplicate);
        }
        self.alerts.write().push(alert.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn fired_since(
        &self,
        tenant_id: &TenantId,
        alert_type: AlertType,
        contract_id: &ContractId,
        since: DateTime<Utc>,
    ) -> Result<bool> {
        Ok(self.alerts.read().iter().any(|a| {
            &a.tenant_id == tenant_id
                && a.alert_type == alert_type
                && &a.contract_id == contract_id
                && a.triggered_at >= since
        }))
    }

    async fn created_since(
        &self,
        tenant_id: &TenantId,
        alert_type: AlertType,
        since: DateTime<Utc>,
    ) -> Result<Vec<Alert>> {
        let mut alerts: Vec<Alert> = self
            .alerts
            .read()
            .iter()
            .filter(|a| {
                &a.tenant_id == tenant_id && a.alert_type == alert_type && a.created_at >= since
            })
            .cloned()
            .collect();
        alerts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(alerts)
    }

    async fn get_alert(&self, id: &AlertId) -> Result<Option<Alert>> {
        Ok(self.alerts.read().iter().find(|a| &a.id == id).cloned())
    }
}

#[async_trait]
impl RecommendationStore for MemoryStore {
    async fn insert_recommendation(&self, recommendation: &Recommendation) -> Result<()> {
        self.recommendations
            .write()
            .insert(recommendation.id.clone(), recommendation.clone());
        Ok(())
    }

    async fn get_recommendation(&self, id: &RecommendationId) -> Result<Option<Recommendation>> {
        Ok(self.recommendations.read().get(id).cloned())
    }

    async fn transition(
        &self,
        id: &RecommendationId,
        from: RecommendationStatus,
        to: RecommendationStatus,
    ) -> Result<bool> {
        let mut recommendations = self.recommendations.write();
        match recommendations.get_mut(id) {
            Some(rec) if rec.status == from => {
                rec.status = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn due_for_expiry(&self, now: DateTime<Utc>) -> Result<Vec<Recommendation>> {
        let mut due: Vec<Recommendation> = self
            .recommendations
            .read()
            .values()
            .filter(|r| r.status == RecommendationStatus::Proposed && r.is_expired_at(now))
            .cloned()
            .collect();
        due.sort_by(|a, b| a.expires_at.cmp(&b.expires_at).then(a.id.cmp(&b.id)));
        Ok(due)
    }

    async fn record_event(&self, event: &AuditEvent) -> Result<()> {
        self.events.write().push(event.clone());
        Ok(())
    }

    async fn events_for(&self, id: &RecommendationId) -> Result<Vec<AuditEvent>> {
        Ok(self
            .events
            .read()
            .iter()
            .filter(|e| &e.recommendation_id == id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MuteStore for MemoryStore {
    async fn active_mute(
        &self,
        user_id: &UserId,
        scope: MuteScope,
        target_key: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Mute>> {
        let key = (user_id.clone(), scope, target_key.to_string());
        Ok(self
            .mutes
            .read()
            .get(&key)
            .filter(|m| m.is_active_at(now))
            .cloned())
    }

    async fn upsert_mute(&self, mute: &Mute) -> Result<()> {
        let key = (mute.user_id.clone(), mute.scope, mute.target_key.clone());
        self.mutes.write().insert(key, mute.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::testkit::domain::{alert_at, snapshot_at};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn snapshot_insert_is_idempotent() {
        let store = MemoryStore::new();
        let snap = snapshot_at("c1", t0(), 0.4);
        assert_eq!(store.insert_snapshot(&snap).await.unwrap(), InsertOutcome::Inserted);
        assert_eq!(store.insert_snapshot(&snap).await.unwrap(), InsertOutcome::Duplicate);
        assert_eq!(store.snapshot_count(), 1);
    }

    #[tokio::test]
    async fn range_queries_stay_within_one_contract() {
        let store = MemoryStore::new();
        for i in 0..4 {
            let ts = t0() + Duration::minutes(5 * i);
            store.insert_snapshot(&snapshot_at("a", ts, 0.4)).await.unwrap();
            store.insert_snapshot(&snapshot_at("b", ts, 0.6)).await.unwrap();
        }
        let id = ContractId::new("a");

        let range = store
            .range(&id, t0(), t0() + Duration::minutes(15))
            .await
            .unwrap();
        assert_eq!(range.len(), 3);
        assert!(range.iter().all(|s| s.contract_id == id));

        let before = store.before(&id, t0() + Duration::minutes(10), 5).await.unwrap();
        assert_eq!(before.len(), 2);
        assert_eq!(before[0].bucket_ts, t0() + Duration::minutes(5));

        let after = store.from_bucket(&id, t0() + Duration::minutes(10), 5).await.unwrap();
        assert_eq!(after.len(), 2);
        assert_eq!(after[0].bucket_ts, t0() + Duration::minutes(10));
    }

    #[tokio::test]
    async fn alert_insert_dedupes_on_type_contract_bucket() {
        let store = MemoryStore::new();
        let first = alert_at("c1", t0(), 0.40, 0.46);
        let mut second = alert_at("c1", t0(), 0.40, 0.47);
        second.id = AlertId::generate();

        assert!(store.insert_alert(&first).await.unwrap().is_inserted());
        assert_eq!(store.insert_alert(&second).await.unwrap(), InsertOutcome::Duplicate);
        assert_eq!(store.alert_count(), 1);
    }

    #[tokio::test]
    async fn transition_is_compare_and_set() {
        use crate::testkit::domain::recommendation_for;

        let store = MemoryStore::new();
        let rec = recommendation_for(&UserId::new("u1"), &alert_at("c1", t0(), 0.4, 0.46));
        store.insert_recommendation(&rec).await.unwrap();

        assert!(store
            .transition(&rec.id, RecommendationStatus::Proposed, RecommendationStatus::Confirmed)
            .await
            .unwrap());
        assert!(!store
            .transition(&rec.id, RecommendationStatus::Proposed, RecommendationStatus::Skipped)
            .await
            .unwrap());
        let stored = store.get_recommendation(&rec.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RecommendationStatus::Confirmed);
    }

    #[tokio::test]
    async fn expired_mutes_are_not_active() {
        let store = MemoryStore::new();
        let user = UserId::new("u1");
        store
            .upsert_mute(&Mute {
                user_id: user.clone(),
                scope: MuteScope::Market,
                target_key: "c1".into(),
                expires_at: t0() + Duration::minutes(10),
            })
            .await
            .unwrap();

        assert!(store
            .active_mute(&user, MuteScope::Market, "c1", t0())
            .await
            .unwrap()
            .is_some());
        assert!(store
            .active_mute(&user, MuteScope::Market, "c1", t0() + Duration::minutes(11))
            .await
            .unwrap()
            .is_none());
        assert!(store
            .active_mute(&user, MuteScope::Theme, "c1", t0())
            .await
            .unwrap()
            .is_none());
    }
}
