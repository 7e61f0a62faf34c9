//! Persistence ports for snapshots, alerts, recommendations and mutes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::alert::{Alert, AlertType, InsertOutcome};
use crate::domain::id::{AlertId, ContractId, RecommendationId, TenantId, UserId};
use crate::domain::mute::{Mute, MuteScope};
use crate::domain::recommendation::{AuditEvent, Recommendation, RecommendationStatus};
use crate::domain::snapshot::Snapshot;
use crate::error::Result;

/// Snapshot history. Written by ingestion, read by detectors and the
/// classifier.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Insert unless `(contract_id, bucket_ts)` already exists.
    async fn insert_snapshot(&self, snapshot: &Snapshot) -> Result<InsertOutcome>;

    /// Snapshots for one contract with `from <= bucket_ts < until`,
    /// ascending by bucket.
    async fn range(
        &self,
        contract_id: &ContractId,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Snapshot>>;

    /// Up to `limit` snapshots strictly before `bucket`, newest first.
    async fn before(
        &self,
        contract_id: &ContractId,
        bucket: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Snapshot>>;

    /// Up to `limit` snapshots at or after `bucket`, oldest first.
    async fn from_bucket(
        &self,
        contract_id: &ContractId,
        bucket: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Snapshot>>;
}

/// Alert persistence. Uniqueness is enforced on
/// `(alert_type, contract_id, bucket_ts)`.
#[async_trait]
pub trait AlertStore: Send + Sync {
    /// Insert unless an alert with the same idempotency key exists.
    async fn insert_alert(&self, alert: &Alert) -> Result<InsertOutcome>;

    /// True if an alert of `alert_type` for the contract was triggered at or
    /// after `since` for this tenant.
    async fn fired_since(
        &self,
        tenant_id: &TenantId,
        alert_type: AlertType,
        contract_id: &ContractId,
        since: DateTime<Utc>,
    ) -> Result<bool>;

    /// Alerts of the given type created at or after `since`, oldest first.
    async fn created_since(
        &self,
        tenant_id: &TenantId,
        alert_type: AlertType,
        since: DateTime<Utc>,
    ) -> Result<Vec<Alert>>;

    async fn get_alert(&self, id: &AlertId) -> Result<Option<Alert>>;
}

/// Recommendation records and their audit trail.
#[async_trait]
pub trait RecommendationStore: Send + Sync {
    async fn insert_recommendation(&self, recommendation: &Recommendation) -> Result<()>;

    async fn get_recommendation(&self, id: &RecommendationId) -> Result<Option<Recommendation>>;

    /// Compare-and-set the status. Returns `false` (and changes nothing)
    /// when the current status is not `from`.
    async fn transition(
        &self,
        id: &RecommendationId,
        from: RecommendationStatus,
        to: RecommendationStatus,
    ) -> Result<bool>;

    /// Proposed recommendations whose expiry is at or before `now`.
    async fn due_for_expiry(&self, now: DateTime<Utc>) -> Result<Vec<Recommendation>>;

    async fn record_event(&self, event: &AuditEvent) -> Result<()>;

    async fn events_for(&self, id: &RecommendationId) -> Result<Vec<AuditEvent>>;
}

/// Mutes created by user callbacks.
#[async_trait]
pub trait MuteStore: Send + Sync {
    /// The active mute for a target, if any.
    async fn active_mute(
        &self,
        user_id: &UserId,
        scope: MuteScope,
        target_key: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Mute>>;

    /// Insert or replace the mute for `(user, scope, target)`.
    async fn upsert_mute(&self, mute: &Mute) -> Result<()>;
}
