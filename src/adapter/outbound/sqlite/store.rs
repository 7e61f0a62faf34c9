//! SQLite snapshot and alert store.
//!
//! Uniqueness lives in the schema (`PRIMARY KEY (contract_id, bucket_ts)`
//! and `UNIQUE (alert_type, contract_id, bucket_ts)`); inserts use
//! `INSERT OR IGNORE` and report a zero row count as a duplicate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};

use super::database::connection::DbPool;
use super::database::model::{ts, AlertRow, SnapshotRow};
use super::database::schema::{alerts, snapshots};
use crate::domain::alert::{Alert, AlertType, InsertOutcome};
use crate::domain::id::{AlertId, ContractId, TenantId};
use crate::domain::snapshot::Snapshot;
use crate::error::{Error, Result};
use crate::port::outbound::store::{AlertStore, SnapshotStore};

type Conn = PooledConnection<ConnectionManager<SqliteConnection>>;

pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<Conn> {
        self.pool.get().map_err(|e| Error::Connection(e.to_string()))
    }
}

fn db(e: diesel::result::Error) -> Error {
    Error::Database(e.to_string())
}

fn outcome(rows: usize) -> InsertOutcome {
    if rows == 0 {
        InsertOutcome::Duplicate
    } else {
        InsertOutcome::Inserted
    }
}

fn limit(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn snapshots_from(rows: Vec<SnapshotRow>) -> Result<Vec<Snapshot>> {
    rows.into_iter().map(SnapshotRow::into_domain).collect()
}

#[async_trait]
impl SnapshotStore for SqliteStore {
    async fn insert_snapshot(&self, snapshot: &Snapshot) -> Result<InsertOutcome> {
        let row = SnapshotRow::from_domain(snapshot)?;
        let mut conn = self.conn()?;
        let rows = diesel::insert_or_ignore_into(snapshots::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(db)?;
        Ok(outcome(rows))
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
        let mut conn = self.conn()?;
        let rows = snapshots::table
            .filter(snapshots::contract_id.eq(contract_id.as_str()))
            .filter(snapshots::bucket_ts.ge(ts(from)))
            .filter(snapshots::bucket_ts.lt(ts(until)))
            .order(snapshots::bucket_ts.asc())
            .select(SnapshotRow::as_select())
            .load(&mut conn)
            .map_err(db)?;
        snapshots_from(rows)
    }

    async fn before(
        &self,
        contract_id: &ContractId,
        bucket: DateTime<Utc>,
        n: usize,
    ) -> Result<Vec<Snapshot>> {
        let mut conn = self.conn()?;
        let rows = snapshots::table
            .filter(snapshots::contract_id.eq(contract_id.as_str()))
            .filter(snapshots::bucket_ts.lt(ts(bucket)))
            .order(snapshots::bucket_ts.desc())
            .limit(limit(n))
            .select(SnapshotRow::as_select())
            .load(&mut conn)
            .map_err(db)?;
        snapshots_from(rows)
    }

    async fn from_bucket(
        &self,
        contract_id: &ContractId,
        bucket: DateTime<Utc>,
        n: usize,
    ) -> Result<Vec<Snapshot>> {
        let mut conn = self.conn()?;
        let rows = snapshots::table
            .filter(snapshots::contract_id.eq(contract_id.as_str()))
            .filter(snapshots::bucket_ts.ge(ts(bucket)))
            .order(snapshots::bucket_ts.asc())
            .limit(limit(n))
            .select(SnapshotRow::as_select())
            .load(&mut conn)
            .map_err(db)?;
        snapshots_from(rows)
    }
}

#[async_trait]
impl AlertStore for SqliteStore {
    async fn insert_alert(&self, alert: &Alert) -> Result<InsertOutcome> {
        let row = AlertRow::from_domain(alert)?;
        let mut conn = self.conn()?;
        let rows = diesel::insert_or_ignore_into(alerts::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(db)?;
        Ok(outcome(rows))
    }

    async fn fired_since(
        &self,
        tenant_id: &TenantId,
        alert_type: AlertType,
        contract_id: &ContractId,
        since: DateTime<Utc>,
    ) -> Result<bool> {
        let mut conn = self.conn()?;
        let count: i64 = alerts::table
            .filter(alerts::tenant_id.eq(tenant_id.as_str()))
            .filter(alerts::alert_type.eq(alert_type.as_str()))
            .filter(alerts::contract_id.eq(contract_id.as_str()))
            .filter(alerts::triggered_at.ge(ts(since)))
            .count()
            .get_result(&mut conn)
            .map_err(db)?;
        Ok(count > 0)
    }

    async fn created_since(
        &self,
        tenant_id: &TenantId,
        alert_type: AlertType,
        since: DateTime<Utc>,
    ) -> Result<Vec<Alert>> {
        let mut conn = self.conn()?;
        let rows = alerts::table
            .filter(alerts::tenant_id.eq(tenant_id.as_str()))
            .filter(alerts::alert_type.eq(alert_type.as_str()))
            .filter(alerts::created_at.ge(ts(since)))
            .order((alerts::created_at.asc(), alerts::id.asc()))
            .select(AlertRow::as_select())
            .load(&mut conn)
            .map_err(db)?;
        rows.into_iter().map(AlertRow::into_domain).collect()
    }

    async fn get_alert(&self, id: &AlertId) -> Result<Option<Alert>> {
        let mut conn = self.conn()?;
        let row = alerts::table
            .find(id.as_str())
            .select(AlertRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(db)?;
        row.map(AlertRow::into_domain).transpose()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::adapter::outbound::sqlite::database::connection::open;
    use crate::testkit::domain::{alert_at, snapshot_at};

    fn t(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap() + Duration::minutes(minute)
    }

    fn store() -> SqliteStore {
        SqliteStore::new(open(":memory:").unwrap())
    }

    #[tokio::test]
    async fn snapshot_insert_is_idempotent_per_bucket() {
        let store = store();
        let snap = snapshot_at("c1", t(0), 0.40);
        assert_eq!(store.insert_snapshot(&snap).await.unwrap(), InsertOutcome::Inserted);
        assert_eq!(store.insert_snapshot(&snap).await.unwrap(), InsertOutcome::Duplicate);
        let other = snapshot_at("c1", t(5), 0.42);
        assert_eq!(store.insert_snapshot(&other).await.unwrap(), InsertOutcome::Inserted);
    }

    #[tokio::test]
    async fn history_queries_respect_bounds_and_order() {
        let store = store();
        for (i, price) in [0.40, 0.41, 0.42, 0.43].into_iter().enumerate() {
            let minute = i as i64 * 5;
            store.insert_snapshot(&snapshot_at("c1", t(minute), price)).await.unwrap();
        }
        store.insert_snapshot(&snapshot_at("c2", t(5), 0.9)).await.unwrap();
        let c1 = ContractId::new("c1");

        let window = store.range(&c1, t(5), t(15)).await.unwrap();
        let prices: Vec<f64> = window.iter().map(|s| s.p_yes).collect();
        assert_eq!(prices, vec![0.41, 0.42]);

        let prior = store.before(&c1, t(15), 2).await.unwrap();
        assert_eq!(prior[0].bucket_ts, t(10));
        assert_eq!(prior[1].bucket_ts, t(5));

        let after = store.from_bucket(&c1, t(10), 5).await.unwrap();
        assert_eq!(after.len(), 2);
        assert_eq!(after[0], snapshot_at("c1", t(10), 0.42));
    }

    #[tokio::test]
    async fn alerts_dedupe_and_support_cooldown_queries() {
        let store = store();
        let tenant = TenantId::default();
        let alert = alert_at("c1", t(0), 0.40, 0.45);
        assert_eq!(store.insert_alert(&alert).await.unwrap(), InsertOutcome::Inserted);

        let mut again = alert_at("c1", t(0), 0.40, 0.47);
        again.triggered_at = t(1);
        assert_eq!(store.insert_alert(&again).await.unwrap(), InsertOutcome::Duplicate);

        let c1 = ContractId::new("c1");
        let kind = AlertType::StandardDislocation;
        assert!(store.fired_since(&tenant, kind, &c1, t(0)).await.unwrap());
        assert!(!store.fired_since(&tenant, kind, &c1, t(1)).await.unwrap());
        assert!(!store
            .fired_since(&tenant, AlertType::FastDislocation, &c1, t(0))
            .await
            .unwrap());

        let recent = store.created_since(&tenant, kind, t(-60)).await.unwrap();
        assert_eq!(recent, vec![alert.clone()]);
        assert_eq!(store.get_alert(&alert.id).await.unwrap(), Some(alert));
    }
}
