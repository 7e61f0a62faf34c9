//! Database row types and their conversion to domain values.
//!
//! Timestamps are stored as RFC 3339 text with millisecond precision and a
//! `Z` suffix so that lexical order equals chronological order.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;

use super::schema::{alerts, snapshots};
use crate::domain::alert::{Alert, AlertType, Strength};
use crate::domain::id::{AlertId, ContractId, TenantId};
use crate::domain::snapshot::{OutcomeLabels, Snapshot};
use crate::error::{Error, Result};

/// Canonical text form of a timestamp column.
#[must_use]
pub fn ts(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_ts(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Parse(format!("timestamp {value:?}: {e}")))
}

fn parse_outcome(value: &str) -> Result<OutcomeLabels> {
    serde_json::from_str(value).map_err(|e| Error::Parse(e.to_string()))
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = snapshots)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SnapshotRow {
    pub contract_id: String,
    pub bucket_ts: String,
    pub title: String,
    pub category: Option<String>,
    pub slug: Option<String>,
    pub p_yes: f64,
    pub p_no: Option<f64>,
    pub liquidity: f64,
    pub volume_24h: f64,
    pub volume_1w: f64,
    pub best_ask: Option<f64>,
    pub last_trade_price: Option<f64>,
    pub source_ts: Option<String>,
    pub observed_at: String,
    pub outcome: String,
}

impl SnapshotRow {
    pub fn from_domain(snapshot: &Snapshot) -> Result<Self> {
        Ok(Self {
            contract_id: snapshot.contract_id.to_string(),
            bucket_ts: ts(snapshot.bucket_ts),
            title: snapshot.title.clone(),
            category: snapshot.category.clone(),
            slug: snapshot.slug.clone(),
            p_yes: snapshot.p_yes,
            p_no: snapshot.p_no,
            liquidity: snapshot.liquidity,
            volume_24h: snapshot.volume_24h,
            volume_1w: snapshot.volume_1w,
            best_ask: snapshot.best_ask,
            last_trade_price: snapshot.last_trade_price,
            source_ts: snapshot.source_ts.map(ts),
            observed_at: ts(snapshot.observed_at),
            outcome: serde_json::to_string(&snapshot.outcome)?,
        })
    }

    pub fn into_domain(self) -> Result<Snapshot> {
        Ok(Snapshot {
            contract_id: ContractId::from(self.contract_id),
            title: self.title,
            category: self.category,
            slug: self.slug,
            p_yes: self.p_yes,
            p_no: self.p_no,
            liquidity: self.liquidity,
            volume_24h: self.volume_24h,
            volume_1w: self.volume_1w,
            best_ask: self.best_ask,
            last_trade_price: self.last_trade_price,
            source_ts: self.source_ts.as_deref().map(parse_ts).transpose()?,
            bucket_ts: parse_ts(&self.bucket_ts)?,
            observed_at: parse_ts(&self.observed_at)?,
            outcome: parse_outcome(&self.outcome)?,
        })
    }
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = alerts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AlertRow {
    pub id: String,
    pub tenant_id: String,
    pub alert_type: String,
    pub contract_id: String,
    pub title: String,
    pub category: Option<String>,
    pub slug: Option<String>,
    pub old_price: f64,
    pub new_price: f64,
    pub delta_pct: f64,
    pub liquidity: f64,
    pub volume_24h: f64,
    pub best_ask: Option<f64>,
    pub strength: String,
    pub outcome: String,
    pub bucket_ts: String,
    pub triggered_at: String,
    pub created_at: String,
}

impl AlertRow {
    pub fn from_domain(alert: &Alert) -> Result<Self> {
        Ok(Self {
            id: alert.id.to_string(),
            tenant_id: alert.tenant_id.to_string(),
            alert_type: alert.alert_type.as_str().to_string(),
            contract_id: alert.contract_id.to_string(),
            title: alert.title.clone(),
            category: alert.category.clone(),
            slug: alert.slug.clone(),
            old_price: alert.old_price,
            new_price: alert.new_price,
            delta_pct: alert.delta_pct,
            liquidity: alert.liquidity,
            volume_24h: alert.volume_24h,
            best_ask: alert.best_ask,
            strength: alert.strength.as_str().to_string(),
            outcome: serde_json::to_string(&alert.outcome)?,
            bucket_ts: ts(alert.bucket_ts),
            triggered_at: ts(alert.triggered_at),
            created_at: ts(alert.created_at),
        })
    }

    pub fn into_domain(self) -> Result<Alert> {
        let alert_type: AlertType = self.alert_type.parse().map_err(Error::Parse)?;
        let strength = Strength::parse_token(&self.strength)
            .ok_or_else(|| Error::Parse(format!("unknown strength: {}", self.strength)))?;
        Ok(Alert {
            id: AlertId::from(self.id),
            tenant_id: TenantId::from(self.tenant_id),
            alert_type,
            contract_id: ContractId::from(self.contract_id),
            title: self.title,
            category: self.category,
            slug: self.slug,
            old_price: self.old_price,
            new_price: self.new_price,
            delta_pct: self.delta_pct,
            liquidity: self.liquidity,
            volume_24h: self.volume_24h,
            best_ask: self.best_ask,
            strength,
            outcome: parse_outcome(&self.outcome)?,
            bucket_ts: parse_ts(&self.bucket_ts)?,
            triggered_at: parse_ts(&self.triggered_at)?,
            created_at: parse_ts(&self.created_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn timestamps_sort_lexically() {
        let a = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
        let b = a + chrono::Duration::milliseconds(1500);
        assert_eq!(ts(a), "2026-01-05T09:00:00.000Z");
        assert!(ts(a) < ts(b));
        assert_eq!(parse_ts(&ts(b)).unwrap(), b);
    }

    #[test]
    fn corrupt_strength_is_a_parse_error() {
        let alert = crate::testkit::domain::alert_at("c", Utc::now(), 0.4, 0.45);
        let mut row = AlertRow::from_domain(&alert).unwrap();
        row.strength = "HUGE".into();
        assert!(matches!(row.into_domain(), Err(Error::Parse(_))));
    }
}
