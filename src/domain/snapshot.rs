//! Market snapshots as produced by ingestion.
//!
//! A [`Snapshot`] is immutable once written and uniquely keyed by
//! `(contract_id, bucket_ts)`. This crate only reads them.

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::id::ContractId;

/// Width of a snapshot bucket in minutes.
pub const BUCKET_MINUTES: i64 = 5;

/// Floor a timestamp to its 5-minute bucket.
#[must_use]
pub fn bucket_floor(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.duration_trunc(TimeDelta::minutes(BUCKET_MINUTES))
        .unwrap_or(ts)
}

/// How reliably the venue's outcome labels map onto YES/NO.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelMapping {
    /// Binary YES/NO market or a verified mapping.
    Verified,
    /// Multi-outcome market whose primary label could not be mapped.
    #[default]
    Unknown,
}

/// Outcome label metadata carried from the snapshot onto alerts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeLabels {
    /// Label of the outcome the YES price refers to.
    #[serde(default)]
    pub primary_label: Option<String>,
    /// True for plain YES/NO markets.
    #[serde(default)]
    pub is_yes_no: bool,
    #[serde(default)]
    pub mapping: LabelMapping,
}

impl OutcomeLabels {
    /// Labels for a plain binary market.
    #[must_use]
    pub fn yes_no() -> Self {
        Self {
            primary_label: Some("Yes".into()),
            is_yes_no: true,
            mapping: LabelMapping::Verified,
        }
    }

    /// True when the YES side can be traded without guessing the label.
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.is_yes_no || self.mapping == LabelMapping::Verified
    }
}

/// One observation of a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub contract_id: ContractId,
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    pub p_yes: f64,
    /// May be absent upstream; see [`Snapshot::p_no`].
    #[serde(default)]
    pub p_no: Option<f64>,
    pub liquidity: f64,
    pub volume_24h: f64,
    #[serde(default)]
    pub volume_1w: f64,
    #[serde(default)]
    pub best_ask: Option<f64>,
    #[serde(default)]
    pub last_trade_price: Option<f64>,
    #[serde(default)]
    pub source_ts: Option<DateTime<Utc>>,
    pub bucket_ts: DateTime<Utc>,
    pub observed_at: DateTime<Utc>,
    #[serde(default)]
    pub outcome: OutcomeLabels,
}

impl Snapshot {
    /// NO probability, derived from YES when the venue omits it.
    #[must_use]
    pub fn p_no(&self) -> f64 {
        self.p_no.unwrap_or(1.0 - self.p_yes)
    }

    /// Compact price point view used by history-based checks.
    #[must_use]
    pub fn point(&self) -> PricePoint {
        PricePoint {
            bucket_ts: self.bucket_ts,
            price: self.p_yes,
        }
    }
}

/// A `(bucket, price)` pair from a contract's history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub bucket_ts: DateTime<Utc>,
    pub price: f64,
}

impl PricePoint {
    #[must_use]
    pub const fn new(bucket_ts: DateTime<Utc>, price: f64) -> Self {
        Self { bucket_ts, price }
    }
}
