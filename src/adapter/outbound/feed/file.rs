//! Snapshot source backed by a JSON file.
//!
//! The file holds an array of market records. It is re-read on every
//! fetch so an external collector can rewrite it between passes. Records
//! without timestamps are stamped with the fetch time and bucketed to the
//! 5-minute floor.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::domain::id::ContractId;
use crate::domain::snapshot::{bucket_floor, OutcomeLabels, Snapshot};
use crate::error::{Error, Result};
use crate::port::outbound::source::SnapshotSource;

#[derive(Debug, Deserialize)]
struct FeedRecord {
    contract_id: String,
    title: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    slug: Option<String>,
    p_yes: f64,
    #[serde(default)]
    p_no: Option<f64>,
    #[serde(default)]
    liquidity: f64,
    #[serde(default)]
    volume_24h: f64,
    #[serde(default)]
    volume_1w: f64,
    #[serde(default)]
    best_ask: Option<f64>,
    #[serde(default)]
    last_trade_price: Option<f64>,
    #[serde(default)]
    source_ts: Option<DateTime<Utc>>,
    #[serde(default)]
    observed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    outcome: OutcomeLabels,
}

impl FeedRecord {
    fn into_snapshot(self, now: DateTime<Utc>) -> Snapshot {
        let observed_at = self.observed_at.unwrap_or(now);
        Snapshot {
            contract_id: ContractId::new(self.contract_id),
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
            source_ts: self.source_ts,
            bucket_ts: bucket_floor(observed_at),
            observed_at,
            outcome: self.outcome,
        }
    }
}

/// Parse a feed document, keeping the newest record per contract in
/// first-seen order.
pub fn parse_feed(raw: &str, now: DateTime<Utc>) -> Result<Vec<Snapshot>> {
    let records: Vec<FeedRecord> =
        serde_json::from_str(raw).map_err(|e| Error::Parse(format!("snapshot feed: {e}")))?;
    let mut order: Vec<ContractId> = Vec::new();
    let mut latest: HashMap<ContractId, Snapshot> = HashMap::new();
    for record in records {
        let snapshot = record.into_snapshot(now);
        match latest.get(&snapshot.contract_id) {
            Some(existing) if existing.observed_at >= snapshot.observed_at => {}
            Some(_) => {
                latest.insert(snapshot.contract_id.clone(), snapshot);
            }
            None => {
                order.push(snapshot.contract_id.clone());
                latest.insert(snapshot.contract_id.clone(), snapshot);
            }
        }
    }
    Ok(order.into_iter().filter_map(|id| latest.remove(&id)).collect())
}

pub struct FileFeed {
    path: PathBuf,
}

impl FileFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnapshotSource for FileFeed {
    async fn fetch_latest(&self) -> Result<Vec<Snapshot>> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let snapshots = parse_feed(&raw, Utc::now())?;
        debug!(path = %self.path.display(), count = snapshots.len(), "snapshot feed read");
        Ok(snapshots)
    }
}
