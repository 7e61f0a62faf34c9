//! Pass report and per-run counters.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::application::keyspace;
use crate::port::outbound::kv::KeyValueStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassStatus {
    Completed,
    /// Another pass held the lock.
    IngestLocked,
    Cancelled,
    Failed,
}

impl PassStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::IngestLocked => "ingest_locked",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }
}

/// Stored under `ingest:last_result` after each pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassReport {
    pub run_id: String,
    pub status: PassStatus,
    pub started_at: DateTime<Utc>,
    pub snapshots_fetched: usize,
    pub snapshots_inserted: usize,
    pub alerts_detected: usize,
    pub alerts_inserted: usize,
    pub fast_alerts_inserted: usize,
    pub recommendations_expired: usize,
    pub users_expected: usize,
    pub users_attempted: usize,
    pub users_succeeded: usize,
    pub digests_sent: usize,
    pub recommendations_sent: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PassReport {
    #[must_use]
    pub fn new(run_id: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            run_id: run_id.into(),
            status: PassStatus::Completed,
            started_at,
            snapshots_fetched: 0,
            snapshots_inserted: 0,
            alerts_detected: 0,
            alerts_inserted: 0,
            fast_alerts_inserted: 0,
            recommendations_expired: 0,
            users_expected: 0,
            users_attempted: 0,
            users_succeeded: 0,
            digests_sent: 0,
            recommendations_sent: 0,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunField {
    Expected,
    Completed,
    Attempted,
    Succeeded,
}

impl RunField {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expected => "expected",
            Self::Completed => "completed",
            Self::Attempted => "attempted",
            Self::Succeeded => "succeeded",
        }
    }
}

/// `run:{id}:{field}` counters. Failures are logged and ignored.
#[derive(Clone)]
pub struct RunCounters {
    kv: Arc<dyn KeyValueStore>,
    run_id: String,
    ttl: Duration,
}

impl RunCounters {
    pub fn new(kv: Arc<dyn KeyValueStore>, run_id: impl Into<String>, ttl: Duration) -> Self {
        Self {
            kv,
            run_id: run_id.into(),
            ttl,
        }
    }

    pub async fn add(&self, field: RunField, delta: i64) {
        let key = keyspace::run_field(&self.run_id, field.as_str());
        if let Err(error) = self.kv.incr_by(&key, delta).await {
            warn!(run_id = %self.run_id, field = field.as_str(), error = %error, "run counter update failed");
            return;
        }
        if let Err(error) = self.kv.expire(&key, self.ttl).await {
            warn!(run_id = %self.run_id, field = field.as_str(), error = %error, "run counter expiry failed");
        }
    }
}
