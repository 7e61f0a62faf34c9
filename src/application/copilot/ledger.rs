//! Copilot usage counters and the daily risk ledger.
//!
//! Counters are read, gated on, then incremented. Races between processes
//! can only under-count a send that already went out, never allow one to go
//! out twice, because sends are serialised by the theme claim. Read errors
//! are returned, never treated as zero, so callers can fail closed.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Days, Utc};
use rust_decimal::Decimal;
use tracing::warn;

use crate::application::keyspace;
use crate::domain::id::UserId;
use crate::error::Result;
use crate::port::outbound::kv::KeyValueStore;

use super::eligibility::Usage;
use super::sizing::{from_cents, to_cents};

/// Time left until the next UTC midnight (at least one second).
#[must_use]
pub fn until_end_of_day(now: DateTime<Utc>) -> Duration {
    let midnight = now
        .date_naive()
        .checked_add_days(Days::new(1))
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc());
    let seconds = midnight.map_or(86_400, |m| (m - now).num_seconds());
    Duration::from_secs(seconds.max(1) as u64)
}

fn parse_count(raw: Option<String>) -> i64 {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

#[derive(Clone)]
pub struct Ledger {
    kv: Arc<dyn KeyValueStore>,
}

impl Ledger {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    async fn read(&self, key: &str) -> Result<i64> {
        Ok(parse_count(self.kv.get(key).await?))
    }

    /// Daily and hourly sends so far. The digest count is tracked by the
    /// caller.
    pub async fn usage(&self, user: &UserId, now: DateTime<Utc>) -> Result<Usage> {
        let daily = self.read(&keyspace::copilot_daily(user, now)).await?;
        let hourly = self.read(&keyspace::copilot_hourly(user, now)).await?;
        Ok(Usage {
            daily: u32::try_from(daily.max(0)).unwrap_or(u32::MAX),
            hourly: u32::try_from(hourly.max(0)).unwrap_or(u32::MAX),
            digest: 0,
        })
    }

    /// Count one delivered recommendation.
    pub async fn record_send(&self, user: &UserId, now: DateTime<Utc>) -> Result<()> {
        let daily = keyspace::copilot_daily(user, now);
        self.kv.incr_by(&daily, 1).await?;
        self.kv.expire(&daily, until_end_of_day(now)).await?;

        let hourly = keyspace::copilot_hourly(user, now);
        self.kv.incr_by(&hourly, 1).await?;
        self.kv.expire(&hourly, Duration::from_secs(3600)).await?;
        Ok(())
    }

    /// Notional committed today through confirmed recommendations.
    pub async fn spent_today(&self, user: &UserId, now: DateTime<Utc>) -> Result<Decimal> {
        Ok(from_cents(self.read(&keyspace::risk_spent(user, now)).await?))
    }

    /// Debit the day's risk budget. Returns the new total.
    ///
    /// An error means nothing was added. Once the increment lands, a failed
    /// expiry is only logged.
    pub async fn debit(
        &self,
        user: &UserId,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Decimal> {
        self.adjust(user, to_cents(amount), now).await
    }

    /// Undo a debit.
    pub async fn credit(
        &self,
        user: &UserId,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Decimal> {
        self.adjust(user, -to_cents(amount), now).await
    }

    async fn adjust(&self, user: &UserId, cents: i64, now: DateTime<Utc>) -> Result<Decimal> {
        let key = keyspace::risk_spent(user, now);
        let total = self.kv.incr_by(&key, cents).await?;
        if let Err(error) = self.kv.expire(&key, until_end_of_day(now)).await {
            warn!(key = %key, error = %error, "risk ledger expiry failed");
        }
        Ok(from_cents(total))
    }
}
