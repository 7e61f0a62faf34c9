use std::time::Duration;

use serde::Deserialize;

use crate::domain::id::TenantId;

/// `[scheduler]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between scheduled passes.
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
    /// Lifetime of the pass lock. Must cover at least two intervals.
    #[serde(default = "default_lock_ttl_seconds")]
    pub lock_ttl_seconds: u64,
    #[serde(default)]
    pub tenant_id: TenantId,
    /// Lifetime of the per-run counters.
    #[serde(default = "default_run_counter_ttl_seconds")]
    pub run_counter_ttl_seconds: u64,
}

const fn default_interval_seconds() -> u64 {
    300
}

const fn default_lock_ttl_seconds() -> u64 {
    900
}

const fn default_run_counter_ttl_seconds() -> u64 {
    86_400
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval_seconds(),
            lock_ttl_seconds: default_lock_ttl_seconds(),
            tenant_id: TenantId::default(),
            run_counter_ttl_seconds: default_run_counter_ttl_seconds(),
        }
    }
}

impl SchedulerConfig {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds.max(1))
    }

    /// Lock TTL, raised to twice the interval if configured lower.
    #[must_use]
    pub fn lock_ttl(&self) -> Duration {
        Duration::from_secs(self.lock_ttl_seconds.max(self.interval_seconds.max(1) * 2))
    }

    #[must_use]
    pub fn run_counter_ttl(&self) -> Duration {
        Duration::from_secs(self.run_counter_ttl_seconds.max(1))
    }
}
