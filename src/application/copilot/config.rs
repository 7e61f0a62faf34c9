//! Copilot tuning knobs (`[copilot]`).

use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CopilotConfig {
    /// Minutes a recommendation stays actionable.
    #[serde(default = "default_recommendation_ttl_minutes")]
    pub recommendation_ttl_minutes: u32,
    /// TTL a theme claim is re-armed with after a failed attempt.
    #[serde(default = "default_claim_retry_ttl_seconds")]
    pub claim_retry_ttl_seconds: u64,
    /// Snapshots loaded on each side of the trigger bucket for evidence.
    #[serde(default = "default_evidence_points")]
    pub evidence_points: usize,
    /// Points required before the copilot will reason about a market.
    #[serde(default = "default_min_snapshots")]
    pub min_snapshots: usize,
    #[serde(default = "default_llm_cache_ttl_seconds")]
    pub llm_cache_ttl_seconds: u64,
    #[serde(default = "default_callback_marker_ttl_seconds")]
    pub callback_marker_ttl_seconds: u64,
    /// Duration offered by the mute buttons.
    #[serde(default = "default_mute_minutes")]
    pub mute_minutes: u32,
    #[serde(default = "default_min_notional_usd")]
    pub min_notional_usd: Decimal,
    #[serde(default = "default_min_shares")]
    pub min_shares: Decimal,
    #[serde(default = "default_max_shares")]
    pub max_shares: Decimal,
}

const fn default_recommendation_ttl_minutes() -> u32 {
    60
}

const fn default_claim_retry_ttl_seconds() -> u64 {
    300
}

const fn default_evidence_points() -> usize {
    6
}

const fn default_min_snapshots() -> usize {
    2
}

const fn default_llm_cache_ttl_seconds() -> u64 {
    1800
}

const fn default_callback_marker_ttl_seconds() -> u64 {
    86_400
}

const fn default_mute_minutes() -> u32 {
    1440
}

fn default_min_notional_usd() -> Decimal {
    dec!(5)
}

fn default_min_shares() -> Decimal {
    dec!(1)
}

fn default_max_shares() -> Decimal {
    dec!(100000)
}

impl Default for CopilotConfig {
    fn default() -> Self {
        Self {
            recommendation_ttl_minutes: default_recommendation_ttl_minutes(),
            claim_retry_ttl_seconds: default_claim_retry_ttl_seconds(),
            evidence_points: default_evidence_points(),
            min_snapshots: default_min_snapshots(),
            llm_cache_ttl_seconds: default_llm_cache_ttl_seconds(),
            callback_marker_ttl_seconds: default_callback_marker_ttl_seconds(),
            mute_minutes: default_mute_minutes(),
            min_notional_usd: default_min_notional_usd(),
            min_shares: default_min_shares(),
            max_shares: default_max_shares(),
        }
    }
}

impl CopilotConfig {
    #[must_use]
    pub fn claim_retry_ttl(&self) -> Duration {
        Duration::from_secs(self.claim_retry_ttl_seconds.max(1))
    }

    #[must_use]
    pub fn llm_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.llm_cache_ttl_seconds.max(1))
    }

    #[must_use]
    pub fn callback_marker_ttl(&self) -> Duration {
        Duration::from_secs(self.callback_marker_ttl_seconds.max(1))
    }

    #[must_use]
    pub fn recommendation_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.recommendation_ttl_minutes.max(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_section_keeps_defaults() {
        let config: CopilotConfig = toml::from_str(
            r#"
            recommendation_ttl_minutes = 30
            min_notional_usd = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.recommendation_ttl_minutes, 30);
        assert_eq!(config.min_notional_usd, dec!(10));
        assert_eq!(config.max_shares, dec!(100000));
        assert_eq!(config.claim_retry_ttl(), Duration::from_secs(300));
    }
}
