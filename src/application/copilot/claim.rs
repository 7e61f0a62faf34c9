//! Per-user, per-theme exclusive claims.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::application::keyspace;
use crate::domain::id::{AlertId, UserId};
use crate::port::outbound::kv::KeyValueStore;

const MIN_CLAIM_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// This caller owns the theme until the TTL runs out.
    Claimed,
    /// Another run holds it (or the store could not be reached).
    Held,
}

/// Claim TTL for a theme: the plan's theme TTL, never below a minute.
#[must_use]
pub fn claim_ttl(theme_ttl_minutes: u32) -> Duration {
    Duration::from_secs((u64::from(theme_ttl_minutes) * 60).max(MIN_CLAIM_SECS))
}

#[derive(Clone)]
pub struct ThemeClaims {
    kv: Arc<dyn KeyValueStore>,
}

impl ThemeClaims {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Set-if-absent on the theme key. A store failure counts as held.
    pub async fn claim(
        &self,
        user: &UserId,
        theme_key: &str,
        alert: &AlertId,
        ttl: Duration,
    ) -> ClaimOutcome {
        let key = keyspace::theme_claim(user, theme_key);
        match self.kv.set_nx(&key, alert.as_str(), ttl).await {
            Ok(true) => ClaimOutcome::Claimed,
            Ok(false) => ClaimOutcome::Held,
            Err(error) => {
                warn!(user_id = %user, theme_key, error = %error, "theme claim failed");
                ClaimOutcome::Held
            }
        }
    }

    /// Shorten a claim to the retry TTL so a later run may try again.
    pub async fn release(&self, user: &UserId, theme_key: &str, alert: &AlertId, retry: Duration) {
        let key = keyspace::theme_claim(user, theme_key);
        if let Err(error) = self.kv.set(&key, alert.as_str(), Some(retry)).await {
            warn!(user_id = %user, theme_key, error = %error, "theme claim release failed");
        }
    }
}
