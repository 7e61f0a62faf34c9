//! Key-value store key layout.
//!
//! Every key the pipeline reads or writes is built here so the layout can
//! be audited in one place.

use chrono::{DateTime, Utc};

use crate::domain::id::{AlertId, UserId};

pub const INGEST_LOCK: &str = "ingest:lock";
pub const INGEST_LAST_TS: &str = "ingest:last_ts";
pub const INGEST_LAST_RESULT: &str = "ingest:last_result";

#[must_use]
pub fn effective_settings(user: &UserId) -> String {
    format!("user:effective_settings:{user}")
}

/// Marker that a digest with this content fingerprint was sent.
#[must_use]
pub fn digest_sent(user: &UserId, fingerprint: &str) -> String {
    format!("digest:sent:{user}:{fingerprint}")
}

#[must_use]
pub fn digest_last_sent(user: &UserId) -> String {
    format!("alerts:digest:last_sent:user:{user}")
}

#[must_use]
pub fn copilot_daily(user: &UserId, now: DateTime<Utc>) -> String {
    format!("copilot:count:{user}:{}", now.format("%Y%m%d"))
}

#[must_use]
pub fn copilot_hourly(user: &UserId, now: DateTime<Utc>) -> String {
    format!("copilot:hourly:{user}:{}", now.format("%Y%m%d%H"))
}

/// Daily notional (in cents) committed through accepted recommendations.
#[must_use]
pub fn risk_spent(user: &UserId, now: DateTime<Utc>) -> String {
    format!("ai:risk:spent:{user}:{}", now.format("%Y%m%d"))
}

#[must_use]
pub fn copilot_last_eval(user: &UserId) -> String {
    format!("copilot:last_eval:{user}")
}

/// Cached completion for one user and alert.
#[must_use]
pub fn llm_response(user: &UserId, alert: &AlertId) -> String {
    format!("ai:llm:{user}:{alert}")
}

/// At-most-one copilot recommendation per user and theme within the TTL.
#[must_use]
pub fn theme_claim(user: &UserId, theme_key: &str) -> String {
    format!("copilot:theme:{user}:{theme_key}")
}

/// Marker that a button press with this callback id was processed.
#[must_use]
pub fn callback_marker(callback_id: &str) -> String {
    format!("copilot:callback:{callback_id}")
}

/// Per-run counters and timings under `run:{id}:`.
#[must_use]
pub fn run_field(run_id: &str, field: &str) -> String {
    format!("run:{run_id}:{field}")
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn dated_keys_use_compact_utc_stamps() {
        let user = UserId::new("42");
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 9, 30, 0).unwrap();
        assert_eq!(copilot_daily(&user, now), "copilot:count:42:20260105");
        assert_eq!(copilot_hourly(&user, now), "copilot:hourly:42:2026010509");
        assert_eq!(risk_spent(&user, now), "ai:risk:spent:42:20260105");
    }

    #[test]
    fn user_keys_embed_the_user_id() {
        let user = UserId::new("7");
        assert_eq!(effective_settings(&user), "user:effective_settings:7");
        assert_eq!(digest_sent(&user, "abc"), "digest:sent:7:abc");
        assert_eq!(digest_last_sent(&user), "alerts:digest:last_sent:user:7");
        assert_eq!(
            theme_claim(&user, "bitcoin|jan-5|price-band"),
            "copilot:theme:7:bitcoin|jan-5|price-band"
        );
    }
}
