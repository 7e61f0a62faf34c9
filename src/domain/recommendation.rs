//! Copilot recommendations and their audit trail.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::classification::Confidence;
use super::id::{AlertId, RecommendationId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecommendationKind {
    Buy,
    Wait,
    Skip,
}

impl RecommendationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Wait => "WAIT",
            Self::Skip => "SKIP",
        }
    }

    #[must_use]
    pub fn parse_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "BUY" => Some(Self::Buy),
            "WAIT" => Some(Self::Wait),
            "SKIP" => Some(Self::Skip),
            _ => None,
        }
    }
}

impl fmt::Display for RecommendationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state. Transitions are only legal out of `Proposed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecommendationStatus {
    Proposed,
    Confirmed,
    Skipped,
    Expired,
}

impl RecommendationStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Proposed => "PROPOSED",
            Self::Confirmed => "CONFIRMED",
            Self::Skipped => "SKIPPED",
            Self::Expired => "EXPIRED",
        }
    }

    #[must_use]
    pub const fn is_settled(self) -> bool {
        !matches!(self, Self::Proposed)
    }
}

impl fmt::Display for RecommendationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sized, unsubmitted order the user may place manually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftOrder {
    /// Always `BUY YES` for now.
    pub side: String,
    pub price: Decimal,
    pub size_shares: Decimal,
    pub notional_usd: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: RecommendationId,
    pub user_id: UserId,
    pub alert_id: AlertId,
    pub theme_key: String,
    pub recommendation: RecommendationKind,
    pub confidence: Confidence,
    pub rationale: String,
    pub risks: Vec<String>,
    pub draft: Option<DraftOrder>,
    pub status: RecommendationStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Recommendation {
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    Proposed,
    Confirmed,
    Skipped,
    Expired,
}

/// Append-only record of a recommendation status change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub recommendation_id: RecommendationId,
    pub user_id: UserId,
    pub kind: AuditKind,
    pub at: DateTime<Utc>,
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_proposed_is_unsettled() {
        assert!(!RecommendationStatus::Proposed.is_settled());
        assert!(RecommendationStatus::Confirmed.is_settled());
        assert!(RecommendationStatus::Skipped.is_settled());
        assert!(RecommendationStatus::Expired.is_settled());
    }

    #[test]
    fn kind_tokens_parse() {
        assert_eq!(RecommendationKind::parse_token("buy"), Some(RecommendationKind::Buy));
        assert_eq!(RecommendationKind::parse_token("HOLD"), None);
    }
}
