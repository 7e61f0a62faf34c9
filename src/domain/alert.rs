//! Detector output.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{AlertId, ContractId, TenantId};
use super::snapshot::OutcomeLabels;

/// Which detector produced an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    StandardDislocation,
    FastDislocation,
}

impl AlertType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StandardDislocation => "STANDARD_DISLOCATION",
            Self::FastDislocation => "FAST_DISLOCATION",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STANDARD_DISLOCATION" => Ok(Self::StandardDislocation),
            "FAST_DISLOCATION" => Ok(Self::FastDislocation),
            other => Err(format!("unknown alert type: {other}")),
        }
    }
}

/// Detector strength tier. `Low` is only produced by the fast detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Strength {
    Low,
    Medium,
    Strong,
}

impl Strength {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::Strong => "STRONG",
        }
    }

    /// Parse a case-insensitive token, ignoring surrounding whitespace.
    #[must_use]
    pub fn parse_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "LOW" => Some(Self::Low),
            "MEDIUM" => Some(Self::Medium),
            "STRONG" => Some(Self::Strong),
            _ => None,
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected price dislocation.
///
/// Unique per `(alert_type, contract_id, bucket_ts)`; never updated after
/// creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub tenant_id: TenantId,
    pub alert_type: AlertType,
    pub contract_id: ContractId,
    pub title: String,
    pub category: Option<String>,
    pub slug: Option<String>,
    pub old_price: f64,
    pub new_price: f64,
    /// Move relative to `max(old_price, floor_price)`.
    pub delta_pct: f64,
    pub liquidity: f64,
    pub volume_24h: f64,
    pub best_ask: Option<f64>,
    pub strength: Strength,
    pub outcome: OutcomeLabels,
    pub bucket_ts: DateTime<Utc>,
    pub triggered_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Alert {
    /// Signed price move `new - old`.
    #[must_use]
    pub fn signed_move(&self) -> f64 {
        self.new_price - self.old_price
    }

    /// Absolute price move.
    #[must_use]
    pub fn abs_move(&self) -> f64 {
        self.signed_move().abs()
    }

    /// `+1.0` for up moves (including flat), `-1.0` for down moves.
    #[must_use]
    pub fn direction(&self) -> f64 {
        if self.signed_move() >= 0.0 {
            1.0
        } else {
            -1.0
        }
    }

    /// Current YES probability as seen by the detector.
    #[must_use]
    pub fn p_yes(&self) -> f64 {
        self.new_price
    }

    #[must_use]
    pub fn is_fast(&self) -> bool {
        self.alert_type == AlertType::FastDislocation
    }
}

/// Result of an insert-if-absent write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The row was new and has been written.
    Inserted,
    /// A row with the same idempotency key already existed.
    Duplicate,
}

impl InsertOutcome {
    #[must_use]
    pub const fn is_inserted(self) -> bool {
        matches!(self, Self::Inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strength_tokens_parse_case_insensitively() {
        assert_eq!(Strength::parse_token(" strong "), Some(Strength::Strong));
        assert_eq!(Strength::parse_token("Medium"), Some(Strength::Medium));
        assert_eq!(Strength::parse_token("huge"), None);
    }

    #[test]
    fn alert_type_round_trips_through_str() {
        for ty in [AlertType::StandardDislocation, AlertType::FastDislocation] {
            assert_eq!(ty.as_str().parse::<AlertType>().unwrap(), ty);
        }
        assert!("OTHER".parse::<AlertType>().is_err());
    }
}
