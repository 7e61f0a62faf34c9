//! Copilot eligibility gates.
//!
//! Reasons are reported in a fixed order so the first one is always the
//! most fundamental. Static gates (toggle, mutes, classification, band,
//! data quality) are evaluated once per theme; usage caps are checked again
//! before every claim because they move as recommendations go out.

use std::fmt;

use serde::Serialize;

use crate::domain::alert::{Alert, Strength};
use crate::domain::classification::SuggestedAction;
use crate::domain::settings::EffectiveSettings;
use crate::domain::theme::ThemeMember;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Ineligibility {
    UserDisabled,
    DailyCapReached,
    HourlyCapReached,
    DigestCapReached,
    /// Usage counters could not be read; nothing is sent until they can.
    UsageUnavailable,
    Muted,
    LabelMappingUnknown,
    NotActionable,
    NotFollow,
    POutOfBand,
    InsufficientSnapshots,
    MissingPriceOrLiquidity,
    CopilotDedupeActive,
}

impl Ineligibility {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserDisabled => "USER_DISABLED",
            Self::DailyCapReached => "DAILY_CAP_REACHED",
            Self::HourlyCapReached => "HOURLY_CAP_REACHED",
            Self::DigestCapReached => "DIGEST_CAP_REACHED",
            Self::UsageUnavailable => "USAGE_UNAVAILABLE",
            Self::Muted => "MUTED",
            Self::LabelMappingUnknown => "LABEL_MAPPING_UNKNOWN",
            Self::NotActionable => "NOT_ACTIONABLE",
            Self::NotFollow => "NOT_FOLLOW",
            Self::POutOfBand => "P_OUT_OF_BAND",
            Self::InsufficientSnapshots => "INSUFFICIENT_SNAPSHOTS",
            Self::MissingPriceOrLiquidity => "MISSING_PRICE_OR_LIQUIDITY",
            Self::CopilotDedupeActive => "COPILOT_DEDUPE_ACTIVE",
        }
    }

    /// Caps a higher plan would lift.
    #[must_use]
    pub const fn is_plan_cap(self) -> bool {
        matches!(self, Self::DailyCapReached | Self::HourlyCapReached)
    }
}

impl fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recommendations already sent in the current day, hour and digest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Usage {
    pub daily: u32,
    pub hourly: u32,
    pub digest: u32,
}

/// First cap the usage has hit, if any. The per-digest cap is at least one.
#[must_use]
pub fn cap_reached(settings: &EffectiveSettings, usage: Usage) -> Option<Ineligibility> {
    if usage.daily >= settings.max_copilot_per_day {
        Some(Ineligibility::DailyCapReached)
    } else if usage.hourly >= settings.max_copilot_per_hour {
        Some(Ineligibility::HourlyCapReached)
    } else if usage.digest >= settings.max_copilot_per_digest.max(1) {
        Some(Ineligibility::DigestCapReached)
    } else {
        None
    }
}

/// Facts about a representative gathered before gating.
#[derive(Debug, Clone, Copy)]
pub struct Observed {
    pub muted: bool,
    pub snapshots: usize,
}

fn has_market_data(alert: &Alert) -> bool {
    let valid_price = |p: f64| p.is_finite() && p > 0.0 && p < 1.0;
    valid_price(alert.new_price)
        && alert.old_price.is_finite()
        && alert.liquidity.is_finite()
        && alert.liquidity > 0.0
}

/// Every static gate the representative fails, in reporting order.
///
/// Fast-path members carry no classification: they pass on the soft band
/// with an unknown label mapping, and need a MEDIUM (or better) detector
/// confidence instead of a FOLLOW suggestion.
#[must_use]
pub fn static_reasons(
    settings: &EffectiveSettings,
    member: &ThemeMember,
    observed: Observed,
    min_snapshots: usize,
) -> Vec<Ineligibility> {
    let alert = &member.alert;
    let fast = alert.is_fast();
    let mut reasons = Vec::new();

    if !settings.copilot_enabled {
        reasons.push(Ineligibility::UserDisabled);
    }
    if observed.muted {
        reasons.push(Ineligibility::Muted);
    }
    if !fast && !alert.outcome.is_known() {
        reasons.push(Ineligibility::LabelMappingUnknown);
    }
    match (&member.classification, fast) {
        (Some(classification), _) => {
            if !classification.actionability.is_actionable() {
                reasons.push(Ineligibility::NotActionable);
            }
            if classification.suggested_action != SuggestedAction::Follow {
                reasons.push(Ineligibility::NotFollow);
            }
        }
        (None, true) => {
            if alert.strength < Strength::Medium {
                reasons.push(Ineligibility::NotActionable);
            }
        }
        (None, false) => {
            reasons.push(Ineligibility::NotActionable);
            reasons.push(Ineligibility::NotFollow);
        }
    }
    let in_band = if fast {
        settings.in_soft_band(alert.p_yes())
    } else {
        settings.in_strict_band(alert.p_yes())
    };
    if !in_band {
        reasons.push(Ineligibility::POutOfBand);
    }
    if observed.snapshots < min_snapshots {
        reasons.push(Ineligibility::InsufficientSnapshots);
    }
    if !has_market_data(alert) {
        reasons.push(Ineligibility::MissingPriceOrLiquidity);
    }
    reasons
}
