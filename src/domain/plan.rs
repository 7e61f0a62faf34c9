//! Subscription plan tiers and their alert rules.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::settings::SettingsLayer;

/// Subscription tier. The upgrade path is basic, pro, elite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    #[default]
    Basic,
    Pro,
    Elite,
}

impl PlanTier {
    /// Parse a plan name. Unknown names fall back to `Pro` rules.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "basic" => Self::Basic,
            "elite" => Self::Elite,
            _ => Self::Pro,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Pro => "pro",
            Self::Elite => "elite",
        }
    }

    /// Next tier up, if any.
    #[must_use]
    pub const fn upgrade(self) -> Option<Self> {
        match self {
            Self::Basic => Some(Self::Pro),
            Self::Pro => Some(Self::Elite),
            Self::Elite => None,
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed probability interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityBand {
    pub min: f64,
    pub max: f64,
}

impl ProbabilityBand {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn contains(&self, p: f64) -> bool {
        p >= self.min && p <= self.max
    }
}

/// Per-plan alert rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanRules {
    pub allow_info_alerts: bool,
    pub allow_fast_alerts: bool,
    pub strict_band: ProbabilityBand,
    pub soft_band: ProbabilityBand,
}

pub const DEFAULT_STRICT_BAND: ProbabilityBand = ProbabilityBand::new(0.15, 0.85);
pub const DEFAULT_SOFT_BAND: ProbabilityBand = ProbabilityBand::new(0.05, 0.95);

impl PlanRules {
    #[must_use]
    pub const fn for_tier(tier: PlanTier) -> Self {
        Self {
            allow_info_alerts: true,
            allow_fast_alerts: matches!(tier, PlanTier::Elite),
            strict_band: DEFAULT_STRICT_BAND,
            soft_band: DEFAULT_SOFT_BAND,
        }
    }
}

/// A subscription plan: flags, rules and optional numeric overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub name: String,
    pub tier: PlanTier,
    pub copilot_enabled: bool,
    pub rules: PlanRules,
    #[serde(default)]
    pub layer: SettingsLayer,
}

impl Plan {
    /// Built-in plan for a tier.
    #[must_use]
    pub fn builtin(tier: PlanTier) -> Self {
        let layer = match tier {
            PlanTier::Basic => SettingsLayer {
                max_copilot_per_day: Some(0),
                max_themes_per_digest: Some(3),
                max_alerts_per_digest: Some(5),
                ..SettingsLayer::default()
            },
            PlanTier::Pro => SettingsLayer {
                max_copilot_per_day: Some(3),
                max_copilot_per_hour: Some(2),
                max_copilot_per_digest: Some(1),
                max_themes_per_digest: Some(5),
                max_alerts_per_digest: Some(10),
                ..SettingsLayer::default()
            },
            PlanTier::Elite => SettingsLayer {
                max_copilot_per_day: Some(10),
                max_copilot_per_hour: Some(4),
                max_copilot_per_digest: Some(2),
                max_themes_per_digest: Some(8),
                max_alerts_per_digest: Some(20),
                ..SettingsLayer::default()
            },
        };

        Self {
            name: tier.as_str().to_string(),
            tier,
            copilot_enabled: !matches!(tier, PlanTier::Basic),
            rules: PlanRules::for_tier(tier),
            layer,
        }
    }

    /// Built-in plan looked up by name; unknown names get `pro` rules.
    #[must_use]
    pub fn by_name(name: &str) -> Self {
        let mut plan = Self::builtin(PlanTier::from_name(name));
        if !name.trim().is_empty() {
            plan.name = name.trim().to_ascii_lowercase();
        }
        plan
    }

    /// Suggestion shown when a plan cap blocks the copilot.
    #[must_use]
    pub fn upgrade_hint(&self) -> Option<String> {
        self.tier
            .upgrade()
            .map(|next| format!("Upgrade to {next} for more copilot recommendations."))
    }
}
