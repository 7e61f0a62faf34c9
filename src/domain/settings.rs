//! Per-user effective settings and the typed layers they are built from.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::alert::Strength;

/// Fully merged configuration for one user.
///
/// Immutable once resolved; recomputed (or read from cache) per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectiveSettings {
    pub plan_name: String,
    pub copilot_enabled: bool,
    pub max_copilot_per_day: u32,
    pub max_copilot_per_hour: u32,
    pub max_copilot_per_digest: u32,
    pub copilot_theme_ttl_minutes: u32,
    pub digest_window_minutes: u32,
    pub max_themes_per_digest: u32,
    pub max_markets_per_theme: u32,
    pub max_alerts_per_digest: u32,
    pub min_liquidity: f64,
    pub min_volume_24h: f64,
    pub min_abs_move: f64,
    /// Strict band, used by the standard digest and copilot path.
    pub p_min: f64,
    pub p_max: f64,
    /// Soft band, used by the fast path.
    pub fast_p_min: f64,
    pub fast_p_max: f64,
    pub allowed_strengths: BTreeSet<Strength>,
    pub fast_signals_enabled: bool,
    pub fast_window_minutes: u32,
    pub fast_max_themes_per_digest: u32,
    pub fast_max_markets_per_theme: u32,
    pub allow_info_alerts: bool,
    pub allow_fast_alerts: bool,
    pub risk_budget_usd_per_day: Decimal,
    pub max_usd_per_trade: Decimal,
    pub max_liquidity_fraction: f64,
}

impl Default for EffectiveSettings {
    fn default() -> Self {
        Self {
            plan_name: "basic".into(),
            copilot_enabled: false,
            max_copilot_per_day: 3,
            max_copilot_per_hour: 2,
            max_copilot_per_digest: 1,
            copilot_theme_ttl_minutes: 360,
            digest_window_minutes: 60,
            max_themes_per_digest: 5,
            max_markets_per_theme: 3,
            max_alerts_per_digest: 10,
            min_liquidity: 1000.0,
            min_volume_24h: 1000.0,
            min_abs_move: 0.02,
            p_min: 0.15,
            p_max: 0.85,
            fast_p_min: 0.05,
            fast_p_max: 0.95,
            allowed_strengths: [Strength::Medium, Strength::Strong].into_iter().collect(),
            fast_signals_enabled: false,
            fast_window_minutes: 5,
            fast_max_themes_per_digest: 3,
            fast_max_markets_per_theme: 2,
            allow_info_alerts: true,
            allow_fast_alerts: false,
            risk_budget_usd_per_day: dec!(100),
            max_usd_per_trade: dec!(25),
            max_liquidity_fraction: 0.01,
        }
    }
}

impl EffectiveSettings {
    /// True when `p` lies inside the strict (standard) band.
    #[must_use]
    pub fn in_strict_band(&self, p: f64) -> bool {
        p >= self.p_min && p <= self.p_max
    }

    /// True when `p` lies inside the soft (fast) band.
    #[must_use]
    pub fn in_soft_band(&self, p: f64) -> bool {
        p >= self.fast_p_min && p <= self.fast_p_max
    }

    /// Fast section is shown only when the user opted in and the plan allows it.
    #[must_use]
    pub fn fast_section_enabled(&self) -> bool {
        self.fast_signals_enabled && self.allow_fast_alerts
    }
}

/// One optional overlay over [`EffectiveSettings`].
///
/// Plans, preferences and override documents all reduce to a layer; only
/// `Some` fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsLayer {
    pub copilot_enabled: Option<bool>,
    pub max_copilot_per_day: Option<u32>,
    pub max_copilot_per_hour: Option<u32>,
    pub max_copilot_per_digest: Option<u32>,
    pub copilot_theme_ttl_minutes: Option<u32>,
    pub digest_window_minutes: Option<u32>,
    pub max_themes_per_digest: Option<u32>,
    pub max_markets_per_theme: Option<u32>,
    pub max_alerts_per_digest: Option<u32>,
    pub min_liquidity: Option<f64>,
    pub min_volume_24h: Option<f64>,
    pub min_abs_move: Option<f64>,
    pub p_min: Option<f64>,
    pub p_max: Option<f64>,
    pub fast_p_min: Option<f64>,
    pub fast_p_max: Option<f64>,
    pub allowed_strengths: Option<BTreeSet<Strength>>,
    pub fast_signals_enabled: Option<bool>,
    pub fast_window_minutes: Option<u32>,
    pub fast_max_themes_per_digest: Option<u32>,
    pub fast_max_markets_per_theme: Option<u32>,
    pub risk_budget_usd_per_day: Option<Decimal>,
    pub max_usd_per_trade: Option<Decimal>,
    pub max_liquidity_fraction: Option<f64>,
}

macro_rules! overlay {
    ($layer:expr, $target:expr; $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = &$layer.$field {
                $target.$field = value.clone();
            }
        )+
    };
}

impl SettingsLayer {
    /// Apply every `Some` field onto `target`.
    ///
    /// `copilot_enabled` is not applied here: it is the user's personal
    /// toggle and is combined with the plan flag by the resolver.
    pub fn apply(&self, target: &mut EffectiveSettings) {
        overlay!(self, target;
            max_copilot_per_day,
            max_copilot_per_hour,
            max_copilot_per_digest,
            copilot_theme_ttl_minutes,
            digest_window_minutes,
            max_themes_per_digest,
            max_markets_per_theme,
            max_alerts_per_digest,
            min_liquidity,
            min_volume_24h,
            min_abs_move,
            p_min,
            p_max,
            fast_p_min,
            fast_p_max,
            allowed_strengths,
            fast_signals_enabled,
            fast_window_minutes,
            fast_max_themes_per_digest,
            fast_max_markets_per_theme,
            risk_budget_usd_per_day,
            max_usd_per_trade,
            max_liquidity_fraction,
        );
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Stored per-user preference row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreference {
    /// Personal copilot toggle; combined with the plan flag.
    pub copilot_enabled: bool,
    #[serde(flatten)]
    pub layer: SettingsLayer,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_layer_changes_nothing() {
        let mut settings = EffectiveSettings::default();
        SettingsLayer::default().apply(&mut settings);
        assert_eq!(settings, EffectiveSettings::default());
    }

    #[test]
    fn layer_overlays_only_present_fields() {
        let mut settings = EffectiveSettings::default();
        let layer = SettingsLayer {
            p_min: Some(0.2),
            max_alerts_per_digest: Some(4),
            ..SettingsLayer::default()
        };
        layer.apply(&mut settings);
        assert_eq!(settings.p_min, 0.2);
        assert_eq!(settings.max_alerts_per_digest, 4);
        assert_eq!(settings.p_max, EffectiveSettings::default().p_max);
    }

    #[test]
    fn layer_does_not_touch_copilot_toggle() {
        let mut settings = EffectiveSettings::default();
        let layer = SettingsLayer {
            copilot_enabled: Some(true),
            ..SettingsLayer::default()
        };
        layer.apply(&mut settings);
        assert!(!settings.copilot_enabled);
    }

    #[test]
    fn fast_section_needs_opt_in_and_plan() {
        let mut settings = EffectiveSettings {
            fast_signals_enabled: true,
            ..EffectiveSettings::default()
        };
        assert!(!settings.fast_section_enabled());
        settings.allow_fast_alerts = true;
        assert!(settings.fast_section_enabled());
    }
}
