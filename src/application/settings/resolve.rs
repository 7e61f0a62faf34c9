//! Layered settings resolution.
//!
//! Precedence, lowest to highest: code defaults, plan rules and plan
//! overlay, stored preference, override document.

use serde_json::Value;
use tracing::debug;

use crate::domain::plan::Plan;
use crate::domain::settings::{EffectiveSettings, SettingsLayer, UserPreference};
use crate::domain::user::UserProfile;

use super::coerce::layer_from_overrides;

fn apply_plan(settings: &mut EffectiveSettings, plan: &Plan) {
    settings.plan_name = plan.name.clone();
    settings.allow_info_alerts = plan.rules.allow_info_alerts;
    settings.allow_fast_alerts = plan.rules.allow_fast_alerts;
    settings.p_min = plan.rules.strict_band.min;
    settings.p_max = plan.rules.strict_band.max;
    settings.fast_p_min = plan.rules.soft_band.min;
    settings.fast_p_max = plan.rules.soft_band.max;
    plan.layer.apply(settings);
}

/// Apply `layer`, keeping the previous bands if the result would invert one.
fn apply_checked(settings: &mut EffectiveSettings, layer: &SettingsLayer, source: &'static str) {
    let before = (settings.p_min, settings.p_max, settings.fast_p_min, settings.fast_p_max);
    layer.apply(settings);
    if settings.p_min > settings.p_max {
        debug!(source, p_min = settings.p_min, p_max = settings.p_max, "inverted strict band ignored");
        settings.p_min = before.0;
        settings.p_max = before.1;
    }
    if settings.fast_p_min > settings.fast_p_max {
        debug!(source, "inverted soft band ignored");
        settings.fast_p_min = before.2;
        settings.fast_p_max = before.3;
    }
}

/// Merge every layer into one [`EffectiveSettings`]. Pure and idempotent.
///
/// The copilot toggle is the override value if present, else the
/// preference toggle; it only takes effect when the plan enables the
/// copilot.
#[must_use]
pub fn resolve_effective_settings(
    defaults: &EffectiveSettings,
    plan: &Plan,
    preference: Option<&UserPreference>,
    overrides: Option<&Value>,
) -> EffectiveSettings {
    let mut settings = defaults.clone();
    apply_plan(&mut settings, plan);

    if let Some(preference) = preference {
        apply_checked(&mut settings, &preference.layer, "preference");
    }

    let override_layer = overrides.map(layer_from_overrides).unwrap_or_default();
    apply_checked(&mut settings, &override_layer, "override");

    let toggle = override_layer
        .copilot_enabled
        .or(preference.map(|p| p.copilot_enabled))
        .unwrap_or(false);
    settings.copilot_enabled = toggle && plan.copilot_enabled;
    settings
}

/// Resolve a subscriber's settings from their profile.
#[must_use]
pub fn resolve_for_user(defaults: &EffectiveSettings, user: &UserProfile) -> EffectiveSettings {
    let plan = Plan::by_name(&user.plan);
    resolve_effective_settings(defaults, &plan, user.preference.as_ref(), user.overrides.as_ref())
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;
    use crate::domain::plan::PlanTier;

    fn preference(layer: SettingsLayer, copilot: bool) -> UserPreference {
        UserPreference {
            copilot_enabled: copilot,
            layer,
        }
    }

    #[test]
    fn later_layers_win() {
        let plan = Plan::builtin(PlanTier::Pro);
        let pref = preference(
            SettingsLayer {
                p_min: Some(0.2),
                ..SettingsLayer::default()
            },
            false,
        );
        let overrides = json!({"p_min": 0.1});

        let defaults = EffectiveSettings::default();
        let settings = resolve_effective_settings(&defaults, &plan, Some(&pref), Some(&overrides));
        assert_eq!(settings.p_min, 0.1);

        let without_override = resolve_effective_settings(&defaults, &plan, Some(&pref), None);
        assert_eq!(without_override.p_min, 0.2);

        let plan_only = resolve_effective_settings(&defaults, &plan, None, None);
        assert_eq!(plan_only.p_min, 0.15);
    }

    #[test]
    fn resolution_is_idempotent() {
        let plan = Plan::builtin(PlanTier::Elite);
        let overrides = json!({"max_usd_per_trade": "40", "allowed_strengths": "strong"});
        let defaults = EffectiveSettings::default();
        let first = resolve_effective_settings(&defaults, &plan, None, Some(&overrides));
        let second = resolve_effective_settings(&defaults, &plan, None, Some(&overrides));
        assert_eq!(first, second);
        assert_eq!(first.max_usd_per_trade, dec!(40));
        assert_eq!(first.allowed_strengths.len(), 1);
    }

    #[test]
    fn copilot_requires_plan_and_toggle() {
        let defaults = EffectiveSettings::default();
        let on = preference(SettingsLayer::default(), true);

        let basic = Plan::builtin(PlanTier::Basic);
        assert!(!resolve_effective_settings(&defaults, &basic, Some(&on), None).copilot_enabled);

        let pro = Plan::builtin(PlanTier::Pro);
        assert!(resolve_effective_settings(&defaults, &pro, Some(&on), None).copilot_enabled);
        assert!(!resolve_effective_settings(&defaults, &pro, None, None).copilot_enabled);

        let off = json!({"copilot_enabled": "no"});
        assert!(!resolve_effective_settings(&defaults, &pro, Some(&on), Some(&off)).copilot_enabled);
    }

    #[test]
    fn plan_rules_set_bands_and_flags() {
        let elite = Plan::builtin(PlanTier::Elite);
        let settings = resolve_effective_settings(&EffectiveSettings::default(), &elite, None, None);
        assert_eq!(settings.plan_name, "elite");
        assert!(settings.allow_fast_alerts);
        assert_eq!((settings.fast_p_min, settings.fast_p_max), (0.05, 0.95));
        assert_eq!(settings.max_copilot_per_day, 10);
    }

    #[test]
    fn override_that_inverts_the_band_is_ignored() {
        let plan = Plan::builtin(PlanTier::Pro);
        let overrides = json!({"p_min": 0.9});
        let settings =
            resolve_effective_settings(&EffectiveSettings::default(), &plan, None, Some(&overrides));
        assert_eq!((settings.p_min, settings.p_max), (0.15, 0.85));
    }

    #[test]
    fn profile_resolution_uses_plan_name() {
        let user = UserProfile {
            id: "u1".into(),
            chat_id: 7,
            plan: "elite".into(),
            preference: None,
            overrides: Some(json!({"probability_band": [0.3, 0.7]})),
        };
        let settings = resolve_for_user(&EffectiveSettings::default(), &user);
        assert_eq!(settings.plan_name, "elite");
        assert_eq!((settings.p_min, settings.p_max), (0.3, 0.7));
    }
}
