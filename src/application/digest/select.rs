//! Per-user alert filtering, ranking and capping.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::application::detect::gate::at_least;
use crate::domain::alert::Alert;
use crate::domain::settings::EffectiveSettings;
use crate::domain::theme::Theme;

/// Which probability band applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Strict,
    Soft,
}

/// Liquidity, volume, move, strength and probability-band gates.
///
/// The fast path skips the strength gate: fast alerts carry their own
/// confidence tier instead of a detector strength.
#[must_use]
pub fn passes_user_filters(alert: &Alert, settings: &EffectiveSettings, band: Band) -> bool {
    let in_band = match band {
        Band::Strict => settings.in_strict_band(alert.p_yes()),
        Band::Soft => settings.in_soft_band(alert.p_yes()),
    };
    alert.liquidity >= settings.min_liquidity
        && alert.volume_24h >= settings.min_volume_24h
        && at_least(alert.abs_move(), settings.min_abs_move)
        && (band == Band::Soft || settings.allowed_strengths.contains(&alert.strength))
        && in_band
}

fn rank_order(a: &Alert, b: &Alert) -> Ordering {
    b.abs_move()
        .total_cmp(&a.abs_move())
        .then_with(|| b.liquidity.total_cmp(&a.liquidity))
        .then_with(|| b.volume_24h.total_cmp(&a.volume_24h))
        .then_with(|| a.contract_id.cmp(&b.contract_id))
        .then_with(|| a.id.cmp(&b.id))
}

/// Order by move, liquidity and volume (all descending), then contract id,
/// keeping the first alert per contract.
#[must_use]
pub fn rank(mut alerts: Vec<Alert>) -> Vec<Alert> {
    alerts.sort_by(rank_order);
    let mut seen = HashSet::new();
    alerts.retain(|alert| seen.insert(alert.contract_id.clone()));
    alerts
}

/// Keep the first `max_themes` themes and the first `max_markets` members of
/// each. A cap of zero empties the section.
pub fn cap_themes(themes: &mut Vec<Theme>, max_themes: u32, max_markets: u32) {
    if max_markets == 0 {
        themes.clear();
        return;
    }
    themes.truncate(max_themes as usize);
    for theme in themes.iter_mut() {
        theme.members.truncate(max_markets as usize);
    }
}
