//! Draft order sizing.
//!
//! All money math is in [`Decimal`]. The notional is the smallest of the
//! per-trade cap, the remaining daily risk budget and a fraction of the
//! market's liquidity; shares follow from the draft price.

use std::fmt;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::alert::Alert;
use crate::domain::recommendation::DraftOrder;
use crate::domain::settings::EffectiveSettings;

use super::config::CopilotConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizingRejection {
    NoTradeCap,
    NoRiskBudget,
    BudgetExhausted,
    /// The day's spend could not be read, so no budget is assumed.
    BudgetUnavailable,
    MissingPrice,
    MissingLiquidity,
    NotionalBelowMin,
    SharesBelowMin,
}

impl SizingRejection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoTradeCap => "max_usd_per_trade is 0 (or missing)",
            Self::NoRiskBudget => "risk_budget_usd_per_day is 0 (or missing)",
            Self::BudgetExhausted => "daily_budget_remaining is 0",
            Self::BudgetUnavailable => "daily_budget_unavailable",
            Self::MissingPrice => "missing price",
            Self::MissingLiquidity => "missing liquidity",
            Self::NotionalBelowMin => "draft_notional_below_min",
            Self::SharesBelowMin => "draft_size_below_min",
        }
    }
}

impl fmt::Display for SizingRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn positive(value: f64) -> Option<Decimal> {
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    Decimal::from_f64(value).filter(|d| d.is_sign_positive() && !d.is_zero())
}

/// Price the draft is written at: best ask, else the current YES price.
#[must_use]
pub fn draft_price(alert: &Alert) -> Option<Decimal> {
    alert
        .best_ask
        .and_then(positive)
        .or_else(|| positive(alert.p_yes()))
        .or_else(|| positive(alert.new_price))
        .map(|p| p.round_dp(4))
}

/// Size a `BUY YES` draft, or list every reason it cannot be sized.
pub fn size_draft(
    alert: &Alert,
    settings: &EffectiveSettings,
    spent_today: Decimal,
    config: &CopilotConfig,
) -> Result<DraftOrder, Vec<SizingRejection>> {
    let mut rejections = Vec::new();
    if settings.max_usd_per_trade <= Decimal::ZERO {
        rejections.push(SizingRejection::NoTradeCap);
    }
    let remaining = (settings.risk_budget_usd_per_day - spent_today).max(Decimal::ZERO);
    if settings.risk_budget_usd_per_day <= Decimal::ZERO {
        rejections.push(SizingRejection::NoRiskBudget);
    } else if remaining.is_zero() {
        rejections.push(SizingRejection::BudgetExhausted);
    }
    let price = draft_price(alert);
    if price.is_none() {
        rejections.push(SizingRejection::MissingPrice);
    }
    let liquidity = positive(alert.liquidity);
    if liquidity.is_none() {
        rejections.push(SizingRejection::MissingLiquidity);
    }
    let (Some(price), Some(liquidity), true) = (price, liquidity, rejections.is_empty()) else {
        return Err(rejections);
    };

    let fraction = Decimal::from_f64(settings.max_liquidity_fraction.max(0.0)).unwrap_or_default();
    let notional = settings
        .max_usd_per_trade
        .min(remaining)
        .min(liquidity * fraction)
        .round_dp_with_strategy(2, RoundingStrategy::ToZero);

    let mut shares = (notional / price).round_dp_with_strategy(2, RoundingStrategy::ToZero);
    let mut notional = notional;
    if shares > config.max_shares {
        shares = config.max_shares;
        notional = (shares * price).round_dp_with_strategy(2, RoundingStrategy::ToZero);
    }

    if notional < config.min_notional_usd {
        return Err(vec![SizingRejection::NotionalBelowMin]);
    }
    if shares < config.min_shares {
        return Err(vec![SizingRejection::SharesBelowMin]);
    }
    Ok(DraftOrder {
        side: "BUY YES".to_string(),
        price,
        size_shares: shares,
        notional_usd: notional,
    })
}

/// Whole cents for the risk ledger.
#[must_use]
pub fn to_cents(amount: Decimal) -> i64 {
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}

#[must_use]
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::testkit::domain::alert_at;

    fn alert() -> Alert {
        let mut a = alert_at("c", Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap(), 0.40, 0.45);
        a.best_ask = Some(0.46);
        a
    }

    fn settings() -> EffectiveSettings {
        EffectiveSettings {
            max_usd_per_trade: dec!(25),
            risk_budget_usd_per_day: dec!(100),
            max_liquidity_fraction: 0.01,
            ..EffectiveSettings::default()
        }
    }

    #[test]
    fn notional_is_the_smallest_limit() {
        let draft = size_draft(&alert(), &settings(), Decimal::ZERO, &CopilotConfig::default()).unwrap();
        assert_eq!(draft.price, dec!(0.46));
        assert_eq!(draft.notional_usd, dec!(25));
        assert_eq!(draft.size_shares, dec!(54.34));

        let spent = size_draft(&alert(), &settings(), dec!(90), &CopilotConfig::default()).unwrap();
        assert_eq!(spent.notional_usd, dec!(10));

        let mut thin = alert();
        thin.liquidity = 1200.0;
        let capped = size_draft(&thin, &settings(), Decimal::ZERO, &CopilotConfig::default()).unwrap();
        assert_eq!(capped.notional_usd, dec!(12));
    }

    #[test]
    fn falls_back_to_yes_price_without_ask() {
        let mut a = alert();
        a.best_ask = None;
        assert_eq!(draft_price(&a), Some(dec!(0.45)));
    }

    #[test]
    fn zero_limits_are_rejected_together() {
        let broke = EffectiveSettings {
            max_usd_per_trade: Decimal::ZERO,
            risk_budget_usd_per_day: Decimal::ZERO,
            ..settings()
        };
        let mut a = alert();
        a.liquidity = 0.0;
        assert_eq!(
            size_draft(&a, &broke, Decimal::ZERO, &CopilotConfig::default()).unwrap_err(),
            vec![
                SizingRejection::NoTradeCap,
                SizingRejection::NoRiskBudget,
                SizingRejection::MissingLiquidity,
            ]
        );
    }

    #[test]
    fn exhausted_budget_and_small_notional_are_rejected() {
        let config = CopilotConfig::default();
        assert_eq!(
            size_draft(&alert(), &settings(), dec!(100), &config).unwrap_err(),
            vec![SizingRejection::BudgetExhausted]
        );
        assert_eq!(
            size_draft(&alert(), &settings(), dec!(97), &config).unwrap_err(),
            vec![SizingRejection::NotionalBelowMin]
        );
    }

    #[test]
    fn share_cap_recomputes_notional() {
        let config = CopilotConfig {
            max_shares: dec!(20),
            ..CopilotConfig::default()
        };
        let draft = size_draft(&alert(), &settings(), Decimal::ZERO, &config).unwrap();
        assert_eq!(draft.size_shares, dec!(20));
        assert_eq!(draft.notional_usd, dec!(9.2));
    }

    #[test]
    fn cents_round_trip() {
        assert_eq!(to_cents(dec!(25.005)), 2501);
        assert_eq!(from_cents(2501), dec!(25.01));
    }
}
