//! Price-range and directional-strike matchers.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::theme::{ThemeInfo, ThemeKind};

use super::date;
use super::matcher::{TitleContext, ThemeMatcher};
use super::text;

/// Words that can never be an underlying.
const NOT_UNDERLYING: &[&str] = &["k", "m", "usd", "dollars", "close", "reach", "hit", "trade"];

fn range_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"between\s+\$?(\d[\d,]*(?:\.\d+)?)\s*([km])?\s+and\s+\$?(\d[\d,]*(?:\.\d+)?)\s*([km])?\b",
        )
        .expect("range pattern is valid")
    })
}

fn strike_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\b(above|over|below|under|greater than|less than)\s+\$?(\d[\d,]*(?:\.\d+)?)\s*([km])?\b",
        )
        .expect("strike pattern is valid")
    })
}

/// Asset or subject the price refers to: `(key, display)`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Underlying {
    key: String,
    display: String,
}

fn underlying(ctx: &TitleContext<'_>) -> Option<Underlying> {
    if let Some((key, display)) = ctx.known_asset() {
        return Some(Underlying {
            key: key.to_string(),
            display: display.to_string(),
        });
    }
    // Sports lines ("Lakers vs Celtics over 220.5") are matchups, not prices.
    if ctx.has_matchup_separator() {
        return None;
    }
    ctx.tokens
        .iter()
        .find(|t| {
            !text::is_stopword(t)
                && !text::has_digit(t)
                && !text::is_league(t)
                && !NOT_UNDERLYING.contains(&t.as_str())
                && !date::is_month_word(t)
        })
        .map(|t| Underlying {
            key: t.clone(),
            display: text::title_case(t),
        })
}

fn band_label(display: &str, ctx: &TitleContext<'_>) -> String {
    match &ctx.date.label {
        Some(date) => format!("{display} price band ({date})"),
        None => format!("{display} price band"),
    }
}

/// `between $X and $Y` contracts.
pub struct PriceRange;

impl ThemeMatcher for PriceRange {
    fn name(&self) -> &'static str {
        "price_range"
    }

    fn try_match(&self, ctx: &TitleContext<'_>) -> Option<ThemeInfo> {
        if !ctx.tokens.iter().any(|t| t == "between") || !ctx.tokens.iter().any(|t| t == "and") {
            return None;
        }
        let caps = range_regex().captures(&ctx.folded)?;
        let low = text::parse_amount(caps.get(1)?.as_str(), caps.get(2).map(|m| m.as_str()))?;
        let high = text::parse_amount(caps.get(3)?.as_str(), caps.get(4).map(|m| m.as_str()))?;
        let underlying = underlying(ctx)?;

        Some(ThemeInfo {
            key: format!("{}|{}|price-band", underlying.key, ctx.date.key),
            label: band_label(&underlying.display, ctx),
            short_title: format!("{}-{} range", text::format_k(low), text::format_k(high)),
            kind: ThemeKind::PriceBand,
        })
    }
}

/// `above/below $N` contracts, optionally pinned to a time of day.
pub struct DirectionalStrike;

impl ThemeMatcher for DirectionalStrike {
    fn name(&self) -> &'static str {
        "directional_strike"
    }

    fn try_match(&self, ctx: &TitleContext<'_>) -> Option<ThemeInfo> {
        let caps = strike_regex().captures(&ctx.folded)?;
        let direction = match caps.get(1)?.as_str() {
            "above" | "over" | "greater than" => "Above",
            _ => "Below",
        };
        let strike = text::parse_amount(caps.get(2)?.as_str(), caps.get(3).map(|m| m.as_str()))?;
        let underlying = underlying(ctx)?;
        let short_title = format!("{direction} {}", text::format_k(strike));

        match date::parse_time(&ctx.folded) {
            Some(time) => {
                let when = match &ctx.date.label {
                    Some(date) => format!("{date} {}", time.label),
                    None => time.label.clone(),
                };
                Some(ThemeInfo {
                    key: format!(
                        "{}|{}|{}|intraday",
                        underlying.key, ctx.date.key, time.key
                    ),
                    label: format!("{} intraday ({when})", underlying.display),
                    short_title,
                    kind: ThemeKind::IntradayDirection,
                })
            }
            None => Some(ThemeInfo {
                key: format!("{}|{}|price-band", underlying.key, ctx.date.key),
                label: band_label(&underlying.display, ctx),
                short_title,
                kind: ThemeKind::PriceBand,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(title: &str) -> TitleContext<'_> {
        TitleContext::new(title, None, None)
    }

    #[test]
    fn range_matches_between_amounts() {
        let info = PriceRange
            .try_match(&ctx("Will Bitcoin be between $95,000 and $100,000 on January 5?"))
            .unwrap();
        assert_eq!(info.key, "bitcoin|jan-5|price-band");
        assert_eq!(info.label, "BTC price band (Jan 5)");
        assert_eq!(info.short_title, "95k-100k range");
        assert_eq!(info.kind, ThemeKind::PriceBand);
    }

    #[test]
    fn strike_without_time_joins_the_price_band() {
        let info = DirectionalStrike
            .try_match(&ctx("Will the price of Bitcoin be above $100,000 on January 5?"))
            .unwrap();
        assert_eq!(info.key, "bitcoin|jan-5|price-band");
        assert_eq!(info.short_title, "Above 100k");
    }

    #[test]
    fn strike_with_time_is_intraday() {
        let info = DirectionalStrike
            .try_match(&ctx("Bitcoin above $97,500 on January 5 at 3PM ET?"))
            .unwrap();
        assert_eq!(info.key, "bitcoin|jan-5|3pm-et|intraday");
        assert_eq!(info.label, "BTC intraday (Jan 5 3PM ET)");
        assert_eq!(info.short_title, "Above 97.5k");
        assert_eq!(info.kind, ThemeKind::IntradayDirection);
    }

    #[test]
    fn unknown_subject_uses_first_content_word() {
        let info = DirectionalStrike
            .try_match(&ctx("Will Tesla close below $200 on Feb 3?"))
            .unwrap();
        assert_eq!(info.key, "tesla|feb-3|price-band");
        assert_eq!(info.label, "Tesla price band (Feb 3)");
        assert_eq!(info.short_title, "Below 200");
    }

    #[test]
    fn sports_totals_are_not_strikes() {
        assert!(DirectionalStrike
            .try_match(&ctx("Lakers vs Celtics: over 220.5 points"))
            .is_none());
    }

    #[test]
    fn range_requires_both_words() {
        assert!(PriceRange.try_match(&ctx("Bitcoin above $100k")).is_none());
    }
}
