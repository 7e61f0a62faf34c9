//! Ordered chain of title matchers.
//!
//! Each matcher inspects a prepared [`TitleContext`] and either claims the
//! title or passes. The first claim wins; the fingerprint matcher at the end
//! of the chain always claims.

use crate::domain::theme::ThemeInfo;

use super::date::{self, DateToken};
use super::fingerprint::Fingerprint;
use super::matchup::Matchup;
use super::price::{DirectionalStrike, PriceRange};
use super::text;

/// Tokens that split a two-party matchup.
pub const MATCHUP_SEPARATORS: &[&str] = &["vs", "versus", "v"];

/// A title prepared once and shared by every matcher.
#[derive(Debug, Clone)]
pub struct TitleContext<'a> {
    pub title: &'a str,
    pub category: Option<&'a str>,
    pub slug: Option<&'a str>,
    /// Lowercased with typographic punctuation folded; ASCII punctuation kept.
    pub folded: String,
    pub tokens: Vec<String>,
    pub date: DateToken,
}

impl<'a> TitleContext<'a> {
    #[must_use]
    pub fn new(title: &'a str, category: Option<&'a str>, slug: Option<&'a str>) -> Self {
        let folded = text::fold(title);
        let date = date::parse_month_day(&folded).unwrap_or_else(DateToken::unknown);
        Self {
            title,
            category,
            slug,
            tokens: text::tokens(title),
            folded,
            date,
        }
    }

    /// First recognised asset among the tokens.
    #[must_use]
    pub fn known_asset(&self) -> Option<(&'static str, &'static str)> {
        self.tokens.iter().find_map(|t| text::asset(t))
    }

    #[must_use]
    pub fn has_matchup_separator(&self) -> bool {
        self.tokens
            .iter()
            .any(|t| MATCHUP_SEPARATORS.contains(&t.as_str()))
    }

    /// Date from the title, else an ISO date from category or slug.
    #[must_use]
    pub fn date_with_fallback(&self) -> DateToken {
        if self.date.is_known() {
            return self.date.clone();
        }
        [self.category, self.slug]
            .into_iter()
            .flatten()
            .find_map(date::parse_iso_date)
            .unwrap_or_else(DateToken::unknown)
    }
}

/// One strategy in the chain.
pub trait ThemeMatcher: Send + Sync {
    fn name(&self) -> &'static str;

    fn try_match(&self, ctx: &TitleContext<'_>) -> Option<ThemeInfo>;
}

static CHAIN: [&dyn ThemeMatcher; 4] = [&PriceRange, &DirectionalStrike, &Matchup, &Fingerprint];

/// The default chain: price range, directional strike, matchup, fingerprint.
#[must_use]
pub fn default_chain() -> &'static [&'static dyn ThemeMatcher] {
    &CHAIN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_order_is_fixed() {
        let names: Vec<&str> = default_chain().iter().map(|m| m.name()).collect();
        assert_eq!(
            names,
            vec!["price_range", "directional_strike", "matchup", "fingerprint"]
        );
    }

    #[test]
    fn context_falls_back_to_slug_date() {
        let ctx = TitleContext::new("Lakers vs Celtics", Some("NBA"), Some("nba-lal-bos-2026-01-05"));
        assert!(!ctx.date.is_known());
        assert_eq!(ctx.date_with_fallback().key, "2026-01-05");
    }

    #[test]
    fn context_detects_assets_and_separators() {
        let ctx = TitleContext::new("Will ETH be above $4,000?", None, None);
        assert_eq!(ctx.known_asset(), Some(("ethereum", "ETH")));
        assert!(!ctx.has_matchup_separator());
    }
}
