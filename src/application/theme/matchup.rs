//! Two-party matchup matcher (`A vs B`).

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::theme::{ThemeInfo, ThemeKind};

use super::matcher::{TitleContext, ThemeMatcher, MATCHUP_SEPARATORS};
use super::text;

const MAX_TEAM_WORDS: usize = 3;

/// Betting vocabulary that terminates a team name.
const LINE_WORDS: &[&str] = &[
    "u", "o", "ou", "total", "spread", "line", "over", "under", "moneyline", "points", "goals",
];

fn total_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:total|o/u|over/under|over\s+under|ou)\s*(?:of\s*)?(\d+(?:\.\d+)?)")
            .expect("total pattern is valid")
    })
}

fn short_total_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[ou](\d+(?:\.\d+)?)\b").expect("short total pattern is valid"))
}

fn spread_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\bspread\s*(?:of\s*)?([+-]?\d+(?:\.\d+)?)").expect("spread pattern is valid")
    })
}

fn is_team_word(token: &str) -> bool {
    !text::has_digit(token)
        && !text::is_league(token)
        && !text::is_stopword(token)
        && !LINE_WORDS.contains(&token)
}

/// `Total N` or `Spread N`, when the title names a line.
fn line_detail(folded: &str) -> Option<String> {
    if let Some(caps) = total_regex().captures(folded) {
        return Some(format!("Total {}", caps.get(1)?.as_str()));
    }
    if let Some(caps) = spread_regex().captures(folded) {
        return Some(format!("Spread {}", caps.get(1)?.as_str()));
    }
    short_total_regex()
        .captures(folded)
        .and_then(|caps| caps.get(1))
        .map(|m| format!("Total {}", m.as_str()))
}

pub struct Matchup;

impl ThemeMatcher for Matchup {
    fn name(&self) -> &'static str {
        "matchup"
    }

    fn try_match(&self, ctx: &TitleContext<'_>) -> Option<ThemeInfo> {
        let split = ctx
            .tokens
            .iter()
            .position(|t| MATCHUP_SEPARATORS.contains(&t.as_str()))?;
        let (left, right) = (&ctx.tokens[..split], &ctx.tokens[split + 1..]);

        let mut home: Vec<&str> = left
            .iter()
            .rev()
            .map(String::as_str)
            .take_while(|t| is_team_word(t))
            .take(MAX_TEAM_WORDS)
            .collect();
        home.reverse();
        let away: Vec<&str> = right
            .iter()
            .map(String::as_str)
            .take_while(|t| is_team_word(t))
            .take(MAX_TEAM_WORDS)
            .collect();
        if home.is_empty() || away.is_empty() {
            return None;
        }

        let home_key = home.join("-");
        let away_key = away.join("-");
        if home_key == away_key {
            return None;
        }
        let (first, second) = if home_key <= away_key {
            (&home_key, &away_key)
        } else {
            (&away_key, &home_key)
        };
        let date = ctx.date_with_fallback();
        let detail = line_detail(&ctx.folded);

        let mut label = format!(
            "{} vs {}",
            text::title_case(&home.join(" ")),
            text::title_case(&away.join(" "))
        );
        if let Some(detail) = &detail {
            label.push_str(" - ");
            label.push_str(detail);
        }

        Some(ThemeInfo {
            key: format!("{first}_{second}|{}|matchup", date.key),
            label,
            short_title: detail.unwrap_or_else(|| "Winner".to_string()),
            kind: ThemeKind::Matchup,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(title: &'a str, slug: Option<&'a str>) -> TitleContext<'a> {
        TitleContext::new(title, Some("Sports"), slug)
    }

    #[test]
    fn teams_are_sorted_in_the_key() {
        let a = Matchup.try_match(&ctx("Lakers vs Celtics", None)).unwrap();
        let b = Matchup.try_match(&ctx("Celtics vs. Lakers", None)).unwrap();
        assert_eq!(a.key, "celtics_lakers|unknown-date|matchup");
        assert_eq!(a.key, b.key);
        assert_eq!(a.label, "Lakers vs Celtics");
        assert_eq!(a.kind, ThemeKind::Matchup);
    }

    #[test]
    fn league_prefix_and_multiword_names() {
        let info = Matchup
            .try_match(&ctx("NBA: Los Angeles Lakers vs Boston Celtics", None))
            .unwrap();
        assert_eq!(
            info.key,
            "boston-celtics_los-angeles-lakers|unknown-date|matchup"
        );
        assert_eq!(info.label, "Los Angeles Lakers vs Boston Celtics");
    }

    #[test]
    fn totals_and_spreads_are_label_details() {
        let total = Matchup
            .try_match(&ctx("Lakers vs Celtics O/U 220.5", None))
            .unwrap();
        assert_eq!(total.label, "Lakers vs Celtics - Total 220.5");
        assert_eq!(total.short_title, "Total 220.5");
        assert_eq!(total.key, "celtics_lakers|unknown-date|matchup");

        let spread = Matchup
            .try_match(&ctx("Chiefs vs Bills spread -3.5", None))
            .unwrap();
        assert_eq!(spread.short_title, "Spread -3.5");
    }

    #[test]
    fn slug_date_is_used_when_title_has_none() {
        let info = Matchup
            .try_match(&ctx("Arsenal v Chelsea", Some("epl-ars-che-2026-03-14")))
            .unwrap();
        assert_eq!(info.key, "arsenal_chelsea|2026-03-14|matchup");
    }

    #[test]
    fn missing_side_is_not_a_matchup() {
        assert!(Matchup.try_match(&ctx("vs everyone", None)).is_none());
        assert!(Matchup.try_match(&ctx("No separator here", None)).is_none());
    }
}
