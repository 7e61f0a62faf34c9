//! Title normalisation helpers shared by the theme matchers.

/// Words dropped before fingerprinting and team detection.
pub const STOPWORDS: &[&str] = &[
    "will", "the", "a", "an", "be", "of", "price", "prices", "on", "by", "in", "at", "for", "to",
    "is", "are", "between", "and", "above", "below", "over", "under", "vs", "versus",
];

/// League prefixes that never belong to a team name.
pub const LEAGUE_TOKENS: &[&str] = &["nba", "nfl", "nhl", "mlb", "mls", "ncaa", "ufc"];

/// `(alias, canonical key, display name)` for recognised assets.
const ASSETS: &[(&str, &str, &str)] = &[
    ("btc", "bitcoin", "BTC"),
    ("bitcoin", "bitcoin", "BTC"),
    ("eth", "ethereum", "ETH"),
    ("ethereum", "ethereum", "ETH"),
    ("sol", "solana", "SOL"),
    ("solana", "solana", "SOL"),
    ("doge", "dogecoin", "DOGE"),
    ("dogecoin", "dogecoin", "DOGE"),
    ("xrp", "xrp", "XRP"),
    ("ripple", "xrp", "XRP"),
    ("ada", "cardano", "ADA"),
    ("cardano", "cardano", "ADA"),
    ("ltc", "litecoin", "LTC"),
    ("litecoin", "litecoin", "LTC"),
];

/// Lowercase and fold typographic punctuation to ASCII. Keeps `$ , . : /`
/// so amounts and times survive for the regex matchers.
#[must_use]
pub fn fold(title: &str) -> String {
    title
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201B}' | '\u{2032}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201F}' | '\u{2033}' => '"',
            '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2015}'
            | '\u{2212}' => '-',
            '\u{00A0}' => ' ',
            other => other,
        })
        .flat_map(char::to_lowercase)
        .collect()
}

/// Fold, replace everything outside `[a-z0-9]` with spaces and collapse
/// whitespace.
#[must_use]
pub fn normalize(title: &str) -> String {
    let replaced: String = fold(title)
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                ' '
            }
        })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[must_use]
pub fn tokens(title: &str) -> Vec<String> {
    normalize(title)
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[must_use]
pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

#[must_use]
pub fn is_league(token: &str) -> bool {
    LEAGUE_TOKENS.contains(&token)
}

#[must_use]
pub fn has_digit(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit())
}

/// Canonical key and display name of a recognised asset token.
#[must_use]
pub fn asset(token: &str) -> Option<(&'static str, &'static str)> {
    ASSETS
        .iter()
        .find(|(alias, _, _)| *alias == token)
        .map(|(_, key, display)| (*key, *display))
}

/// Upper-case the first letter of each word.
#[must_use]
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse an amount like `100,000` with an optional `k`/`m` suffix.
#[must_use]
pub fn parse_amount(number: &str, suffix: Option<&str>) -> Option<f64> {
    let value: f64 = number.replace(',', "").parse().ok()?;
    let multiplier = match suffix {
        Some("k") => 1_000.0,
        Some("m") => 1_000_000.0,
        _ => 1.0,
    };
    Some(value * multiplier)
}

/// Compact amount: `100000 -> 100k`, `97500 -> 97.5k`, `1500000 -> 1.5m`.
#[must_use]
pub fn format_k(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1_000_000.0 {
        format!("{}m", trim_decimal(value / 1_000_000.0, 1))
    } else if abs >= 1_000.0 {
        format!("{}k", trim_decimal(value / 1_000.0, 1))
    } else {
        trim_decimal(value, 2)
    }
}

fn trim_decimal(value: f64, places: usize) -> String {
    let text = format!("{value:.places$}");
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

/// Truncate to at most `max` characters, appending `...` when cut.
#[must_use]
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_unicode_punctuation() {
        assert_eq!(
            normalize("Will BTC\u{2019}s price be \u{201C}above\u{201D} $100,000\u{2014}Jan 5?"),
            "will btc s price be above 100 000 jan 5"
        );
    }

    #[test]
    fn fold_keeps_amount_punctuation() {
        assert_eq!(fold("Above $97,500.50"), "above $97,500.50");
    }

    #[test]
    fn format_k_trims_trailing_zeroes() {
        assert_eq!(format_k(100_000.0), "100k");
        assert_eq!(format_k(97_500.0), "97.5k");
        assert_eq!(format_k(1_500_000.0), "1.5m");
        assert_eq!(format_k(250.0), "250");
        assert_eq!(format_k(3.25), "3.25");
    }

    #[test]
    fn parse_amount_handles_suffixes_and_commas() {
        assert_eq!(parse_amount("100,000", None), Some(100_000.0));
        assert_eq!(parse_amount("95", Some("k")), Some(95_000.0));
        assert_eq!(parse_amount("1.2", Some("m")), Some(1_200_000.0));
        assert_eq!(parse_amount("x", None), None);
    }

    #[test]
    fn assets_resolve_aliases() {
        assert_eq!(asset("btc"), Some(("bitcoin", "BTC")));
        assert_eq!(asset("ripple"), Some(("xrp", "XRP")));
        assert_eq!(asset("tesla"), None);
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("short", 40), "short");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
    }

    #[test]
    fn title_case_capitalises_words() {
        assert_eq!(title_case("los angeles lakers"), "Los Angeles Lakers");
    }
}
