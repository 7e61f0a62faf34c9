//! HTML fragments shared by digests and copilot messages.
//!
//! Output targets Telegram's `HTML` parse mode, which only needs `<`, `>`
//! and `&` escaped.

use url::Url;

use crate::application::classify::config::ClassifierConfig;
use crate::domain::alert::Alert;
use crate::domain::id::ContractId;
use crate::domain::snapshot::LabelMapping;

pub const FOOTER: &str = "<i>Read-only analytics - Not financial advice</i>";

/// Liquidity and volume tiers used for `High` / `Moderate` / `Light`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Descriptors {
    pub strong_liquidity: f64,
    pub moderate_liquidity: f64,
    pub strong_volume_24h: f64,
    pub moderate_volume_24h: f64,
}

impl Default for Descriptors {
    fn default() -> Self {
        Self {
            strong_liquidity: 5000.0,
            moderate_liquidity: 1000.0,
            strong_volume_24h: 5000.0,
            moderate_volume_24h: 1000.0,
        }
    }
}

impl Descriptors {
    /// Reuse the classifier's moderate and strong tiers.
    #[must_use]
    pub fn from_classifier(config: &ClassifierConfig) -> Self {
        Self {
            strong_liquidity: config.strong_liquidity,
            moderate_liquidity: config.moderate_liquidity,
            strong_volume_24h: config.strong_volume_24h,
            moderate_volume_24h: config.moderate_volume_24h,
        }
    }

    #[must_use]
    pub fn liquidity(&self, value: f64) -> &'static str {
        tier(value, self.strong_liquidity, self.moderate_liquidity)
    }

    #[must_use]
    pub fn volume(&self, value: f64) -> &'static str {
        tier(value, self.strong_volume_24h, self.moderate_volume_24h)
    }
}

fn tier(value: f64, high: f64, moderate: f64) -> &'static str {
    if value >= high {
        "High"
    } else if value >= moderate {
        "Moderate"
    } else {
        "Light"
    }
}

/// Escape text for Telegram HTML.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

/// `+` for up (and flat) moves, `-` for down moves.
#[must_use]
pub fn sign(alert: &Alert) -> char {
    if alert.signed_move() >= 0.0 {
        '+'
    } else {
        '-'
    }
}

/// `+12.5%`, from the alert's relative move.
#[must_use]
pub fn compact_move(alert: &Alert) -> String {
    format!("{}{:.1}%", sign(alert), alert.delta_pct.abs() * 100.0)
}

/// `+0.050`.
#[must_use]
pub fn abs_move(alert: &Alert) -> String {
    format!("{}{:.3}", sign(alert), alert.abs_move())
}

fn sanitize_label(label: &str) -> Option<String> {
    let cleaned: String = label
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_matches('_').to_ascii_uppercase();
    if cleaned.is_empty() || cleaned == "OUTCOME_0" || cleaned == "OUTCOME0" {
        None
    } else {
        Some(cleaned)
    }
}

/// Name of the outcome the price refers to: `p_yes`, `p_<LABEL>` for a
/// verified mapping, otherwise `p_outcome0`.
#[must_use]
pub fn probability_label(alert: &Alert) -> String {
    if alert.outcome.is_yes_no {
        return "p_yes".to_string();
    }
    if alert.outcome.mapping != LabelMapping::Verified {
        return "p_outcome0".to_string();
    }
    alert
        .outcome
        .primary_label
        .as_deref()
        .and_then(sanitize_label)
        .map_or_else(|| "p_outcome0".to_string(), |label| format!("p_{label}"))
}

/// `p_yes 42.0->44.0`.
#[must_use]
pub fn compact_probability(alert: &Alert) -> String {
    format!(
        "{} {:.1}->{:.1}",
        probability_label(alert),
        alert.old_price * 100.0,
        alert.new_price * 100.0
    )
}

/// `$12,345`.
#[must_use]
pub fn usd(value: f64) -> String {
    let rounded = value.round().abs() as u64;
    let digits = rounded.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if value < 0.0 && rounded > 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Link to a market page under `base`, with the contract id as the last
/// path segment.
#[must_use]
pub fn market_link(base: &Url, contract: &ContractId) -> String {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(contract.as_str());
    }
    url.to_string()
}
