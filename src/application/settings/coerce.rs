//! Type coercion for free-form per-user override documents.
//!
//! Every field is coerced independently. A value that cannot be coerced, or
//! that is out of range, is dropped; the rest of the document still applies.

use std::collections::BTreeSet;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::alert::Strength;
use crate::domain::settings::SettingsLayer;

const TRUE_TOKENS: &[&str] = &["true", "1", "yes", "y", "on"];
const FALSE_TOKENS: &[&str] = &["false", "0", "no", "n", "off"];

/// Non-negative integer from a JSON integer or an integer string.
#[must_use]
pub fn coerce_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

/// Finite float from a JSON number or a numeric string.
#[must_use]
pub fn coerce_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

#[must_use]
pub fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => {
            let token = s.trim().to_ascii_lowercase();
            if TRUE_TOKENS.contains(&token.as_str()) {
                Some(true)
            } else if FALSE_TOKENS.contains(&token.as_str()) {
                Some(false)
            } else {
                None
            }
        }
        _ => None,
    }
}

fn coerce_decimal(value: &Value) -> Option<Decimal> {
    let parsed = match value {
        Value::Number(n) => n.as_f64().and_then(|f| Decimal::try_from(f).ok()),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }?;
    (parsed >= Decimal::ZERO).then_some(parsed)
}

fn non_negative(value: &Value) -> Option<f64> {
    coerce_f64(value).filter(|v| *v >= 0.0)
}

fn probability(value: &Value) -> Option<f64> {
    coerce_f64(value).filter(|v| (0.0..=1.0).contains(v))
}

/// Strength set from a comma list or a JSON list. Unknown tokens are
/// dropped; an all-invalid list yields `None`.
#[must_use]
pub fn parse_strengths(value: &Value) -> Option<BTreeSet<Strength>> {
    let tokens: Vec<String> = match value {
        Value::String(s) => s.split(',').map(str::to_string).collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                _ => None,
            })
            .collect(),
        _ => return None,
    };
    let parsed: BTreeSet<Strength> = tokens
        .iter()
        .filter_map(|t| Strength::parse_token(t))
        .collect();
    (!parsed.is_empty()).then_some(parsed)
}

/// `"0.1,0.9"` or `[0.1, 0.9]`; both ends must be probabilities with
/// `min < max`.
#[must_use]
pub fn parse_band(value: &Value) -> Option<(f64, f64)> {
    let parts: Vec<Value> = match value {
        Value::String(s) => s
            .split(',')
            .map(|part| Value::String(part.trim().to_string()))
            .collect(),
        Value::Array(items) => items.clone(),
        _ => return None,
    };
    let [low, high] = parts.as_slice() else {
        return None;
    };
    let (low, high) = (probability(low)?, probability(high)?);
    (low < high).then_some((low, high))
}

/// Read a stored override document. Accepts an object, or a string holding
/// a JSON object; anything else is treated as empty.
#[must_use]
pub fn override_object(raw: &Value) -> Option<Map<String, Value>> {
    match raw {
        Value::Object(map) => Some(map.clone()),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        },
        _ => None,
    }
}

macro_rules! coerce_fields {
    ($doc:expr, $layer:expr, $coerce:expr; $($field:ident),+ $(,)?) => {
        $(
            if let Some(raw) = $doc.get(stringify!($field)) {
                match $coerce(raw) {
                    Some(value) => $layer.$field = Some(value),
                    None => debug!(field = stringify!($field), "override value dropped"),
                }
            }
        )+
    };
}

/// Coerce an override document into a settings layer.
#[must_use]
pub fn layer_from_overrides(raw: &Value) -> SettingsLayer {
    let mut layer = SettingsLayer::default();
    let Some(doc) = override_object(raw) else {
        return layer;
    };
    let doc: Map<String, Value> = doc.into_iter().filter(|(_, v)| !v.is_null()).collect();

    coerce_fields!(doc, layer, coerce_u32;
        max_copilot_per_day,
        max_copilot_per_hour,
        max_copilot_per_digest,
        copilot_theme_ttl_minutes,
        digest_window_minutes,
        max_themes_per_digest,
        max_markets_per_theme,
        max_alerts_per_digest,
        fast_window_minutes,
        fast_max_themes_per_digest,
        fast_max_markets_per_theme,
    );
    coerce_fields!(doc, layer, non_negative;
        min_liquidity,
        min_volume_24h,
        min_abs_move,
    );
    coerce_fields!(doc, layer, probability;
        p_min,
        p_max,
        fast_p_min,
        fast_p_max,
        max_liquidity_fraction,
    );
    coerce_fields!(doc, layer, coerce_decimal;
        risk_budget_usd_per_day,
        max_usd_per_trade,
    );
    coerce_fields!(doc, layer, coerce_bool;
        copilot_enabled,
        fast_signals_enabled,
    );
    coerce_fields!(doc, layer, parse_strengths; allowed_strengths);

    if let Some(raw) = doc.get("probability_band") {
        match parse_band(raw) {
            Some((low, high)) => {
                layer.p_min = Some(low);
                layer.p_max = Some(high);
            }
            None => debug!(field = "probability_band", "override value dropped"),
        }
    }

    layer
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    #[test]
    fn integers_accept_numbers_and_strings() {
        assert_eq!(coerce_u32(&json!(4)), Some(4));
        assert_eq!(coerce_u32(&json!(" 7 ")), Some(7));
        assert_eq!(coerce_u32(&json!(-1)), None);
        assert_eq!(coerce_u32(&json!(2.5)), None);
        assert_eq!(coerce_u32(&json!("many")), None);
    }

    #[test]
    fn booleans_accept_token_sets() {
        for value in [json!(true), json!(1), json!("yes"), json!("Y"), json!("on")] {
            assert_eq!(coerce_bool(&value), Some(true), "{value}");
        }
        for value in [json!(false), json!(0), json!("no"), json!("off"), json!("N")] {
            assert_eq!(coerce_bool(&value), Some(false), "{value}");
        }
        assert_eq!(coerce_bool(&json!("maybe")), None);
        assert_eq!(coerce_bool(&json!(2)), None);
    }

    #[test]
    fn strengths_drop_unknown_tokens() {
        let parsed = parse_strengths(&json!("strong, bogus")).unwrap();
        assert_eq!(parsed.into_iter().collect::<Vec<_>>(), vec![Strength::Strong]);
        let parsed = parse_strengths(&json!(["medium", "LOW"])).unwrap();
        assert_eq!(parsed.len(), 2);
        assert!(parse_strengths(&json!("nope,never")).is_none());
    }

    #[test]
    fn bands_must_be_ordered_probabilities() {
        assert_eq!(parse_band(&json!("0.1,0.9")), Some((0.1, 0.9)));
        assert_eq!(parse_band(&json!([0.2, 0.8])), Some((0.2, 0.8)));
        assert_eq!(parse_band(&json!("0.9,0.1")), None);
        assert_eq!(parse_band(&json!([0.1, 1.5])), None);
        assert_eq!(parse_band(&json!([0.1])), None);
    }

    #[test]
    fn invalid_entries_are_dropped_individually() {
        let layer = layer_from_overrides(&json!({
            "p_min": "0.1",
            "p_max": 7,
            "max_alerts_per_digest": "3",
            "min_liquidity": -5,
            "fast_signals_enabled": "yes",
            "max_usd_per_trade": "12.50",
            "unknown_key": 1,
            "max_themes_per_digest": null
        }));
        assert_eq!(layer.p_min, Some(0.1));
        assert_eq!(layer.p_max, None);
        assert_eq!(layer.max_alerts_per_digest, Some(3));
        assert_eq!(layer.min_liquidity, None);
        assert_eq!(layer.fast_signals_enabled, Some(true));
        assert_eq!(layer.max_usd_per_trade, Some(dec!(12.50)));
        assert_eq!(layer.max_themes_per_digest, None);
    }

    #[test]
    fn string_documents_and_bands_are_read() {
        let layer = layer_from_overrides(&json!("{\"probability_band\": \"0.2,0.7\"}"));
        assert_eq!(layer.p_min, Some(0.2));
        assert_eq!(layer.p_max, Some(0.7));
        assert!(layer_from_overrides(&json!("not json")).is_empty());
        assert!(layer_from_overrides(&json!([1, 2])).is_empty());
    }
}
