//! Completion prompt, response parsing and the per-alert advice cache.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::application::classify::speed::SignalSpeed;
use crate::application::keyspace;
use crate::domain::classification::Confidence;
use crate::domain::id::{AlertId, UserId};
use crate::domain::recommendation::RecommendationKind;
use crate::error::{Error, Result};
use crate::port::outbound::kv::KeyValueStore;
use crate::port::outbound::llm::Llm;

pub const SYSTEM_PROMPT: &str = "You are a conservative trade assistant. Provide read-only \
decision support only. No financial advice. If information is insufficient or ambiguous, \
return WAIT. Respond with strict JSON only.";

pub const FALLBACK_RATIONALE: &str = "LLM unavailable; defaulting to WAIT.";

const MAX_RISKS: usize = 4;
const MAX_RATIONALE_CHARS: usize = 600;

/// Structured answer from the completion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advice {
    pub recommendation: RecommendationKind,
    pub confidence: Confidence,
    pub rationale: String,
    pub risks: Vec<String>,
}

impl Advice {
    /// WAIT / LOW, used whenever the answer cannot be trusted.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            recommendation: RecommendationKind::Wait,
            confidence: Confidence::Low,
            rationale: FALLBACK_RATIONALE.to_string(),
            risks: Vec::new(),
        }
    }
}

/// Context object sent as the user message.
#[derive(Debug, Clone, Serialize)]
pub struct PromptContext<'a> {
    pub market: &'a str,
    pub category: Option<&'a str>,
    pub theme: &'a str,
    pub alert_type: &'a str,
    pub old_price: f64,
    pub new_price: f64,
    pub delta_pct: f64,
    pub liquidity: f64,
    pub volume_24h: f64,
    pub signal_type: Option<&'a str>,
    pub classification_confidence: Option<&'a str>,
    pub suggested_action: Option<&'a str>,
    pub signal_speed: SignalSpeed,
    pub evidence: &'a [String],
    pub related_markets: Vec<&'a str>,
}

/// User message: instructions followed by the JSON context.
pub fn build_prompt(context: &PromptContext<'_>) -> Result<String> {
    let body = serde_json::to_string_pretty(context)?;
    Ok(format!(
        "Evaluate this prediction-market signal and answer with JSON containing keys \
recommendation (BUY, WAIT or SKIP), confidence (HIGH, MEDIUM or LOW), rationale (one or two \
sentences) and risks (a short list).\n\nContext:\n{body}"
    ))
}

fn extract_json(text: &str) -> Option<&str> {
    if let Some(start) = text.find("```json") {
        let start = start + 7;
        let end = text[start..]
            .find("```")
            .map_or(text.len(), |i| start + i);
        Some(text[start..end].trim())
    } else {
        let start = text.find('{')?;
        let end = text.rfind('}').map_or(text.len(), |i| i + 1);
        (start < end).then(|| &text[start..end])
    }
}

fn parse_risks(value: Option<&Value>) -> Vec<String> {
    let risks: Vec<String> = match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Some(Value::String(text)) => text
            .split(['\n', ';'])
            .map(|s| s.trim().trim_start_matches('-').trim().to_string())
            .collect(),
        _ => Vec::new(),
    };
    risks
        .into_iter()
        .filter(|s| !s.is_empty())
        .take(MAX_RISKS)
        .collect()
}

/// Parse a completion. Unknown recommendation or confidence values
/// normalise to WAIT / LOW; unparseable text yields `None`.
#[must_use]
pub fn parse_advice(text: &str) -> Option<Advice> {
    let value: Value = serde_json::from_str(extract_json(text)?).ok()?;
    let object = value.as_object()?;
    let token = |key: &str| object.get(key).and_then(Value::as_str).unwrap_or_default();

    let recommendation =
        RecommendationKind::parse_token(token("recommendation")).unwrap_or(RecommendationKind::Wait);
    let confidence = Confidence::parse_token(token("confidence")).unwrap_or(Confidence::Low);
    let rationale: String = token("rationale").trim().chars().take(MAX_RATIONALE_CHARS).collect();
    Some(Advice {
        recommendation,
        confidence,
        rationale: if rationale.is_empty() {
            "No rationale provided.".to_string()
        } else {
            rationale
        },
        risks: parse_risks(object.get("risks")),
    })
}

/// Calls the completion service, caching parsed answers per user and alert.
pub struct Advisor {
    llm: Arc<dyn Llm>,
    kv: Arc<dyn KeyValueStore>,
    cache_ttl: Duration,
}

impl Advisor {
    pub fn new(llm: Arc<dyn Llm>, kv: Arc<dyn KeyValueStore>, cache_ttl: Duration) -> Self {
        Self {
            llm,
            kv,
            cache_ttl,
        }
    }

    async fn cached(&self, key: &str) -> Option<Advice> {
        match self.kv.get(key).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).ok(),
            Ok(None) => None,
            Err(error) => {
                warn!(key, error = %error, "advice cache read failed");
                None
            }
        }
    }

    /// Advice for one alert.
    ///
    /// Transport failures are returned as errors so the caller can release
    /// its claim; an answer that does not parse degrades to
    /// [`Advice::fallback`] and is not cached.
    pub async fn advise(
        &self,
        user: &UserId,
        alert: &AlertId,
        context: &PromptContext<'_>,
    ) -> Result<Advice> {
        let key = keyspace::llm_response(user, alert);
        if let Some(advice) = self.cached(&key).await {
            debug!(user_id = %user, alert_id = %alert, "advice cache hit");
            return Ok(advice);
        }

        let prompt = build_prompt(context)?;
        let raw = self
            .llm
            .complete(SYSTEM_PROMPT, &prompt)
            .await
            .map_err(|e| match e {
                Error::Guard(_) | Error::Completion(_) | Error::Http(_) => e,
                other => Error::Completion(other.to_string()),
            })?;

        let Some(advice) = parse_advice(&raw) else {
            warn!(
                user_id = %user,
                alert_id = %alert,
                provider = self.llm.name(),
                "completion did not parse, using fallback"
            );
            return Ok(Advice::fallback());
        };

        match serde_json::to_string(&advice) {
            Ok(encoded) => {
                if let Err(error) = self.kv.set(&key, &encoded, Some(self.cache_ttl)).await {
                    warn!(key, error = %error, "advice cache write failed");
                }
            }
            Err(error) => warn!(error = %error, "advice encode failed"),
        }
        Ok(advice)
    }
}
