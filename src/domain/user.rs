//! Subscriber profile as seen by the pipeline.

use serde::{Deserialize, Serialize};

use super::id::UserId;
use super::settings::UserPreference;

/// Everything the pipeline needs to know about one subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    /// Messenger destination (Telegram chat id).
    pub chat_id: i64,
    #[serde(default = "default_plan")]
    pub plan: String,
    #[serde(default)]
    pub preference: Option<UserPreference>,
    /// Free-form override document; coerced field by field.
    #[serde(default)]
    pub overrides: Option<serde_json::Value>,
}

fn default_plan() -> String {
    "basic".to_string()
}
