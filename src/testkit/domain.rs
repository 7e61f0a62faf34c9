//! Builders for domain primitives used across tests.
//!
//! Defaults describe an active binary market with $6,000 of liquidity and
//! volume so fixtures pass the activity gates unless a test says otherwise.

use chrono::{DateTime, Duration, Utc};
use rust_decimal_macros::dec;

use crate::application::theme::extract::extract_theme;
use crate::domain::alert::{Alert, AlertType, Strength};
use crate::domain::classification::Confidence;
use crate::domain::id::{AlertId, ContractId, RecommendationId, TenantId, UserId};
use crate::domain::recommendation::{
    DraftOrder, Recommendation, RecommendationKind, RecommendationStatus,
};
use crate::domain::snapshot::{OutcomeLabels, Snapshot};
use crate::domain::user::UserProfile;

/// Snapshot of `contract` at `bucket` with YES at `price`.
pub fn snapshot_at(contract: &str, bucket: DateTime<Utc>, price: f64) -> Snapshot {
    Snapshot {
        contract_id: ContractId::new(contract),
        title: format!("Market {contract}"),
        category: None,
        slug: None,
        p_yes: price,
        p_no: Some(1.0 - price),
        liquidity: 6000.0,
        volume_24h: 6000.0,
        volume_1w: 0.0,
        best_ask: None,
        last_trade_price: None,
        source_ts: None,
        bucket_ts: bucket,
        observed_at: bucket,
        outcome: OutcomeLabels::yes_no(),
    }
}

/// Standard MEDIUM alert on `contract` moving `old -> new` at `bucket`.
pub fn alert_at(contract: &str, bucket: DateTime<Utc>, old: f64, new: f64) -> Alert {
    Alert {
        id: AlertId::generate(),
        tenant_id: TenantId::default(),
        alert_type: AlertType::StandardDislocation,
        contract_id: ContractId::new(contract),
        title: format!("Market {contract}"),
        category: None,
        slug: None,
        old_price: old,
        new_price: new,
        delta_pct: (new - old).abs() / old.max(0.05),
        liquidity: 6000.0,
        volume_24h: 6000.0,
        best_ask: None,
        strength: Strength::Medium,
        outcome: OutcomeLabels::yes_no(),
        bucket_ts: bucket,
        triggered_at: bucket,
        created_at: bucket,
    }
}

/// Proposed BUY/HIGH recommendation for `alert` with a $25 draft at 0.46,
/// expiring an hour after the alert's bucket.
pub fn recommendation_for(user: &UserId, alert: &Alert) -> Recommendation {
    let theme = extract_theme(&alert.title, alert.category.as_deref(), alert.slug.as_deref());
    Recommendation {
        id: RecommendationId::generate(),
        user_id: user.clone(),
        alert_id: alert.id.clone(),
        theme_key: theme.key,
        recommendation: RecommendationKind::Buy,
        confidence: Confidence::High,
        rationale: "Sustained move on deep book.".into(),
        risks: Vec::new(),
        draft: Some(DraftOrder {
            side: "BUY YES".into(),
            price: dec!(0.46),
            size_shares: dec!(54.34),
            notional_usd: dec!(25),
        }),
        status: RecommendationStatus::Proposed,
        created_at: alert.bucket_ts,
        expires_at: alert.bucket_ts + Duration::minutes(60),
    }
}

/// Subscriber on `plan` with no preference or overrides.
pub fn user(id: &str, chat_id: i64, plan: &str) -> UserProfile {
    UserProfile {
        id: UserId::new(id),
        chat_id,
        plan: plan.into(),
        preference: None,
        overrides: None,
    }
}
