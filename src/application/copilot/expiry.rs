use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::domain::recommendation::{AuditEvent, AuditKind, RecommendationStatus};
use crate::error::Result;
use crate::port::outbound::store::RecommendationStore;

/// Move every proposed recommendation past its expiry to `Expired`,
/// auditing each one. Returns how many were expired by this call.
pub async fn expire_due(store: &Arc<dyn RecommendationStore>, now: DateTime<Utc>) -> Result<usize> {
    let due = store.due_for_expiry(now).await?;
    let mut expired = 0;
    for recommendation in due {
        let moved = store
            .transition(
                &recommendation.id,
                RecommendationStatus::Proposed,
                RecommendationStatus::Expired,
            )
            .await?;
        if !moved {
            continue;
        }
        let event = AuditEvent {
            recommendation_id: recommendation.id.clone(),
            user_id: recommendation.user_id.clone(),
            kind: AuditKind::Expired,
            at: now,
            detail: Some("ttl".into()),
        };
        if let Err(error) = store.record_event(&event).await {
            warn!(recommendation_id = %recommendation.id, error = %error, "audit write failed");
        }
        expired += 1;
    }
    if expired > 0 {
        debug!(expired, "recommendations expired");
    }
    Ok(expired)
}
