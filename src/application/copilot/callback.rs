//! Inline button callbacks: confirm, skip and mute.
//!
//! Every press is first claimed by its callback id, so a replayed payload
//! is answered with "Already processed." and has no further effect.
//! Status changes go through the store's compare-and-set, so two different
//! presses on the same recommendation settle it once.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::application::keyspace;
use crate::application::theme::extract::extract_theme;
use crate::domain::id::{AlertId, RecommendationId, UserId};
use crate::domain::mute::{Mute, MuteScope};
use crate::domain::recommendation::{AuditEvent, AuditKind, Recommendation, RecommendationStatus};
use crate::error::Result;
use crate::port::outbound::kv::KeyValueStore;
use crate::port::outbound::store::{AlertStore, MuteStore, RecommendationStore};

use super::config::CopilotConfig;
use super::ledger::Ledger;

/// What a mute button points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuteTarget {
    /// A contract id.
    Market,
    /// A theme key.
    Theme,
    /// An alert id whose contract is muted.
    MarketAlert,
    /// An alert id whose theme is muted.
    ThemeAlert,
}

impl MuteTarget {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "market" => Some(Self::Market),
            "theme" => Some(Self::Theme),
            "market_alert" => Some(Self::MarketAlert),
            "theme_alert" => Some(Self::ThemeAlert),
            _ => None,
        }
    }

    const fn scope(self) -> MuteScope {
        match self {
            Self::Market | Self::MarketAlert => MuteScope::Market,
            Self::Theme | Self::ThemeAlert => MuteScope::Theme,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    Confirm(RecommendationId),
    Skip(RecommendationId),
    Mute {
        target: MuteTarget,
        key: String,
        minutes: u32,
    },
}

/// Parse `confirm:<id>`, `skip:<id>` or `mute:<target>:<key>[:<minutes>]`.
#[must_use]
pub fn parse_callback(data: &str, default_mute_minutes: u32) -> Option<CallbackAction> {
    let (verb, rest) = data.trim().split_once(':')?;
    if rest.is_empty() {
        return None;
    }
    match verb {
        "confirm" => Some(CallbackAction::Confirm(RecommendationId::new(rest))),
        "skip" => Some(CallbackAction::Skip(RecommendationId::new(rest))),
        "mute" => {
            let (target, tail) = rest.split_once(':')?;
            let target = MuteTarget::parse(target)?;
            let (key, minutes) = match tail.rsplit_once(':') {
                Some((key, minutes)) => match minutes.parse::<u32>() {
                    Ok(minutes) => (key, minutes),
                    Err(_) => (tail, default_mute_minutes),
                },
                None => (tail, default_mute_minutes),
            };
            if key.is_empty() {
                return None;
            }
            Some(CallbackAction::Mute {
                target,
                key: key.to_string(),
                minutes: minutes.max(1),
            })
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackStatus {
    /// The action took effect.
    Handled,
    /// The action had already been applied; nothing changed.
    AlreadyHandled,
    /// The action was refused (unknown payload, wrong user, expired).
    Rejected,
}

/// Status plus the short text shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackReply {
    pub status: CallbackStatus,
    pub text: String,
}

impl CallbackReply {
    fn new(status: CallbackStatus, text: impl Into<String>) -> Self {
        Self {
            status,
            text: text.into(),
        }
    }
}

fn settled_text(status: RecommendationStatus) -> &'static str {
    match status {
        RecommendationStatus::Confirmed => "Already confirmed.",
        RecommendationStatus::Skipped => "Already skipped.",
        RecommendationStatus::Expired => "This recommendation expired.",
        RecommendationStatus::Proposed => "Already processed.",
    }
}

fn span_text(minutes: u32) -> String {
    if minutes >= 60 && minutes % 60 == 0 {
        format!("{}h", minutes / 60)
    } else {
        format!("{minutes}m")
    }
}

/// Ports a callback handler needs.
#[derive(Clone)]
pub struct CallbackPorts {
    pub alerts: Arc<dyn AlertStore>,
    pub recommendations: Arc<dyn RecommendationStore>,
    pub mutes: Arc<dyn MuteStore>,
    pub kv: Arc<dyn KeyValueStore>,
}

pub struct CallbackHandler {
    alerts: Arc<dyn AlertStore>,
    recommendations: Arc<dyn RecommendationStore>,
    mutes: Arc<dyn MuteStore>,
    kv: Arc<dyn KeyValueStore>,
    ledger: Ledger,
    config: CopilotConfig,
}

impl CallbackHandler {
    pub fn new(ports: CallbackPorts, config: CopilotConfig) -> Self {
        Self {
            alerts: ports.alerts,
            recommendations: ports.recommendations,
            mutes: ports.mutes,
            ledger: Ledger::new(ports.kv.clone()),
            kv: ports.kv,
            config,
        }
    }

    /// Handle one button press from `user`.
    ///
    /// Store errors release the callback marker and propagate, so the
    /// user can press again.
    pub async fn handle_callback(
        &self,
        user: &UserId,
        callback_id: &str,
        data: &str,
        now: DateTime<Utc>,
    ) -> Result<CallbackReply> {
        let Some(action) = parse_callback(data, self.config.mute_minutes) else {
            return Ok(CallbackReply::new(CallbackStatus::Rejected, "Unknown action."));
        };

        let marker = keyspace::callback_marker(callback_id);
        let fresh = self
            .kv
            .set_nx(&marker, data, self.config.callback_marker_ttl())
            .await?;
        if !fresh {
            return Ok(CallbackReply::new(
                CallbackStatus::AlreadyHandled,
                "Already processed.",
            ));
        }

        let result = match action {
            CallbackAction::Confirm(id) => {
                self.settle(user, &id, RecommendationStatus::Confirmed, now)
                    .await
            }
            CallbackAction::Skip(id) => {
                self.settle(user, &id, RecommendationStatus::Skipped, now)
                    .await
            }
            CallbackAction::Mute {
                target,
                key,
                minutes,
            } => self.mute(user, target, &key, minutes, now).await,
        };
        if result.is_err() {
            if let Err(error) = self.kv.delete(&marker).await {
                warn!(callback_id, error = %error, "callback marker release failed");
            }
        }
        result
    }

    async fn expire(&self, recommendation: &Recommendation, now: DateTime<Utc>) -> Result<()> {
        let moved = self
            .recommendations
            .transition(
                &recommendation.id,
                RecommendationStatus::Proposed,
                RecommendationStatus::Expired,
            )
            .await?;
        if moved {
            self.recommendations
                .record_event(&AuditEvent {
                    recommendation_id: recommendation.id.clone(),
                    user_id: recommendation.user_id.clone(),
                    kind: AuditKind::Expired,
                    at: now,
                    detail: Some("ttl".into()),
                })
                .await?;
        }
        Ok(())
    }

    async fn settle(
        &self,
        user: &UserId,
        id: &RecommendationId,
        to: RecommendationStatus,
        now: DateTime<Utc>,
    ) -> Result<CallbackReply> {
        let Some(recommendation) = self.recommendations.get_recommendation(id).await? else {
            return Ok(CallbackReply::new(
                CallbackStatus::Rejected,
                "Recommendation not found.",
            ));
        };
        if &recommendation.user_id != user {
            return Ok(CallbackReply::new(
                CallbackStatus::Rejected,
                "Recommendation not found.",
            ));
        }
        if recommendation.status.is_settled() {
            return Ok(CallbackReply::new(
                CallbackStatus::AlreadyHandled,
                settled_text(recommendation.status),
            ));
        }
        if recommendation.is_expired_at(now) {
            self.expire(&recommendation, now).await?;
            return Ok(CallbackReply::new(
                CallbackStatus::Rejected,
                "This recommendation expired.",
            ));
        }
        if to == RecommendationStatus::Confirmed && recommendation.draft.is_none() {
            return Ok(CallbackReply::new(
                CallbackStatus::Rejected,
                "No draft for WAIT/SKIP.",
            ));
        }

        // Debit first; reversed below if the transition does not land.
        let debit = match (to, &recommendation.draft) {
            (RecommendationStatus::Confirmed, Some(draft)) => {
                let total = self.ledger.debit(user, draft.notional_usd, now).await?;
                Some((draft.notional_usd, total))
            }
            _ => None,
        };

        let moved = match self
            .recommendations
            .transition(id, RecommendationStatus::Proposed, to)
            .await
        {
            Ok(moved) => moved,
            Err(error) => {
                self.reverse(user, id, debit, now).await;
                return Err(error);
            }
        };
        if !moved {
            self.reverse(user, id, debit, now).await;
            let current = self
                .recommendations
                .get_recommendation(id)
                .await?
                .map_or(RecommendationStatus::Proposed, |r| r.status);
            return Ok(CallbackReply::new(
                CallbackStatus::AlreadyHandled,
                settled_text(current),
            ));
        }

        let kind = if to == RecommendationStatus::Confirmed {
            AuditKind::Confirmed
        } else {
            AuditKind::Skipped
        };
        let event = AuditEvent {
            recommendation_id: id.clone(),
            user_id: user.clone(),
            kind,
            at: now,
            detail: None,
        };
        if let Err(error) = self.recommendations.record_event(&event).await {
            warn!(recommendation_id = %id, error = %error, "audit write failed");
        }

        if let Some((notional, total)) = debit {
            info!(
                user_id = %user,
                recommendation_id = %id,
                notional_usd = %notional,
                spent_today = %total,
                "recommendation confirmed"
            );
            return Ok(CallbackReply::new(CallbackStatus::Handled, "Confirmed."));
        }
        info!(user_id = %user, recommendation_id = %id, "recommendation skipped");
        Ok(CallbackReply::new(CallbackStatus::Handled, "Skipped."))
    }

    async fn reverse(
        &self,
        user: &UserId,
        id: &RecommendationId,
        debit: Option<(Decimal, Decimal)>,
        now: DateTime<Utc>,
    ) {
        let Some((notional, _)) = debit else {
            return;
        };
        if let Err(error) = self.ledger.credit(user, notional, now).await {
            warn!(
                user_id = %user,
                recommendation_id = %id,
                error = %error,
                "debit reversal failed, budget over-counted"
            );
        }
    }

    /// Resolve a mute target to the key stored on the mute.
    async fn mute_key(&self, target: MuteTarget, key: &str) -> Result<Option<String>> {
        match target {
            MuteTarget::Market | MuteTarget::Theme => Ok(Some(key.to_string())),
            MuteTarget::MarketAlert | MuteTarget::ThemeAlert => {
                let Some(alert) = self.alerts.get_alert(&AlertId::new(key)).await? else {
                    return Ok(None);
                };
                Ok(Some(if target == MuteTarget::MarketAlert {
                    alert.contract_id.to_string()
                } else {
                    let category = alert.category.as_deref();
                    extract_theme(&alert.title, category, alert.slug.as_deref()).key
                }))
            }
        }
    }

    async fn mute(
        &self,
        user: &UserId,
        target: MuteTarget,
        key: &str,
        minutes: u32,
        now: DateTime<Utc>,
    ) -> Result<CallbackReply> {
        let Some(target_key) = self.mute_key(target, key).await? else {
            return Ok(CallbackReply::new(CallbackStatus::Rejected, "Alert not found."));
        };
        let scope = target.scope();
        let expires_at = now + chrono::Duration::minutes(i64::from(minutes.max(1)));

        if let Some(active) = self.mutes.active_mute(user, scope, &target_key, now).await? {
            if active.expires_at >= expires_at {
                return Ok(CallbackReply::new(
                    CallbackStatus::AlreadyHandled,
                    "Already muted.",
                ));
            }
        }
        self.mutes
            .upsert_mute(&Mute {
                user_id: user.clone(),
                scope,
                target_key: target_key.clone(),
                expires_at,
            })
            .await?;
        info!(
            user_id = %user,
            scope = %scope,
            target_key = %target_key,
            minutes,
            "mute set"
        );
        Ok(CallbackReply::new(
            CallbackStatus::Handled,
            format!("Muted this {scope} for {}.", span_text(minutes)),
        ))
    }
}
