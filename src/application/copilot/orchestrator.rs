//! Copilot orchestration for one user and one digest's themes.
//!
//! Per theme: gate the representative, claim the theme, ask the completion
//! service, persist and audit the recommendation, size a draft for BUY, and
//! deliver. Failures after the claim release it to the retry TTL; a
//! successful send leaves it to run out so the theme is not re-notified.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::application::classify::history::load_price_points;
use crate::application::format::Descriptors;
use crate::application::keyspace;
use crate::domain::alert::Alert;
use crate::domain::id::{AlertId, RecommendationId, UserId};
use crate::domain::mute::MuteScope;
use crate::domain::plan::Plan;
use crate::domain::recommendation::{
    AuditEvent, AuditKind, Recommendation, RecommendationKind, RecommendationStatus,
};
use crate::domain::settings::EffectiveSettings;
use crate::domain::theme::{Theme, ThemeMember};
use crate::domain::user::UserProfile;
use crate::error::Result;
use crate::port::outbound::kv::KeyValueStore;
use crate::port::outbound::llm::Llm;
use crate::port::outbound::messenger::{Messenger, OutboundMessage};
use crate::port::outbound::store::{MuteStore, RecommendationStore, SnapshotStore};

use super::advice::{Advice, Advisor, PromptContext};
use super::claim::{claim_ttl, ClaimOutcome, ThemeClaims};
use super::config::CopilotConfig;
use super::eligibility::{cap_reached, static_reasons, Ineligibility, Observed, Usage};
use super::evidence::{gather, Evidence};
use super::ledger::Ledger;
use super::message::{keyboard, render, DraftView};
use super::sizing::{size_draft, SizingRejection};

const LAST_EVAL_TTL: Duration = Duration::from_secs(86_400);

/// What happened to one theme.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ThemeOutcome {
    Sent {
        recommendation_id: RecommendationId,
        recommendation: RecommendationKind,
    },
    Ineligible {
        reasons: Vec<Ineligibility>,
    },
    /// Advice could not be obtained; the fallback is recorded, not sent.
    CompletionFailed {
        fallback: Advice,
    },
    DeliveryFailed {
        recommendation_id: RecommendationId,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeEvaluation {
    pub theme_key: String,
    pub alert_id: AlertId,
    #[serde(flatten)]
    pub outcome: ThemeOutcome,
}

/// Summary of one enqueue pass, also stored as the user's last evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CopilotReport {
    pub user_id: UserId,
    pub plan: String,
    pub at: DateTime<Utc>,
    pub sent: u32,
    pub evaluations: Vec<ThemeEvaluation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade_hint: Option<String>,
}

impl CopilotReport {
    #[must_use]
    pub fn sent_ids(&self) -> Vec<&RecommendationId> {
        self.evaluations
            .iter()
            .filter_map(|e| match &e.outcome {
                ThemeOutcome::Sent {
                    recommendation_id, ..
                } => Some(recommendation_id),
                _ => None,
            })
            .collect()
    }
}

/// Ports the copilot talks to.
#[derive(Clone)]
pub struct CopilotPorts {
    pub snapshots: Arc<dyn SnapshotStore>,
    pub recommendations: Arc<dyn RecommendationStore>,
    pub mutes: Arc<dyn MuteStore>,
    pub kv: Arc<dyn KeyValueStore>,
    pub llm: Arc<dyn Llm>,
    pub messenger: Arc<dyn Messenger>,
}

struct Candidate<'a> {
    theme: &'a Theme,
    rep: &'a ThemeMember,
    evidence: Evidence,
}

pub struct Copilot {
    snapshots: Arc<dyn SnapshotStore>,
    recommendations: Arc<dyn RecommendationStore>,
    mutes: Arc<dyn MuteStore>,
    kv: Arc<dyn KeyValueStore>,
    messenger: Arc<dyn Messenger>,
    advisor: Advisor,
    claims: ThemeClaims,
    ledger: Ledger,
    config: CopilotConfig,
    descriptors: Descriptors,
}

impl Copilot {
    pub fn new(ports: CopilotPorts, config: CopilotConfig, descriptors: Descriptors) -> Self {
        let advisor = Advisor::new(ports.llm, ports.kv.clone(), config.llm_cache_ttl());
        Self {
            snapshots: ports.snapshots,
            recommendations: ports.recommendations,
            mutes: ports.mutes,
            claims: ThemeClaims::new(ports.kv.clone()),
            ledger: Ledger::new(ports.kv.clone()),
            kv: ports.kv,
            messenger: ports.messenger,
            advisor,
            config,
            descriptors,
        }
    }

    #[must_use]
    pub fn config(&self) -> &CopilotConfig {
        &self.config
    }

    async fn is_muted(
        &self,
        user: &UserId,
        theme: &Theme,
        alert: &Alert,
        now: DateTime<Utc>,
    ) -> bool {
        let checks = [
            (MuteScope::Market, alert.contract_id.as_str()),
            (MuteScope::Theme, theme.key.as_str()),
        ];
        for (scope, target) in checks {
            match self.mutes.active_mute(user, scope, target, now).await {
                Ok(Some(_)) => return true,
                Ok(None) => {}
                Err(error) => {
                    warn!(user_id = %user, scope = %scope, error = %error, "mute lookup failed");
                    return true;
                }
            }
        }
        false
    }

    fn window_for(settings: &EffectiveSettings, alert: &Alert) -> u32 {
        if alert.is_fast() {
            settings.fast_window_minutes.max(1)
        } else {
            settings.digest_window_minutes.max(1)
        }
    }

    async fn evidence_for(&self, settings: &EffectiveSettings, alert: &Alert) -> Evidence {
        let depth = self.config.evidence_points;
        let points = match load_price_points(self.snapshots.as_ref(), alert, depth).await {
            Ok(points) => points,
            Err(error) => {
                warn!(alert_id = %alert.id, error = %error, "evidence history load failed");
                Vec::new()
            }
        };
        gather(alert, &points, Self::window_for(settings, alert), &self.descriptors)
    }

    fn context<'a>(
        theme: &'a Theme,
        rep: &'a ThemeMember,
        evidence: &'a Evidence,
    ) -> PromptContext<'a> {
        let alert = &rep.alert;
        PromptContext {
            market: &alert.title,
            category: alert.category.as_deref(),
            theme: &theme.label,
            alert_type: alert.alert_type.as_str(),
            old_price: alert.old_price,
            new_price: alert.new_price,
            delta_pct: alert.delta_pct,
            liquidity: alert.liquidity,
            volume_24h: alert.volume_24h,
            signal_type: rep.classification.map(|c| c.signal_type.as_str()),
            classification_confidence: rep.classification.map(|c| c.confidence.as_str()),
            suggested_action: rep.classification.map(|c| c.suggested_action.as_str()),
            signal_speed: evidence.speed,
            evidence: &evidence.lines,
            related_markets: theme
                .members
                .iter()
                .skip(1)
                .map(|m| m.theme.short_title.as_str())
                .collect(),
        }
    }

    /// Gate every theme, then order the survivors by representative
    /// liquidity and volume.
    async fn candidates<'a>(
        &self,
        user: &UserProfile,
        settings: &EffectiveSettings,
        themes: impl Iterator<Item = &'a Theme>,
        now: DateTime<Utc>,
        evaluations: &mut Vec<ThemeEvaluation>,
    ) -> Vec<Candidate<'a>> {
        let mut eligible = Vec::new();
        for theme in themes {
            let Some(rep) = theme.members.first() else {
                continue;
            };
            let alert = &rep.alert;
            let muted = self.is_muted(&user.id, theme, alert, now).await;
            let evidence = self.evidence_for(settings, alert).await;
            let observed = Observed {
                muted,
                snapshots: evidence.points,
            };
            let reasons = static_reasons(settings, rep, observed, self.config.min_snapshots);
            if reasons.is_empty() {
                eligible.push(Candidate { theme, rep, evidence });
            } else {
                debug!(
                    user_id = %user.id,
                    theme_key = %theme.key,
                    reason = reasons[0].as_str(),
                    "copilot skipped theme"
                );
                evaluations.push(ThemeEvaluation {
                    theme_key: theme.key.clone(),
                    alert_id: alert.id.clone(),
                    outcome: ThemeOutcome::Ineligible { reasons },
                });
            }
        }
        eligible.sort_by(|a, b| {
            b.rep
                .alert
                .liquidity
                .total_cmp(&a.rep.alert.liquidity)
                .then_with(|| b.rep.alert.volume_24h.total_cmp(&a.rep.alert.volume_24h))
        });
        eligible
    }

    async fn audit(
        &self,
        recommendation: &Recommendation,
        kind: AuditKind,
        at: DateTime<Utc>,
        detail: Option<&str>,
    ) {
        let event = AuditEvent {
            recommendation_id: recommendation.id.clone(),
            user_id: recommendation.user_id.clone(),
            kind,
            at,
            detail: detail.map(str::to_string),
        };
        if let Err(error) = self.recommendations.record_event(&event).await {
            warn!(recommendation_id = %recommendation.id, error = %error, "audit write failed");
        }
    }

    /// Produce and deliver one recommendation for a claimed theme.
    async fn recommend(
        &self,
        user: &UserProfile,
        settings: &EffectiveSettings,
        candidate: &Candidate<'_>,
        now: DateTime<Utc>,
    ) -> Result<ThemeOutcome> {
        let alert = &candidate.rep.alert;
        let context = Self::context(candidate.theme, candidate.rep, &candidate.evidence);
        let advice = match self.advisor.advise(&user.id, &alert.id, &context).await {
            Ok(advice) => advice,
            Err(error) => {
                warn!(
                    user_id = %user.id,
                    alert_id = %alert.id,
                    error = %error,
                    "completion failed, releasing claim"
                );
                return Ok(ThemeOutcome::CompletionFailed {
                    fallback: Advice::fallback(),
                });
            }
        };

        let mut rejections = Vec::new();
        let draft = if advice.recommendation == RecommendationKind::Buy {
            match self.ledger.spent_today(&user.id, now).await {
                Ok(spent) => match size_draft(alert, settings, spent, &self.config) {
                    Ok(draft) => Some(draft),
                    Err(reasons) => {
                        rejections = reasons;
                        None
                    }
                },
                Err(error) => {
                    warn!(user_id = %user.id, error = %error, "risk ledger read failed");
                    rejections = vec![SizingRejection::BudgetUnavailable];
                    None
                }
            }
        } else {
            None
        };

        let recommendation = Recommendation {
            id: RecommendationId::generate(),
            user_id: user.id.clone(),
            alert_id: alert.id.clone(),
            theme_key: candidate.theme.key.clone(),
            recommendation: advice.recommendation,
            confidence: advice.confidence,
            rationale: advice.rationale,
            risks: advice.risks,
            draft,
            status: RecommendationStatus::Proposed,
            created_at: now,
            expires_at: now + self.config.recommendation_ttl(),
        };
        self.recommendations.insert_recommendation(&recommendation).await?;
        self.audit(&recommendation, AuditKind::Proposed, now, None).await;

        let view = match &recommendation.draft {
            Some(order) => DraftView::Order(order),
            None if recommendation.recommendation == RecommendationKind::Buy => {
                DraftView::Unavailable(&rejections)
            }
            None => DraftView::NotProposed,
        };
        let html = render(&recommendation, alert, &candidate.evidence.lines, &view);
        let message = OutboundMessage::new(user.chat_id, html).with_keyboard(keyboard(
            &recommendation,
            alert,
            self.config.mute_minutes,
        ));

        if let Err(error) = self.messenger.send(&message).await {
            warn!(
                user_id = %user.id,
                recommendation_id = %recommendation.id,
                error = %error,
                "copilot delivery failed"
            );
            let expired = self
                .recommendations
                .transition(
                    &recommendation.id,
                    RecommendationStatus::Proposed,
                    RecommendationStatus::Expired,
                )
                .await;
            match expired {
                Ok(true) => {
                    self.audit(&recommendation, AuditKind::Expired, now, Some("delivery_failed"))
                        .await;
                }
                Ok(false) => {}
                Err(error) => warn!(
                    recommendation_id = %recommendation.id,
                    error = %error,
                    "could not expire undelivered recommendation"
                ),
            }
            return Ok(ThemeOutcome::DeliveryFailed {
                recommendation_id: recommendation.id,
            });
        }

        info!(
            user_id = %user.id,
            theme_key = %candidate.theme.key,
            recommendation_id = %recommendation.id,
            recommendation = %recommendation.recommendation,
            "copilot recommendation sent"
        );
        Ok(ThemeOutcome::Sent {
            recommendation_id: recommendation.id,
            recommendation: recommendation.recommendation,
        })
    }

    /// Evaluate a digest's themes for one user and send what qualifies.
    pub async fn enqueue_recommendations(
        &self,
        user: &UserProfile,
        settings: &EffectiveSettings,
        themes: &[Theme],
        fast_themes: &[Theme],
        now: DateTime<Utc>,
    ) -> Result<CopilotReport> {
        let mut report = CopilotReport {
            user_id: user.id.clone(),
            plan: settings.plan_name.clone(),
            at: now,
            sent: 0,
            evaluations: Vec::new(),
            upgrade_hint: None,
        };

        if !settings.copilot_enabled {
            for theme in themes.iter().chain(fast_themes) {
                if let Some(rep) = theme.members.first() {
                    report.evaluations.push(ThemeEvaluation {
                        theme_key: theme.key.clone(),
                        alert_id: rep.alert.id.clone(),
                        outcome: ThemeOutcome::Ineligible {
                            reasons: vec![Ineligibility::UserDisabled],
                        },
                    });
                }
            }
            self.store_report(&report).await;
            return Ok(report);
        }

        let all = themes.iter().chain(fast_themes);
        let candidates = self
            .candidates(user, settings, all, now, &mut report.evaluations)
            .await;
        let mut usage: Usage = match self.ledger.usage(&user.id, now).await {
            Ok(usage) => usage,
            Err(error) => {
                warn!(user_id = %user.id, error = %error, "copilot usage read failed");
                for candidate in &candidates {
                    report.evaluations.push(ThemeEvaluation {
                        theme_key: candidate.theme.key.clone(),
                        alert_id: candidate.rep.alert.id.clone(),
                        outcome: ThemeOutcome::Ineligible {
                            reasons: vec![Ineligibility::UsageUnavailable],
                        },
                    });
                }
                self.store_report(&report).await;
                return Ok(report);
            }
        };
        let ttl = claim_ttl(settings.copilot_theme_ttl_minutes);

        for candidate in &candidates {
            let alert = &candidate.rep.alert;
            let theme_key = &candidate.theme.key;
            if let Some(reason) = cap_reached(settings, usage) {
                if reason.is_plan_cap() {
                    report.upgrade_hint = Plan::by_name(&settings.plan_name).upgrade_hint();
                }
                report.evaluations.push(ThemeEvaluation {
                    theme_key: theme_key.clone(),
                    alert_id: alert.id.clone(),
                    outcome: ThemeOutcome::Ineligible {
                        reasons: vec![reason],
                    },
                });
                continue;
            }

            if self.claims.claim(&user.id, theme_key, &alert.id, ttl).await == ClaimOutcome::Held {
                debug!(
                    user_id = %user.id,
                    theme_key = %theme_key,
                    reason = "copilot_dedupe_active",
                    "copilot skipped theme"
                );
                report.evaluations.push(ThemeEvaluation {
                    theme_key: theme_key.clone(),
                    alert_id: alert.id.clone(),
                    outcome: ThemeOutcome::Ineligible {
                        reasons: vec![Ineligibility::CopilotDedupeActive],
                    },
                });
                continue;
            }

            let outcome = match self.recommend(user, settings, candidate, now).await {
                Ok(outcome) => outcome,
                Err(error) => {
                    self.claims
                        .release(&user.id, theme_key, &alert.id, self.config.claim_retry_ttl())
                        .await;
                    self.store_report(&report).await;
                    return Err(error);
                }
            };
            match &outcome {
                ThemeOutcome::Sent { .. } => {
                    if let Err(error) = self.ledger.record_send(&user.id, now).await {
                        warn!(user_id = %user.id, error = %error, "copilot counter update failed");
                    }
                    usage.daily += 1;
                    usage.hourly += 1;
                    usage.digest += 1;
                    report.sent += 1;
                }
                ThemeOutcome::CompletionFailed { .. } | ThemeOutcome::DeliveryFailed { .. } => {
                    self.claims
                        .release(&user.id, theme_key, &alert.id, self.config.claim_retry_ttl())
                        .await;
                }
                ThemeOutcome::Ineligible { .. } => {}
            }
            report.evaluations.push(ThemeEvaluation {
                theme_key: theme_key.clone(),
                alert_id: alert.id.clone(),
                outcome,
            });
        }

        self.store_report(&report).await;
        Ok(report)
    }

    async fn store_report(&self, report: &CopilotReport) {
        let encoded = match serde_json::to_string(report) {
            Ok(encoded) => encoded,
            Err(error) => {
                warn!(error = %error, "copilot report encode failed");
                return;
            }
        };
        if let Err(error) = self
            .kv
            .set(&keyspace::copilot_last_eval(&report.user_id), &encoded, Some(LAST_EVAL_TTL))
            .await
        {
            warn!(user_id = %report.user_id, error = %error, "copilot report write failed");
        }
    }
}
