//! Per-user digest run.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use url::Url;

use crate::application::classify::classifier::AlertClassifier;
use crate::application::format::Descriptors;
use crate::application::keyspace;
use crate::application::theme::group::group_into_themes;
use crate::domain::alert::{Alert, AlertType};
use crate::domain::classification::AlertClassification;
use crate::domain::id::TenantId;
use crate::domain::settings::EffectiveSettings;
use crate::domain::theme::Theme;
use crate::domain::user::UserProfile;
use crate::error::Result;
use crate::port::outbound::kv::KeyValueStore;
use crate::port::outbound::messenger::{Messenger, OutboundMessage};
use crate::port::outbound::store::AlertStore;

use super::render::{compose, render_fast, render_standard, RenderContext};
use super::select::{cap_themes, passes_user_filters, rank, Band};

/// Minimum lifetime of a content fingerprint claim.
const MIN_FINGERPRINT_TTL_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestStatus {
    Sent,
    /// A digest went out within the current window.
    RecentlySent,
    /// Nothing passed the filters.
    Empty,
    /// The same alert set was already delivered.
    Duplicate,
    DeliveryFailed,
}

impl DigestStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::RecentlySent => "recent_digest",
            Self::Empty => "no_alerts",
            Self::Duplicate => "digest_dedupe",
            Self::DeliveryFailed => "delivery_failed",
        }
    }
}

/// Outcome of one digest run, including the themes it selected so the
/// copilot can work from the same view.
#[derive(Debug, Clone)]
pub struct DigestOutcome {
    pub status: DigestStatus,
    pub themes: Vec<Theme>,
    pub fast_themes: Vec<Theme>,
}

impl DigestOutcome {
    fn status(status: DigestStatus) -> Self {
        Self {
            status,
            themes: Vec::new(),
            fast_themes: Vec::new(),
        }
    }
}

/// SHA-256 over the sorted alert ids.
#[must_use]
pub fn digest_fingerprint<'a>(alerts: impl IntoIterator<Item = &'a Alert>) -> String {
    let mut ids: Vec<&str> = alerts.into_iter().map(|a| a.id.as_str()).collect();
    ids.sort_unstable();
    let mut hasher = Sha256::new();
    for id in ids {
        hasher.update(id.as_bytes());
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}

fn member_counts(themes: &[Theme]) -> Vec<usize> {
    themes.iter().map(Theme::len).collect()
}

/// Builds, deduplicates and delivers digests.
pub struct DigestService {
    alerts: Arc<dyn AlertStore>,
    kv: Arc<dyn KeyValueStore>,
    messenger: Arc<dyn Messenger>,
    classifier: Arc<AlertClassifier>,
    market_base: Url,
    descriptors: Descriptors,
}

impl DigestService {
    pub fn new(
        alerts: Arc<dyn AlertStore>,
        kv: Arc<dyn KeyValueStore>,
        messenger: Arc<dyn Messenger>,
        classifier: Arc<AlertClassifier>,
        market_base: Url,
    ) -> Self {
        let descriptors = Descriptors::from_classifier(classifier.config());
        Self {
            alerts,
            kv,
            messenger,
            classifier,
            market_base,
            descriptors,
        }
    }

    async fn recently_sent(&self, user: &UserProfile) -> bool {
        match self.kv.get(&keyspace::digest_last_sent(&user.id)).await {
            Ok(value) => value.is_some(),
            Err(error) => {
                warn!(user_id = %user.id, error = %error, "digest marker lookup failed");
                false
            }
        }
    }

    /// Standard section themes: filtered, ranked, classified, capped.
    async fn standard_themes(
        &self,
        tenant: &TenantId,
        settings: &EffectiveSettings,
        now: DateTime<Utc>,
    ) -> Result<(Vec<Theme>, Vec<usize>)> {
        let window = i64::from(settings.digest_window_minutes.max(1));
        let since = now - chrono::Duration::minutes(window);
        let loaded = self
            .alerts
            .created_since(tenant, AlertType::StandardDislocation, since)
            .await?;
        let filtered: Vec<Alert> = loaded
            .into_iter()
            .filter(|a| passes_user_filters(a, settings, Band::Strict))
            .collect();
        let ranked = rank(filtered);

        let mut classified: Vec<(Alert, Option<AlertClassification>)> = self
            .classifier
            .classify_all(ranked)
            .await
            .into_iter()
            .filter(|(_, c)| settings.allow_info_alerts || c.actionability.is_actionable())
            .map(|(a, c)| (a, Some(c)))
            .collect();
        classified.truncate(settings.max_alerts_per_digest as usize);

        let mut themes = group_into_themes(classified);
        themes.truncate(settings.max_themes_per_digest as usize);
        let counts = member_counts(&themes);
        cap_themes(
            &mut themes,
            settings.max_themes_per_digest,
            settings.max_markets_per_theme,
        );
        Ok((themes, counts))
    }

    /// Fast watchlist themes over the fast window and soft band.
    async fn fast_themes(
        &self,
        tenant: &TenantId,
        settings: &EffectiveSettings,
        now: DateTime<Utc>,
    ) -> Result<(Vec<Theme>, Vec<usize>)> {
        if !settings.fast_section_enabled() {
            return Ok((Vec::new(), Vec::new()));
        }
        let window = i64::from(settings.fast_window_minutes.max(1));
        let since = now - chrono::Duration::minutes(window);
        let loaded = self
            .alerts
            .created_since(tenant, AlertType::FastDislocation, since)
            .await?;
        let ranked = rank(
            loaded
                .into_iter()
                .filter(|a| passes_user_filters(a, settings, Band::Soft))
                .collect(),
        );
        let mut themes = group_into_themes(ranked.into_iter().map(|a| (a, None)));
        themes.truncate(settings.fast_max_themes_per_digest as usize);
        let counts = member_counts(&themes);
        cap_themes(
            &mut themes,
            settings.fast_max_themes_per_digest,
            settings.fast_max_markets_per_theme,
        );
        Ok((themes, counts))
    }

    /// Build and send one user's digest.
    ///
    /// The send is guarded twice: a last-sent marker living for the window,
    /// and a content fingerprint claimed with set-if-absent. A failed
    /// delivery releases the fingerprint so a later run can retry.
    pub async fn run_digest_for_user(
        &self,
        tenant: &TenantId,
        user: &UserProfile,
        settings: &EffectiveSettings,
        now: DateTime<Utc>,
    ) -> Result<DigestOutcome> {
        let window = settings.digest_window_minutes.max(1);
        if self.recently_sent(user).await {
            debug!(user_id = %user.id, reason = "recent_digest", "digest skipped");
            return Ok(DigestOutcome::status(DigestStatus::RecentlySent));
        }

        let (themes, counts) = self.standard_themes(tenant, settings, now).await?;
        let (fast_themes, fast_counts) = self.fast_themes(tenant, settings, now).await?;
        if themes.is_empty() && fast_themes.is_empty() {
            debug!(user_id = %user.id, reason = "no_alerts", "digest skipped");
            return Ok(DigestOutcome::status(DigestStatus::Empty));
        }

        let ctx = RenderContext {
            market_base: &self.market_base,
            descriptors: self.descriptors,
        };
        let mut sections = Vec::with_capacity(2);
        if !themes.is_empty() {
            sections.push(render_standard(&themes, &counts, window, &ctx));
        }
        if !fast_themes.is_empty() {
            sections.push(render_fast(
                &fast_themes,
                &fast_counts,
                settings.fast_window_minutes.max(1),
                &ctx,
            ));
        }
        let Some(html) = compose(&sections) else {
            return Ok(DigestOutcome::status(DigestStatus::Empty));
        };

        let included = themes
            .iter()
            .chain(fast_themes.iter())
            .flat_map(|t| t.members.iter().map(|m| &m.alert));
        let fingerprint_key = keyspace::digest_sent(&user.id, &digest_fingerprint(included));
        let fingerprint_ttl =
            Duration::from_secs((u64::from(window) * 90).max(MIN_FINGERPRINT_TTL_SECS));
        let claimed = match self.kv.set_nx(&fingerprint_key, "1", fingerprint_ttl).await {
            Ok(claimed) => claimed,
            Err(error) => {
                warn!(user_id = %user.id, error = %error, "digest fingerprint claim failed");
                true
            }
        };

        let mut outcome = DigestOutcome {
            status: DigestStatus::Duplicate,
            themes,
            fast_themes,
        };
        if !claimed {
            debug!(user_id = %user.id, reason = "digest_dedupe", "digest skipped");
            return Ok(outcome);
        }

        let message = OutboundMessage::new(user.chat_id, html);
        if let Err(error) = self.messenger.send(&message).await {
            warn!(user_id = %user.id, error = %error, "digest delivery failed");
            if let Err(error) = self.kv.delete(&fingerprint_key).await {
                warn!(user_id = %user.id, error = %error, "digest fingerprint release failed");
            }
            outcome.status = DigestStatus::DeliveryFailed;
            return Ok(outcome);
        }

        let marker_ttl = Duration::from_secs(u64::from(window) * 60);
        if let Err(error) = self
            .kv
            .set(&keyspace::digest_last_sent(&user.id), &now.to_rfc3339(), Some(marker_ttl))
            .await
        {
            warn!(user_id = %user.id, error = %error, "digest marker write failed");
        }
        info!(
            user_id = %user.id,
            themes = outcome.themes.len(),
            fast_themes = outcome.fast_themes.len(),
            window_minutes = window,
            "digest sent"
        );
        outcome.status = DigestStatus::Sent;
        Ok(outcome)
    }
}
