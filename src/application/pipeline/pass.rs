//! One scheduled pass: ingest, detect, expire, then digest and copilot per
//! user.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::config::SchedulerConfig;
use super::lock::PassLock;
use super::report::{PassReport, PassStatus, RunCounters, RunField};
use crate::application::cancel::CancelToken;
use crate::application::copilot::expiry::expire_due;
use crate::application::copilot::orchestrator::Copilot;
use crate::application::detect::config::{DislocationConfig, FastSignalConfig};
use crate::application::detect::context::DetectContext;
use crate::application::detect::dislocation::detect_dislocations;
use crate::application::detect::fast::detect_fast_signals;
use crate::application::digest::service::{DigestService, DigestStatus};
use crate::application::keyspace;
use crate::application::settings::cache::SettingsService;
use crate::domain::alert::{AlertType, InsertOutcome};
use crate::domain::user::UserProfile;
use crate::error::Result;
use crate::port::outbound::directory::UserDirectory;
use crate::port::outbound::kv::KeyValueStore;
use crate::port::outbound::source::SnapshotSource;
use crate::port::outbound::store::{AlertStore, RecommendationStore, SnapshotStore};

/// Ports a pass reads from and writes to.
#[derive(Clone)]
pub struct PassPorts {
    pub source: Arc<dyn SnapshotSource>,
    pub snapshots: Arc<dyn SnapshotStore>,
    pub alerts: Arc<dyn AlertStore>,
    pub recommendations: Arc<dyn RecommendationStore>,
    pub directory: Arc<dyn UserDirectory>,
    pub kv: Arc<dyn KeyValueStore>,
}

/// Detector thresholds used by every pass.
#[derive(Debug, Clone, Default)]
pub struct DetectorConfigs {
    pub dislocation: DislocationConfig,
    pub fast: FastSignalConfig,
}

pub struct ScheduledPass {
    ports: PassPorts,
    settings: Arc<SettingsService>,
    digests: Arc<DigestService>,
    copilot: Arc<Copilot>,
    detectors: DetectorConfigs,
    config: SchedulerConfig,
    lock: PassLock,
}

#[derive(Debug, Default)]
struct UserTally {
    digest_sent: bool,
    recommendations_sent: usize,
}

impl ScheduledPass {
    pub fn new(
        ports: PassPorts,
        settings: Arc<SettingsService>,
        digests: Arc<DigestService>,
        copilot: Arc<Copilot>,
        detectors: DetectorConfigs,
        config: SchedulerConfig,
    ) -> Self {
        let lock = PassLock::new(ports.kv.clone());
        Self {
            ports,
            settings,
            digests,
            copilot,
            detectors,
            config,
            lock,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Run one pass under the pass lock.
    ///
    /// Never returns an error: failures are logged with the run id and
    /// reflected in the report, and the lock is always released.
    pub async fn run_once(&self, now: DateTime<Utc>, cancel: &CancelToken) -> PassReport {
        let run_id = Uuid::new_v4().to_string();
        let mut report = PassReport::new(run_id.clone(), now);

        let token = match self.lock.acquire(self.config.lock_ttl()).await {
            Ok(Some(token)) => token,
            Ok(None) => {
                info!(run_id = %run_id, reason = "ingest_locked", "pass skipped");
                report.status = PassStatus::IngestLocked;
                return report;
            }
            Err(err) => {
                error!(run_id = %run_id, error = %err, "pass lock unavailable");
                report.status = PassStatus::Failed;
                report.error = Some(err.to_string());
                return report;
            }
        };

        info!(run_id = %run_id, "pass started");
        let counters = RunCounters::new(self.ports.kv.clone(), &run_id, self.config.run_counter_ttl());
        if let Err(err) = self.stages(now, cancel, &counters, &mut report).await {
            error!(run_id = %run_id, error = %err, "pass failed");
            report.status = PassStatus::Failed;
            report.error = Some(err.to_string());
        } else if cancel.is_cancelled() {
            report.status = PassStatus::Cancelled;
        }
        counters.add(RunField::Completed, 1).await;

        self.store_report(&report, now).await;
        self.lock.release(&token).await;
        info!(
            run_id = %run_id,
            status = report.status.as_str(),
            alerts = report.alerts_inserted,
            fast_alerts = report.fast_alerts_inserted,
            digests = report.digests_sent,
            recommendations = report.recommendations_sent,
            "pass finished"
        );
        report
    }

    async fn stages(
        &self,
        now: DateTime<Utc>,
        cancel: &CancelToken,
        counters: &RunCounters,
        report: &mut PassReport,
    ) -> Result<()> {
        let latest = self.ports.source.fetch_latest().await?;
        report.snapshots_fetched = latest.len();
        for snapshot in &latest {
            if self.ports.snapshots.insert_snapshot(snapshot).await? == InsertOutcome::Inserted {
                report.snapshots_inserted += 1;
            }
        }
        debug!(
            fetched = report.snapshots_fetched,
            inserted = report.snapshots_inserted,
            "snapshots ingested"
        );
        if cancel.is_cancelled() {
            return Ok(());
        }

        let ctx = DetectContext {
            snapshots: self.ports.snapshots.as_ref(),
            alerts: self.ports.alerts.as_ref(),
            tenant_id: &self.config.tenant_id,
            now,
            cancel,
        };
        let mut detected = detect_dislocations(ctx, &latest, &self.detectors.dislocation).await?;
        detected.extend(detect_fast_signals(ctx, &latest, &self.detectors.fast).await?);
        report.alerts_detected = detected.len();
        for alert in &detected {
            if self.ports.alerts.insert_alert(alert).await? == InsertOutcome::Duplicate {
                continue;
            }
            match alert.alert_type {
                AlertType::StandardDislocation => report.alerts_inserted += 1,
                AlertType::FastDislocation => report.fast_alerts_inserted += 1,
            }
        }

        report.recommendations_expired = expire_due(&self.ports.recommendations, now).await?;
        if cancel.is_cancelled() {
            return Ok(());
        }

        let users = self.ports.directory.active_users().await?;
        report.users_expected = users.len();
        counters.add(RunField::Expected, count(users.len())).await;
        for user in &users {
            if cancel.is_cancelled() {
                info!(remaining = users.len() - report.users_attempted, "user loop cancelled");
                break;
            }
            report.users_attempted += 1;
            counters.add(RunField::Attempted, 1).await;
            match self.run_user(user, now).await {
                Ok(tally) => {
                    report.users_succeeded += 1;
                    report.digests_sent += usize::from(tally.digest_sent);
                    report.recommendations_sent += tally.recommendations_sent;
                    counters.add(RunField::Succeeded, 1).await;
                }
                Err(err) => warn!(user_id = %user.id, error = %err, "user pass failed"),
            }
        }
        Ok(())
    }

    async fn run_user(&self, user: &UserProfile, now: DateTime<Utc>) -> Result<UserTally> {
        let settings = self.settings.effective_for(user).await;
        let digest = self
            .digests
            .run_digest_for_user(&self.config.tenant_id, user, &settings, now)
            .await?;
        let mut tally = UserTally {
            digest_sent: digest.status == DigestStatus::Sent,
            ..UserTally::default()
        };
        if digest.themes.is_empty() && digest.fast_themes.is_empty() {
            return Ok(tally);
        }
        let copilot = self
            .copilot
            .enqueue_recommendations(user, &settings, &digest.themes, &digest.fast_themes, now)
            .await?;
        tally.recommendations_sent = copilot.sent as usize;
        Ok(tally)
    }

    async fn store_report(&self, report: &PassReport, now: DateTime<Utc>) {
        let raw = match serde_json::to_string(report) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "pass report serialisation failed");
                return;
            }
        };
        if let Err(err) = self.ports.kv.set(keyspace::INGEST_LAST_RESULT, &raw, None).await {
            warn!(error = %err, "pass report write failed");
        }
        if let Err(err) = self
            .ports
            .kv
            .set(keyspace::INGEST_LAST_TS, &now.to_rfc3339(), None)
            .await
        {
            warn!(error = %err, "pass timestamp write failed");
        }
    }
}

fn count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
