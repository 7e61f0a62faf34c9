//! In-memory wiring of the pipeline services for integration tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use url::Url;

use pmd::adapter::outbound::memory::directory::StaticDirectory;
use pmd::adapter::outbound::memory::store::MemoryStore;
use pmd::application::classify::classifier::AlertClassifier;
use pmd::application::classify::config::ClassifierConfig;
use pmd::application::copilot::callback::{CallbackHandler, CallbackPorts};
use pmd::application::copilot::config::CopilotConfig;
use pmd::application::copilot::orchestrator::{Copilot, CopilotPorts};
use pmd::application::digest::service::DigestService;
use pmd::application::format::Descriptors;
use pmd::application::pipeline::config::SchedulerConfig;
use pmd::application::pipeline::pass::{DetectorConfigs, PassPorts, ScheduledPass};
use pmd::application::settings::cache::SettingsService;
use pmd::application::settings::config::SettingsConfig;
use pmd::domain::snapshot::Snapshot;
use pmd::domain::user::UserProfile;
use pmd::error::Result;
use pmd::port::outbound::kv::KeyValueStore;
use pmd::port::outbound::llm::Llm;
use pmd::port::outbound::messenger::Messenger;
use pmd::port::outbound::source::SnapshotSource;
use pmd::port::outbound::store::{AlertStore, SnapshotStore};
use pmd::testkit::kv::FaultyKv;
use pmd::testkit::llm::ScriptedLlm;
use pmd::testkit::messenger::RecordingMessenger;

/// 2026-01-05 12:00 UTC plus `minute` minutes.
pub fn t(minute: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap() + Duration::minutes(minute)
}

/// BUY / HIGH completion in the format the advisor expects.
pub const BUY_HIGH: &str = r#"{"recommendation":"BUY","confidence":"HIGH","rationale":"Repricing held across snapshots on a deep book.","risks":["Late reversal"]}"#;

/// Snapshot source returning whatever the test last staged.
#[derive(Default)]
pub struct StagedSource {
    batch: Mutex<Vec<Snapshot>>,
}

impl StagedSource {
    pub fn stage(&self, snapshots: Vec<Snapshot>) {
        *self.batch.lock() = snapshots;
    }
}

#[async_trait]
impl SnapshotSource for StagedSource {
    async fn fetch_latest(&self) -> Result<Vec<Snapshot>> {
        Ok(self.batch.lock().clone())
    }
}

/// Every service wired over the in-memory adapters.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub kv: Arc<FaultyKv>,
    pub messenger: Arc<RecordingMessenger>,
    pub llm: Arc<ScriptedLlm>,
    pub source: Arc<StagedSource>,
    pub settings: Arc<SettingsService>,
    pub digests: Arc<DigestService>,
    pub copilot: Arc<Copilot>,
    pub callbacks: Arc<CallbackHandler>,
    pub pass: Arc<ScheduledPass>,
}

impl Harness {
    pub fn new(users: Vec<UserProfile>) -> Self {
        Self::with_llm(users, ScriptedLlm::new([BUY_HIGH]))
    }

    pub fn with_llm(users: Vec<UserProfile>, llm: ScriptedLlm) -> Self {
        let store = Arc::new(MemoryStore::new());
        let kv = Arc::new(FaultyKv::new());
        let messenger = Arc::new(RecordingMessenger::new());
        let llm = Arc::new(llm);
        let source = Arc::new(StagedSource::default());

        let snapshots: Arc<dyn SnapshotStore> = store.clone();
        let alerts: Arc<dyn AlertStore> = store.clone();
        let shared_kv: Arc<dyn KeyValueStore> = kv.clone();
        let outbound: Arc<dyn Messenger> = messenger.clone();
        let completions: Arc<dyn Llm> = llm.clone();

        let classifier_config = ClassifierConfig::default();
        let settings = Arc::new(SettingsService::new(
            shared_kv.clone(),
            SettingsConfig::default(),
        ));
        let classifier = Arc::new(AlertClassifier::new(
            snapshots.clone(),
            classifier_config.clone(),
        ));
        let digests = Arc::new(DigestService::new(
            alerts.clone(),
            shared_kv.clone(),
            outbound.clone(),
            classifier,
            Url::parse("https://polymarket.com/market/").unwrap(),
        ));
        let copilot = Arc::new(Copilot::new(
            CopilotPorts {
                snapshots: snapshots.clone(),
                recommendations: store.clone(),
                mutes: store.clone(),
                kv: shared_kv.clone(),
                llm: completions,
                messenger: outbound,
            },
            CopilotConfig::default(),
            Descriptors::from_classifier(&classifier_config),
        ));
        let callbacks = Arc::new(CallbackHandler::new(
            CallbackPorts {
                alerts: alerts.clone(),
                recommendations: store.clone(),
                mutes: store.clone(),
                kv: shared_kv.clone(),
            },
            CopilotConfig::default(),
        ));
        let pass = Arc::new(ScheduledPass::new(
            PassPorts {
                source: source.clone(),
                snapshots,
                alerts,
                recommendations: store.clone(),
                directory: Arc::new(StaticDirectory::new(users)),
                kv: shared_kv,
            },
            settings.clone(),
            digests.clone(),
            copilot.clone(),
            DetectorConfigs::default(),
            SchedulerConfig::default(),
        ));

        Self {
            store,
            kv,
            messenger,
            llm,
            source,
            settings,
            digests,
            copilot,
            callbacks,
            pass,
        }
    }

    pub async fn seed_snapshots(&self, snapshots: &[Snapshot]) {
        for snapshot in snapshots {
            self.store.insert_snapshot(snapshot).await.unwrap();
        }
    }
}
