//! Composition root: builds adapters and services from [`Config`].

use std::sync::Arc;

use tracing::{info, warn};

use crate::adapter::outbound::feed::file::FileFeed;
use crate::adapter::outbound::guard::wrap::{GuardedLlm, GuardedMessenger};
use crate::adapter::outbound::llm::anthropic::Anthropic;
use crate::adapter::outbound::llm::offline::OfflineLlm;
use crate::adapter::outbound::llm::openai::OpenAi;
use crate::adapter::outbound::log::messenger::LogMessenger;
use crate::adapter::outbound::memory::directory::StaticDirectory;
use crate::adapter::outbound::memory::kv::MemoryKv;
use crate::adapter::outbound::memory::store::MemoryStore;
use crate::adapter::outbound::sqlite::database::connection::open;
use crate::adapter::outbound::sqlite::store::SqliteStore;
use crate::application::classify::classifier::AlertClassifier;
use crate::application::copilot::callback::{CallbackHandler, CallbackPorts};
use crate::application::copilot::orchestrator::{Copilot, CopilotPorts};
use crate::application::digest::service::DigestService;
use crate::application::format::Descriptors;
use crate::application::pipeline::pass::{DetectorConfigs, PassPorts, ScheduledPass};
use crate::application::settings::cache::SettingsService;
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::llm::LlmProvider;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::directory::UserDirectory;
use crate::port::outbound::kv::KeyValueStore;
use crate::port::outbound::llm::Llm;
use crate::port::outbound::messenger::Messenger;
use crate::port::outbound::source::SnapshotSource;
use crate::port::outbound::store::{AlertStore, MuteStore, RecommendationStore, SnapshotStore};

/// Adapters that talk to the outside world. Swapped out in tests.
#[derive(Clone)]
pub struct Externals {
    pub source: Arc<dyn SnapshotSource>,
    pub llm: Arc<dyn Llm>,
    pub messenger: Arc<dyn Messenger>,
}

/// Fully wired services.
pub struct App {
    pub config: Config,
    pub pass: Arc<ScheduledPass>,
    pub callbacks: Arc<CallbackHandler>,
    pub settings: Arc<SettingsService>,
    pub directory: Arc<dyn UserDirectory>,
}

/// Completion client for the configured provider.
///
/// A missing API key is not fatal: the copilot degrades to its
/// transport-failure path and digests still go out.
pub fn build_llm(config: &Config) -> Arc<dyn Llm> {
    let llm = &config.llm;
    let provider = llm.selected();
    let built: Result<Arc<dyn Llm>> = match llm.provider {
        LlmProvider::Anthropic => Anthropic::from_env(
            provider.model.clone(),
            provider.max_tokens,
            provider.temperature,
            llm.request_timeout(),
        )
        .map(|c| Arc::new(c) as Arc<dyn Llm>),
        LlmProvider::OpenAi => OpenAi::from_env(
            provider.model.clone(),
            provider.max_tokens,
            provider.temperature,
            llm.request_timeout(),
        )
        .map(|c| Arc::new(c) as Arc<dyn Llm>),
    };
    match built {
        Ok(client) => {
            info!(provider = client.name(), model = %provider.model, "completion client ready");
            client
        }
        Err(err) => {
            warn!(error = %err, "completion client unavailable, copilot will fall back");
            Arc::new(OfflineLlm::new(err.to_string()))
        }
    }
}

/// Messenger for the configured transport.
#[cfg(feature = "telegram")]
pub fn build_messenger(config: &Config) -> Result<Arc<dyn Messenger>> {
    use crate::adapter::outbound::telegram::messenger::TelegramMessenger;

    if config.telegram.enabled {
        let messenger = TelegramMessenger::from_env()?;
        info!("telegram delivery enabled");
        return Ok(Arc::new(messenger));
    }
    Ok(Arc::new(LogMessenger))
}

#[cfg(not(feature = "telegram"))]
pub fn build_messenger(config: &Config) -> Result<Arc<dyn Messenger>> {
    if config.telegram.enabled {
        return Err(ConfigError::Other(
            "telegram.enabled requires the telegram feature".to_string(),
        )
        .into());
    }
    Ok(Arc::new(LogMessenger))
}

/// Build every service with real external adapters.
pub fn build(config: Config) -> Result<App> {
    let externals = Externals {
        source: Arc::new(FileFeed::new(config.feed.path.clone())),
        llm: build_llm(&config),
        messenger: build_messenger(&config)?,
    };
    build_with(config, externals)
}

/// Build every service around the given external adapters.
pub fn build_with(config: Config, externals: Externals) -> Result<App> {
    if config.users.is_empty() {
        warn!("no users configured; passes will only ingest and detect");
    }

    let pool = open(&config.database)?;
    let sqlite = Arc::new(SqliteStore::new(pool));
    let snapshots: Arc<dyn SnapshotStore> = sqlite.clone();
    let alerts: Arc<dyn AlertStore> = sqlite;

    let memory = Arc::new(MemoryStore::new());
    let recommendations: Arc<dyn RecommendationStore> = memory.clone();
    let mutes: Arc<dyn MuteStore> = memory;
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKv::new());
    let directory: Arc<dyn UserDirectory> = Arc::new(StaticDirectory::new(config.users.clone()));

    let llm: Arc<dyn Llm> = Arc::new(GuardedLlm::new(externals.llm, config.guard.llm.clone()));
    let messenger: Arc<dyn Messenger> = Arc::new(GuardedMessenger::new(
        externals.messenger,
        config.guard.messenger.clone(),
    ));

    let market_base = config
        .digest
        .market_base()
        .map_err(|e| ConfigError::InvalidValue {
            field: "market_base_url",
            reason: e.to_string(),
        })?;

    let settings = Arc::new(SettingsService::new(kv.clone(), config.settings.clone()));
    let classifier = Arc::new(AlertClassifier::new(
        snapshots.clone(),
        config.classifier.clone(),
    ));
    let digests = Arc::new(DigestService::new(
        alerts.clone(),
        kv.clone(),
        messenger.clone(),
        classifier,
        market_base,
    ));
    let copilot = Arc::new(Copilot::new(
        CopilotPorts {
            snapshots: snapshots.clone(),
            recommendations: recommendations.clone(),
            mutes: mutes.clone(),
            kv: kv.clone(),
            llm,
            messenger,
        },
        config.copilot.clone(),
        Descriptors::from_classifier(&config.classifier),
    ));
    let callbacks = Arc::new(CallbackHandler::new(
        CallbackPorts {
            alerts: alerts.clone(),
            recommendations: recommendations.clone(),
            mutes,
            kv: kv.clone(),
        },
        config.copilot.clone(),
    ));

    let pass = Arc::new(ScheduledPass::new(
        PassPorts {
            source: externals.source,
            snapshots,
            alerts,
            recommendations,
            directory: directory.clone(),
            kv,
        },
        settings.clone(),
        digests,
        copilot,
        DetectorConfigs {
            dislocation: config.detector.clone(),
            fast: config.fast.clone(),
        },
        config.scheduler.clone(),
    ));

    info!(
        database = %config.database,
        users = config.users.len(),
        interval_seconds = config.scheduler.interval_seconds,
        "services wired"
    );

    Ok(App {
        config,
        pass,
        callbacks,
        settings,
        directory,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::cancel::CancelToken;
    use crate::application::pipeline::report::PassStatus;
    use crate::testkit::domain::user;
    use crate::testkit::llm::ScriptedLlm;
    use crate::testkit::messenger::RecordingMessenger;

    fn config() -> Config {
        let mut config = Config::parse_toml("database = \":memory:\"").unwrap();
        config.users.push(user("u1", 11, "pro"));
        config
    }

    #[tokio::test]
    async fn wired_pass_runs_against_a_feed_file() {
        let dir = tempfile::tempdir().unwrap();
        let feed = dir.path().join("feed.json");
        std::fs::write(&feed, r#"[{"contract_id": "c1", "title": "Will it rain?", "p_yes": 0.5, "liquidity": 9000, "volume_24h": 9000}]"#)
            .unwrap();
        let messenger = Arc::new(RecordingMessenger::new());
        let app = build_with(
            config(),
            Externals {
                source: Arc::new(FileFeed::new(&feed)),
                llm: Arc::new(ScriptedLlm::failing()),
                messenger: messenger.clone(),
            },
        )
        .unwrap();

        let report = app.pass.run_once(chrono::Utc::now(), &CancelToken::new()).await;
        assert_eq!(report.status, PassStatus::Completed);
        assert_eq!(report.snapshots_fetched, 1);
        assert_eq!(report.snapshots_inserted, 1);
        assert_eq!(report.users_attempted, 1);
        assert_eq!(messenger.count(), 0);
    }

    #[test]
    fn missing_api_key_falls_back_to_offline_client() {
        let mut config = config();
        config.llm.provider = LlmProvider::Anthropic;
        if std::env::var("ANTHROPIC_API_KEY").is_err() {
            assert_eq!(build_llm(&config).name(), "offline");
        }
    }
}
