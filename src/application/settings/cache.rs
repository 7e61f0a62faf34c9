//! Key-value cache in front of the settings resolver.
//!
//! Cache read and write failures are logged and otherwise ignored: the
//! resolver is pure, so a miss only costs a recomputation.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::keyspace;
use crate::domain::id::UserId;
use crate::domain::settings::EffectiveSettings;
use crate::domain::user::UserProfile;
use crate::error::Result;
use crate::port::outbound::kv::KeyValueStore;

use super::config::SettingsConfig;
use super::resolve::resolve_for_user;

/// Resolves effective settings per user, caching the result.
pub struct SettingsService {
    kv: Arc<dyn KeyValueStore>,
    config: SettingsConfig,
}

impl SettingsService {
    pub fn new(kv: Arc<dyn KeyValueStore>, config: SettingsConfig) -> Self {
        Self { kv, config }
    }

    #[must_use]
    pub fn defaults(&self) -> &EffectiveSettings {
        &self.config.defaults
    }

    /// Cached settings for `user`, resolving and storing them on a miss.
    pub async fn effective_for(&self, user: &UserProfile) -> EffectiveSettings {
        let key = keyspace::effective_settings(&user.id);
        match self.kv.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<EffectiveSettings>(&raw) {
                Ok(settings) => return settings,
                Err(error) => debug!(user_id = %user.id, error = %error, "stale settings cache entry"),
            },
            Ok(None) => {}
            Err(error) => warn!(user_id = %user.id, error = %error, "settings cache read failed"),
        }

        let settings = resolve_for_user(&self.config.defaults, user);
        if let Err(error) = self.store(&key, &settings).await {
            warn!(user_id = %user.id, error = %error, "settings cache write failed");
        }
        settings
    }

    async fn store(&self, key: &str, settings: &EffectiveSettings) -> Result<()> {
        let raw = serde_json::to_string(settings)?;
        self.kv.set(key, &raw, Some(self.config.cache_ttl())).await
    }

    /// Drop the cached entry so the next read resolves afresh.
    pub async fn invalidate(&self, user: &UserId) -> Result<()> {
        self.kv.delete(&keyspace::effective_settings(user)).await?;
        Ok(())
    }
}
