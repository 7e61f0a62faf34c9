use std::time::Duration;

use serde::Deserialize;

use crate::domain::settings::EffectiveSettings;

/// `[settings]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SettingsConfig {
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,
    /// Code defaults every user starts from.
    #[serde(default)]
    pub defaults: EffectiveSettings,
}

const fn default_cache_ttl_seconds() -> u64 {
    600
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: default_cache_ttl_seconds(),
            defaults: EffectiveSettings::default(),
        }
    }
}

impl SettingsConfig {
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}
