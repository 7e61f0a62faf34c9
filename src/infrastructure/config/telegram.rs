//! Telegram delivery configuration.
//!
//! The bot token comes from `TELEGRAM_BOT_TOKEN`.

use serde::Deserialize;

const fn default_true() -> bool {
    true
}

/// `[telegram]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TelegramAppConfig {
    /// Deliver digests and copilot messages through Telegram. When off,
    /// messages are written to the log.
    #[serde(default)]
    pub enabled: bool,
    /// Listen for inline-button callbacks while `pmd run` is active.
    #[serde(default = "default_true")]
    pub listen_callbacks: bool,
}

impl Default for TelegramAppConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_callbacks: default_true(),
        }
    }
}
