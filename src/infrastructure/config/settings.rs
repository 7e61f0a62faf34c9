//! Main application configuration.
//!
//! Every section is optional; an empty file yields the built-in defaults.
//! Secrets never live here. They are read from the environment when the
//! adapters are built.

use std::path::Path;

use serde::Deserialize;

use super::feed::FeedConfig;
use super::llm::LlmConfig;
use super::logging::LoggingConfig;
use super::telegram::TelegramAppConfig;
use crate::adapter::outbound::guard::config::GuardConfig;
use crate::application::classify::config::ClassifierConfig;
use crate::application::copilot::config::CopilotConfig;
use crate::application::detect::config::{DislocationConfig, FastSignalConfig, Thresholds};
use crate::application::digest::config::DigestConfig;
use crate::application::pipeline::config::SchedulerConfig;
use crate::application::settings::config::SettingsConfig;
use crate::domain::user::UserProfile;
use crate::error::{ConfigError, Result};

/// `[guard.llm]` and `[guard.messenger]`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GuardSection {
    #[serde(default)]
    pub llm: GuardConfig,
    #[serde(default)]
    pub messenger: GuardConfig,
}

/// Application configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Standard dislocation detector.
    #[serde(default)]
    pub detector: DislocationConfig,

    /// Fast-signal detector.
    #[serde(default)]
    pub fast: FastSignalConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Settings cache and code defaults.
    #[serde(default)]
    pub settings: SettingsConfig,

    #[serde(default)]
    pub digest: DigestConfig,

    #[serde(default)]
    pub copilot: CopilotConfig,

    #[serde(default)]
    pub guard: GuardSection,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub telegram: TelegramAppConfig,

    #[serde(default)]
    pub feed: FeedConfig,

    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database: String,

    /// Static user directory.
    #[serde(default)]
    pub users: Vec<UserProfile>,
}

fn default_database_path() -> String {
    "pmd.db".to_string()
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
}

fn check_probability(field: &'static str, value: f64) -> std::result::Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, "must be between 0 and 1"))
    }
}

fn check_band(
    field: &'static str,
    p_min: f64,
    p_max: f64,
) -> std::result::Result<(), ConfigError> {
    check_probability(field, p_min)?;
    check_probability(field, p_max)?;
    if p_min < p_max {
        Ok(())
    } else {
        Err(invalid(field, format!("p_min ({p_min}) must be below p_max ({p_max})")))
    }
}

fn check_thresholds(
    section: &'static str,
    thresholds: &Thresholds,
) -> std::result::Result<(), ConfigError> {
    let values = [
        ("min_liquidity", thresholds.min_liquidity),
        ("min_volume_24h", thresholds.min_volume_24h),
        ("min_abs_move", thresholds.min_abs_move),
        ("min_pct_move", thresholds.min_pct_move),
        ("strong_abs_move", thresholds.strong_abs_move),
        ("strong_min_liquidity", thresholds.strong_min_liquidity),
        ("strong_min_volume_24h", thresholds.strong_min_volume_24h),
        ("min_price", thresholds.min_price),
        ("floor_price", thresholds.floor_price),
    ];
    for (name, value) in values {
        if !value.is_finite() || value < 0.0 {
            return Err(invalid(
                "thresholds",
                format!("[{section}] {name} must be a non-negative number"),
            ));
        }
    }
    if thresholds.floor_price <= 0.0 {
        return Err(invalid(
            "floor_price",
            format!("[{section}] must be greater than 0"),
        ));
    }
    Ok(())
}

impl Config {
    /// Parse and validate configuration from TOML content.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Check value ranges and cross-field constraints.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        let scheduler = &self.scheduler;
        if scheduler.interval_seconds == 0 {
            return Err(invalid("interval_seconds", "must be greater than 0").into());
        }
        if scheduler.lock_ttl_seconds < scheduler.interval_seconds.saturating_mul(2) {
            return Err(invalid(
                "lock_ttl_seconds",
                format!(
                    "must be at least twice interval_seconds ({})",
                    scheduler.interval_seconds
                ),
            )
            .into());
        }

        if self.detector.window_minutes == 0 {
            return Err(invalid("window_minutes", "[detector] must be greater than 0").into());
        }
        if self.fast.window_minutes == 0 {
            return Err(invalid("window_minutes", "[fast] must be greater than 0").into());
        }
        check_thresholds("detector", &self.detector.thresholds)?;
        check_thresholds("fast", &self.fast.thresholds)?;
        check_band("fast", self.fast.p_min, self.fast.p_max)?;

        let defaults = &self.settings.defaults;
        check_band("settings.defaults", defaults.p_min, defaults.p_max)?;
        check_band("settings.defaults.fast", defaults.fast_p_min, defaults.fast_p_max)?;
        check_probability("max_liquidity_fraction", defaults.max_liquidity_fraction)?;

        if self.classifier.floor_price <= 0.0 {
            return Err(invalid("floor_price", "[classifier] must be greater than 0").into());
        }

        self.guard.llm.validate("guard.llm")?;
        self.guard.messenger.validate("guard.messenger")?;

        self.digest
            .market_base()
            .map_err(|e| invalid("market_base_url", e.to_string()))?;

        if self.database.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "database" }.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::detect::config::Baseline;
    use crate::error::Error;

    fn invalid_field(content: &str) -> &'static str {
        match Config::parse_toml(content) {
            Err(Error::Config(ConfigError::InvalidValue { field, .. })) => field,
            other => panic!("expected invalid value, got {other:?}"),
        }
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::parse_toml("").unwrap();
        assert_eq!(config.scheduler.interval_seconds, 300);
        assert_eq!(config.detector.window_minutes, 60);
        assert_eq!(config.detector.cooldown_minutes, 30);
        assert_eq!(config.detector.baseline, Baseline::Previous);
        assert_eq!(config.fast.window_minutes, 5);
        assert_eq!(config.database, "pmd.db");
        assert!(config.users.is_empty());
        assert!(!config.telegram.enabled);
    }

    #[test]
    fn parses_users_with_overrides() {
        let config = Config::parse_toml(
            r#"
            [[users]]
            id = "u1"
            chat_id = 42
            plan = "elite"

            [users.overrides]
            max_themes_per_digest = "2"
            allowed_strengths = "strong,medium"
            "#,
        )
        .unwrap();
        let user = &config.users[0];
        assert_eq!(user.id.as_str(), "u1");
        assert_eq!(user.chat_id, 42);
        assert_eq!(user.plan, "elite");
        let overrides = user.overrides.as_ref().unwrap();
        assert_eq!(overrides["max_themes_per_digest"], "2");
    }

    #[test]
    fn lock_ttl_must_cover_two_intervals() {
        let field = invalid_field("[scheduler]\ninterval_seconds = 300\nlock_ttl_seconds = 400");
        assert_eq!(field, "lock_ttl_seconds");
    }

    #[test]
    fn inverted_fast_band_is_rejected() {
        assert_eq!(invalid_field("[fast]\np_min = 0.9\np_max = 0.1"), "fast");
    }

    #[test]
    fn negative_threshold_is_rejected() {
        let field = invalid_field("[detector.thresholds]\nmin_abs_move = -0.1");
        assert_eq!(field, "thresholds");
    }

    #[test]
    fn guard_needs_an_attempt() {
        assert_eq!(invalid_field("[guard.llm]\nmax_attempts = 0"), "max_attempts");
    }

    #[test]
    fn market_link_base_must_be_a_url() {
        let field = invalid_field("[digest]\nmarket_base_url = \"not a url\"");
        assert_eq!(field, "market_base_url");
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            Config::parse_toml("[scheduler"),
            Err(Error::Config(ConfigError::Parse(_)))
        ));
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "database = \"other.db\"\n").unwrap();
        assert_eq!(Config::load(&path).unwrap().database, "other.db");
        assert!(matches!(
            Config::load(dir.path().join("missing.toml")),
            Err(Error::Config(ConfigError::ReadFile(_)))
        ));
    }
}
