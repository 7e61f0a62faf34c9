//! Guard configuration (`[guard.llm]`, `[guard.messenger]`).

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GuardConfig {
    /// Consecutive failed calls before the breaker opens.
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    /// Time the breaker stays open before admitting a half-open trial.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Attempts per call, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Upper bound on a single attempt.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

const fn default_failure_threshold() -> u32 {
    5
}

const fn default_cooldown_ms() -> u64 {
    30_000
}

const fn default_max_concurrency() -> usize {
    4
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_initial_delay_ms() -> u64 {
    250
}

const fn default_max_delay_ms() -> u64 {
    4_000
}

const fn default_backoff_multiplier() -> f64 {
    2.0
}

const fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            cooldown_ms: default_cooldown_ms(),
            max_concurrency: default_max_concurrency(),
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl GuardConfig {
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(1))
    }

    pub fn validate(&self, section: &'static str) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_attempts",
                reason: format!("[{section}] must be at least 1"),
            });
        }
        if self.failure_threshold == 0 {
            return Err(ConfigError::InvalidValue {
                field: "failure_threshold",
                reason: format!("[{section}] must be at least 1"),
            });
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_concurrency",
                reason: format!("[{section}] must be at least 1"),
            });
        }
        if self.max_delay_ms < self.initial_delay_ms {
            return Err(ConfigError::InvalidValue {
                field: "max_delay_ms",
                reason: format!("[{section}] must be >= initial_delay_ms"),
            });
        }
        if self.backoff_multiplier < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "backoff_multiplier",
                reason: format!("[{section}] must be >= 1.0"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_attempts_is_rejected() {
        let config = GuardConfig {
            max_attempts: 0,
            ..GuardConfig::default()
        };
        let err = config.validate("guard.llm").unwrap_err();
        assert!(err.to_string().contains("max_attempts"));
        assert!(GuardConfig::default().validate("guard.llm").is_ok());
    }

    #[test]
    fn partial_section_fills_defaults() {
        let config: GuardConfig = toml::from_str("failure_threshold = 2").unwrap();
        assert_eq!(config.failure_threshold, 2);
        assert_eq!(config.max_attempts, 3);
    }
}
