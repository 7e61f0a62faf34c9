//! Classifier tiers.

use serde::Deserialize;

/// `[classifier]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// Snapshots loaded on each side of the trigger bucket.
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,
    /// Move floor for a single delta, and the moderate move tier.
    #[serde(default = "default_medium_abs_move")]
    pub medium_abs_move: f64,
    #[serde(default = "default_strong_abs_move")]
    pub strong_abs_move: f64,
    #[serde(default = "default_moderate_liquidity")]
    pub moderate_liquidity: f64,
    #[serde(default = "default_moderate_volume")]
    pub moderate_volume_24h: f64,
    #[serde(default = "default_strong_liquidity")]
    pub strong_liquidity: f64,
    #[serde(default = "default_strong_volume")]
    pub strong_volume_24h: f64,
    #[serde(default = "default_min_price")]
    pub min_price: f64,
    #[serde(default = "default_floor_price")]
    pub floor_price: f64,
    /// Alerts classified concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            history_depth: default_history_depth(),
            medium_abs_move: default_medium_abs_move(),
            strong_abs_move: default_strong_abs_move(),
            moderate_liquidity: default_moderate_liquidity(),
            moderate_volume_24h: default_moderate_volume(),
            strong_liquidity: default_strong_liquidity(),
            strong_volume_24h: default_strong_volume(),
            min_price: default_min_price(),
            floor_price: default_floor_price(),
            concurrency: default_concurrency(),
        }
    }
}

const fn default_history_depth() -> usize {
    5
}

const fn default_medium_abs_move() -> f64 {
    0.02
}

const fn default_strong_abs_move() -> f64 {
    0.05
}

const fn default_moderate_liquidity() -> f64 {
    1000.0
}

const fn default_moderate_volume() -> f64 {
    1000.0
}

const fn default_strong_liquidity() -> f64 {
    5000.0
}

const fn default_strong_volume() -> f64 {
    5000.0
}

const fn default_min_price() -> f64 {
    0.02
}

const fn default_floor_price() -> f64 {
    0.05
}

const fn default_concurrency() -> usize {
    8
}
