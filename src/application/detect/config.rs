//! Detector thresholds and windows.
//!
//! The numbers here are tuning values, not part of the algorithm. Every one
//! of them can be overridden from `[detector]` and `[fast]` in the config
//! file.

use serde::{Deserialize, Deserializer};

/// Which prior snapshot the new price is compared against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Baseline {
    /// Most recent snapshot strictly before the current bucket.
    #[default]
    Previous,
    /// Earliest snapshot inside the window.
    WindowStart,
}

/// Gates shared by both detectors.
#[derive(Debug, Clone, Deserialize)]
pub struct Thresholds {
    /// Medium gate: contracts below this liquidity are skipped.
    #[serde(default = "default_min_liquidity")]
    pub min_liquidity: f64,
    #[serde(default = "default_min_volume")]
    pub min_volume_24h: f64,
    #[serde(default = "default_min_abs_move")]
    pub min_abs_move: f64,
    /// Minimum move as a fraction of `max(old_price, floor_price)`.
    #[serde(default = "default_min_pct_move")]
    pub min_pct_move: f64,
    #[serde(default = "default_strong_abs_move")]
    pub strong_abs_move: f64,
    #[serde(default = "default_strong_liquidity")]
    pub strong_min_liquidity: f64,
    #[serde(default = "default_strong_volume")]
    pub strong_min_volume_24h: f64,
    /// Moves where both prices sit below this are ignored.
    #[serde(default = "default_min_price")]
    pub min_price: f64,
    /// Denominator floor for the percentage move.
    #[serde(default = "default_floor_price")]
    pub floor_price: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_liquidity: default_min_liquidity(),
            min_volume_24h: default_min_volume(),
            min_abs_move: default_min_abs_move(),
            min_pct_move: default_min_pct_move(),
            strong_abs_move: default_strong_abs_move(),
            strong_min_liquidity: default_strong_liquidity(),
            strong_min_volume_24h: default_strong_volume(),
            min_price: default_min_price(),
            floor_price: default_floor_price(),
        }
    }
}

/// `[detector]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct DislocationConfig {
    #[serde(default = "default_window_minutes")]
    pub window_minutes: u32,
    #[serde(default = "default_cooldown_minutes")]
    pub cooldown_minutes: u32,
    #[serde(default)]
    pub baseline: Baseline,
    #[serde(default)]
    pub thresholds: Thresholds,
}

impl Default for DislocationConfig {
    fn default() -> Self {
        Self {
            window_minutes: default_window_minutes(),
            cooldown_minutes: default_cooldown_minutes(),
            baseline: Baseline::default(),
            thresholds: Thresholds::default(),
        }
    }
}

/// `[fast]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct FastSignalConfig {
    #[serde(default = "default_fast_window_minutes")]
    pub window_minutes: u32,
    #[serde(default = "default_fast_cooldown_minutes")]
    pub cooldown_minutes: u32,
    #[serde(default)]
    pub baseline: Baseline,
    /// Probability band; contracts priced outside are near-certain.
    #[serde(default = "default_fast_p_min")]
    pub p_min: f64,
    #[serde(default = "default_fast_p_max")]
    pub p_max: f64,
    /// Keys missing from `[fast.thresholds]` take the fast defaults, not the
    /// standard ones.
    #[serde(
        default = "default_fast_thresholds",
        deserialize_with = "fast_thresholds"
    )]
    pub thresholds: Thresholds,
}

impl Default for FastSignalConfig {
    fn default() -> Self {
        Self {
            window_minutes: default_fast_window_minutes(),
            cooldown_minutes: default_fast_cooldown_minutes(),
            baseline: Baseline::default(),
            p_min: default_fast_p_min(),
            p_max: default_fast_p_max(),
            thresholds: default_fast_thresholds(),
        }
    }
}

const fn default_min_liquidity() -> f64 {
    1000.0
}

const fn default_min_volume() -> f64 {
    1000.0
}

const fn default_min_abs_move() -> f64 {
    0.02
}

const fn default_min_pct_move() -> f64 {
    0.03
}

const fn default_strong_abs_move() -> f64 {
    0.05
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

const fn default_window_minutes() -> u32 {
    60
}

const fn default_cooldown_minutes() -> u32 {
    30
}

const fn default_fast_window_minutes() -> u32 {
    5
}

const fn default_fast_cooldown_minutes() -> u32 {
    15
}

const fn default_fast_p_min() -> f64 {
    0.10
}

const fn default_fast_p_max() -> f64 {
    0.90
}

fn default_fast_thresholds() -> Thresholds {
    Thresholds {
        min_abs_move: 0.01,
        min_pct_move: 0.02,
        ..Thresholds::default()
    }
}

/// `[fast.thresholds]` as written, before defaults are applied.
#[derive(Debug, Default, Deserialize)]
struct ThresholdOverrides {
    min_liquidity: Option<f64>,
    min_volume_24h: Option<f64>,
    min_abs_move: Option<f64>,
    min_pct_move: Option<f64>,
    strong_abs_move: Option<f64>,
    strong_min_liquidity: Option<f64>,
    strong_min_volume_24h: Option<f64>,
    min_price: Option<f64>,
    floor_price: Option<f64>,
}

impl ThresholdOverrides {
    fn over(self, base: Thresholds) -> Thresholds {
        Thresholds {
            min_liquidity: self.min_liquidity.unwrap_or(base.min_liquidity),
            min_volume_24h: self.min_volume_24h.unwrap_or(base.min_volume_24h),
            min_abs_move: self.min_abs_move.unwrap_or(base.min_abs_move),
            min_pct_move: self.min_pct_move.unwrap_or(base.min_pct_move),
            strong_abs_move: self.strong_abs_move.unwrap_or(base.strong_abs_move),
            strong_min_liquidity: self.strong_min_liquidity.unwrap_or(base.strong_min_liquidity),
            strong_min_volume_24h: self
                .strong_min_volume_24h
                .unwrap_or(base.strong_min_volume_24h),
            min_price: self.min_price.unwrap_or(base.min_price),
            floor_price: self.floor_price.unwrap_or(base.floor_price),
        }
    }
}

fn fast_thresholds<'de, D>(deserializer: D) -> Result<Thresholds, D::Error>
where
    D: Deserializer<'de>,
{
    ThresholdOverrides::deserialize(deserializer).map(|o| o.over(default_fast_thresholds()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sections_take_defaults() {
        let config: DislocationConfig = toml::from_str("").unwrap();
        assert_eq!(config.window_minutes, 60);
        assert_eq!(config.cooldown_minutes, 30);
        assert_eq!(config.baseline, Baseline::Previous);
        assert!((config.thresholds.floor_price - 0.05).abs() < 1e-12);
    }

    #[test]
    fn baseline_and_nested_thresholds_parse() {
        let config: FastSignalConfig = toml::from_str(
            r#"
            baseline = "window_start"
            p_min = 0.2

            [thresholds]
            min_liquidity = 250
            "#,
        )
        .unwrap();
        assert_eq!(config.baseline, Baseline::WindowStart);
        assert!((config.p_min - 0.2).abs() < 1e-12);
        assert!((config.thresholds.min_liquidity - 250.0).abs() < 1e-12);
        assert!((config.thresholds.min_abs_move - 0.01).abs() < 1e-12);
        assert!((config.thresholds.min_pct_move - 0.02).abs() < 1e-12);
        assert!((config.thresholds.floor_price - 0.05).abs() < 1e-12);
    }

    #[test]
    fn standard_thresholds_keep_their_own_defaults() {
        let config: DislocationConfig = toml::from_str(
            r#"
            [thresholds]
            min_liquidity = 250
            "#,
        )
        .unwrap();
        assert!((config.thresholds.min_abs_move - 0.02).abs() < 1e-12);
    }
}
