//! Signal classification.
//!
//! [`classify`] is the decision table; [`AlertClassifier`] loads history
//! from the snapshot store and runs the table for a batch of alerts.

use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tracing::warn;

use crate::application::detect::gate::at_least;
use crate::domain::alert::Alert;
use crate::domain::classification::{
    AlertClassification, Confidence, SignalType, SuggestedAction,
};
use crate::domain::snapshot::PricePoint;
use crate::error::Result;
use crate::port::outbound::store::SnapshotStore;

use super::behavior::{self, PriceBehavior};
use super::config::ClassifierConfig;
use super::history::load_price_points;

const fn sweep() -> AlertClassification {
    AlertClassification::new(
        SignalType::LiquiditySweep,
        Confidence::Medium,
        SuggestedAction::Wait,
    )
}

/// Classify an alert from its surrounding price history.
#[must_use]
pub fn classify(alert: &Alert, history: &[PricePoint], config: &ClassifierConfig) -> AlertClassification {
    let behavior = behavior::analyze(alert, history, config.medium_abs_move);
    decide(alert, behavior, config)
}

fn decide(alert: &Alert, behavior: PriceBehavior, config: &ClassifierConfig) -> AlertClassification {
    let abs_move = alert.abs_move();
    let large_move = at_least(abs_move, config.strong_abs_move);
    let moderate_move = at_least(abs_move, config.medium_abs_move);

    let high_liquidity = alert.liquidity >= config.strong_liquidity;
    let high_volume = alert.volume_24h >= config.strong_volume_24h;
    let moderate_liquidity = alert.liquidity >= config.moderate_liquidity;
    let moderate_volume = alert.volume_24h >= config.moderate_volume_24h;

    let base_price = alert.old_price.max(alert.new_price);
    let low_base_price =
        base_price > 0.0 && (base_price < config.min_price || base_price < config.floor_price);
    if low_base_price {
        return AlertClassification::noisy();
    }

    let clean = behavior.sustained && !behavior.reversal;
    if clean && high_liquidity && high_volume {
        return AlertClassification::new(
            SignalType::Repricing,
            Confidence::High,
            SuggestedAction::Follow,
        );
    }
    if clean && large_move && moderate_liquidity && moderate_volume {
        return AlertClassification::new(
            SignalType::Repricing,
            Confidence::Medium,
            SuggestedAction::Follow,
        );
    }

    let some_activity = moderate_liquidity || moderate_volume;
    if large_move && (behavior.reversal || !behavior.sustained) {
        return if some_activity {
            sweep()
        } else {
            AlertClassification::noisy()
        };
    }
    if moderate_move && (behavior.reversal || behavior.flatline) {
        return if some_activity {
            sweep()
        } else {
            AlertClassification::noisy()
        };
    }
    if moderate_move && moderate_liquidity && moderate_volume && behavior.sustained {
        return sweep();
    }

    AlertClassification::noisy()
}

/// Loads history and classifies alerts.
pub struct AlertClassifier {
    store: Arc<dyn SnapshotStore>,
    config: ClassifierConfig,
}

impl AlertClassifier {
    pub fn new(store: Arc<dyn SnapshotStore>, config: ClassifierConfig) -> Self {
        Self { store, config }
    }

    #[must_use]
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify one alert against stored history.
    pub async fn classify(&self, alert: &Alert) -> Result<AlertClassification> {
        let history =
            load_price_points(self.store.as_ref(), alert, self.config.history_depth).await?;
        Ok(classify(alert, &history, &self.config))
    }

    /// Classify a batch concurrently, preserving input order.
    ///
    /// A history lookup failure classifies that alert as noisy rather than
    /// failing the batch.
    pub async fn classify_all(&self, alerts: Vec<Alert>) -> Vec<(Alert, AlertClassification)> {
        let concurrency = self.config.concurrency.max(1);
        stream::iter(alerts)
            .map(|alert| async move {
                let classification = match self.classify(&alert).await {
                    Ok(classification) => classification,
                    Err(error) => {
                        warn!(alert_id = %alert.id, error = %error, "classification history unavailable");
                        AlertClassification::noisy()
                    }
                };
                (alert, classification)
            })
            .buffered(concurrency)
            .collect()
            .await
    }
}
