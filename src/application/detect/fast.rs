//! Fast-signal detector: narrow window, probability band, watch-only output.

use std::collections::HashSet;

use chrono::TimeDelta;
use tracing::{debug, info};

use crate::domain::alert::{Alert, AlertType, Strength};
use crate::domain::snapshot::{PricePoint, Snapshot};
use crate::error::Result;

use super::config::{Baseline, FastSignalConfig};
use super::context::DetectContext;
use super::gate;

/// Points inspected by the consistency check.
const CONSISTENCY_POINTS: usize = 3;

/// MEDIUM when the last three points move monotonically in one direction by
/// at least half the minimum move between each consecutive pair; otherwise
/// LOW. Fewer than three points is LOW.
#[must_use]
pub fn fast_confidence(points: &[PricePoint], min_abs_move: f64) -> Strength {
    if points.len() < CONSISTENCY_POINTS {
        return Strength::Low;
    }
    let last = &points[points.len() - CONSISTENCY_POINTS..];
    let direction = if last[CONSISTENCY_POINTS - 1].price - last[0].price >= 0.0 {
        1.0
    } else {
        -1.0
    };
    let step = min_abs_move * 0.5;
    let consistent = last.windows(2).all(|pair| {
        let delta = pair[1].price - pair[0].price;
        delta * direction > 0.0 && gate::at_least(delta.abs(), step)
    });
    if consistent {
        Strength::Medium
    } else {
        Strength::Low
    }
}

/// Detect fast dislocations over the short window.
///
/// Same gates as [`super::dislocation::detect_dislocations`] plus the
/// probability band. Strength carries the three-point confidence.
pub async fn detect_fast_signals(
    ctx: DetectContext<'_>,
    latest: &[Snapshot],
    config: &FastSignalConfig,
) -> Result<Vec<Alert>> {
    let cooldown_start = ctx.now - TimeDelta::minutes(i64::from(config.cooldown_minutes));
    let thresholds = &config.thresholds;

    let mut seen = HashSet::new();
    let mut alerts = Vec::new();

    for snapshot in latest {
        if ctx.cancel.is_cancelled() {
            info!(emitted = alerts.len(), "fast scan cancelled");
            break;
        }
        if !gate::passes_activity_gate(snapshot, thresholds) {
            continue;
        }
        if seen.contains(&snapshot.contract_id) {
            continue;
        }
        if snapshot.p_yes < config.p_min || snapshot.p_yes > config.p_max {
            continue;
        }

        let window_start = gate::window_start(snapshot.bucket_ts, config.window_minutes);
        let history = ctx
            .snapshots
            .range(&snapshot.contract_id, window_start, snapshot.bucket_ts)
            .await?;
        let prior = match config.baseline {
            Baseline::Previous => history.last(),
            Baseline::WindowStart => history.first(),
        };
        let Some(prior) = prior else {
            continue;
        };
        let Some(stats) = gate::evaluate_move(prior.p_yes, snapshot.p_yes, thresholds) else {
            continue;
        };

        if ctx
            .alerts
            .fired_since(
                ctx.tenant_id,
                AlertType::FastDislocation,
                &snapshot.contract_id,
                cooldown_start,
            )
            .await?
        {
            debug!(contract_id = %snapshot.contract_id, reason = "cooldown", "fast signal skipped");
            continue;
        }

        // The consistency check looks at the last points regardless of the
        // window, which at its default spans a single bucket.
        let mut points: Vec<PricePoint> = ctx
            .snapshots
            .before(&snapshot.contract_id, snapshot.bucket_ts, CONSISTENCY_POINTS - 1)
            .await?
            .iter()
            .rev()
            .map(Snapshot::point)
            .collect();
        points.push(snapshot.point());
        let confidence = fast_confidence(&points, thresholds.min_abs_move);

        debug!(
            contract_id = %snapshot.contract_id,
            delta_pct = stats.delta_pct,
            confidence = %confidence,
            "fast signal detected"
        );
        alerts.push(gate::build_alert(
            ctx.tenant_id,
            AlertType::FastDislocation,
            snapshot,
            &stats,
            confidence,
            ctx.now,
        ));
        seen.insert(snapshot.contract_id.clone());
    }

    Ok(alerts)
}
