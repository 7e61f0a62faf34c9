//! Standard dislocation detector.

use std::collections::HashSet;

use chrono::TimeDelta;
use tracing::{debug, info};

use crate::domain::alert::{Alert, AlertType};
use crate::domain::snapshot::Snapshot;
use crate::error::Result;

use super::config::DislocationConfig;
use super::context::DetectContext;
use super::gate;

/// Compare each latest snapshot against its baseline inside the window and
/// emit one alert per qualifying contract.
///
/// Side-effect free: the caller persists the returned alerts. The first
/// snapshot of a contract in the batch wins; later duplicates are ignored.
pub async fn detect_dislocations(
    ctx: DetectContext<'_>,
    latest: &[Snapshot],
    config: &DislocationConfig,
) -> Result<Vec<Alert>> {
    let cooldown_start = ctx.now - TimeDelta::minutes(i64::from(config.cooldown_minutes));
    let thresholds = &config.thresholds;

    let mut seen = HashSet::new();
    let mut alerts = Vec::new();

    for snapshot in latest {
        if ctx.cancel.is_cancelled() {
            info!(emitted = alerts.len(), "dislocation scan cancelled");
            break;
        }
        if !gate::passes_activity_gate(snapshot, thresholds) {
            continue;
        }
        if !seen.insert(snapshot.contract_id.clone()) {
            continue;
        }

        let window_start = gate::window_start(snapshot.bucket_ts, config.window_minutes);
        let Some(prior) =
            gate::baseline_snapshot(ctx.snapshots, snapshot, window_start, config.baseline).await?
        else {
            continue;
        };
        let Some(stats) = gate::evaluate_move(prior.p_yes, snapshot.p_yes, thresholds) else {
            continue;
        };

        if ctx
            .alerts
            .fired_since(
                ctx.tenant_id,
                AlertType::StandardDislocation,
                &snapshot.contract_id,
                cooldown_start,
            )
            .await?
        {
            debug!(contract_id = %snapshot.contract_id, reason = "cooldown", "dislocation skipped");
            continue;
        }

        let strength = gate::strength_for(&stats, snapshot, thresholds);
        debug!(
            contract_id = %snapshot.contract_id,
            old = stats.old_price,
            new = stats.new_price,
            strength = %strength,
            "dislocation detected"
        );
        alerts.push(gate::build_alert(
            ctx.tenant_id,
            AlertType::StandardDislocation,
            snapshot,
            &stats,
            strength,
            ctx.now,
        ));
    }

    Ok(alerts)
}
