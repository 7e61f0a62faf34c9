//! Price gates and alert construction shared by both detectors.

use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::alert::{Alert, AlertType, Strength};
use crate::domain::id::{AlertId, TenantId};
use crate::domain::snapshot::Snapshot;
use crate::error::Result;
use crate::port::outbound::store::SnapshotStore;

use super::config::{Baseline, Thresholds};

/// Tolerance for threshold comparisons on prices.
pub const EPS: f64 = 1e-9;

/// `value >= threshold`, tolerant of float rounding.
#[must_use]
pub fn at_least(value: f64, threshold: f64) -> bool {
    value + EPS >= threshold
}

/// Size of a qualifying move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Move {
    pub old_price: f64,
    pub new_price: f64,
    pub abs_move: f64,
    pub delta_pct: f64,
}

/// True when the snapshot clears the medium liquidity and volume gate.
#[must_use]
pub fn passes_activity_gate(snapshot: &Snapshot, thresholds: &Thresholds) -> bool {
    snapshot.liquidity >= thresholds.min_liquidity
        && snapshot.volume_24h >= thresholds.min_volume_24h
}

/// Apply the price gates to an `old -> new` pair.
///
/// Rejects non-positive prices, zero moves, moves where both sides sit
/// below `min_price`, and moves that miss either the absolute or the
/// percentage floor.
#[must_use]
pub fn evaluate_move(old_price: f64, new_price: f64, thresholds: &Thresholds) -> Option<Move> {
    if old_price <= 0.0 || new_price <= 0.0 {
        return None;
    }
    if (new_price - old_price).abs() < f64::EPSILON {
        return None;
    }
    if old_price < thresholds.min_price && new_price < thresholds.min_price {
        return None;
    }
    let abs_move = (new_price - old_price).abs();
    if !at_least(abs_move, thresholds.min_abs_move) {
        return None;
    }
    let delta_pct = abs_move / old_price.max(thresholds.floor_price);
    if !at_least(delta_pct, thresholds.min_pct_move) {
        return None;
    }
    Some(Move {
        old_price,
        new_price,
        abs_move,
        delta_pct,
    })
}

/// Standard strength tier: STRONG only when move, liquidity and volume all
/// clear the strict tier.
#[must_use]
pub fn strength_for(stats: &Move, snapshot: &Snapshot, thresholds: &Thresholds) -> Strength {
    if at_least(stats.abs_move, thresholds.strong_abs_move)
        && snapshot.liquidity >= thresholds.strong_min_liquidity
        && snapshot.volume_24h >= thresholds.strong_min_volume_24h
    {
        Strength::Strong
    } else {
        Strength::Medium
    }
}

/// Inclusive start of the lookback window for a snapshot. Anchored on the
/// bucket rather than the wall clock so a pass that runs mid-bucket still
/// sees the previous bucket.
#[must_use]
pub fn window_start(bucket: DateTime<Utc>, minutes: u32) -> DateTime<Utc> {
    bucket - TimeDelta::minutes(i64::from(minutes))
}

/// The prior snapshot the current one is compared against.
pub async fn baseline_snapshot(
    store: &dyn SnapshotStore,
    current: &Snapshot,
    from: DateTime<Utc>,
    baseline: Baseline,
) -> Result<Option<Snapshot>> {
    let mut prior = store.range(&current.contract_id, from, current.bucket_ts).await?;
    Ok(match baseline {
        Baseline::Previous => prior.pop(),
        Baseline::WindowStart => prior.into_iter().next(),
    })
}

/// Build an alert from the current snapshot and a qualifying move.
#[must_use]
pub fn build_alert(
    tenant_id: &TenantId,
    alert_type: AlertType,
    snapshot: &Snapshot,
    stats: &Move,
    strength: Strength,
    now: DateTime<Utc>,
) -> Alert {
    Alert {
        id: AlertId::generate(),
        tenant_id: tenant_id.clone(),
        alert_type,
        contract_id: snapshot.contract_id.clone(),
        title: snapshot.title.clone(),
        category: snapshot.category.clone(),
        slug: snapshot.slug.clone(),
        old_price: stats.old_price,
        new_price: stats.new_price,
        delta_pct: stats.delta_pct,
        liquidity: snapshot.liquidity,
        volume_24h: snapshot.volume_24h,
        best_ask: snapshot.best_ask,
        strength,
        outcome: snapshot.outcome.clone(),
        bucket_ts: snapshot.bucket_ts,
        triggered_at: now,
        created_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_move_never_qualifies() {
        let thresholds = Thresholds::default();
        assert!(evaluate_move(0.40, 0.40, &thresholds).is_none());
    }

    #[test]
    fn near_zero_prices_are_ignored() {
        let thresholds = Thresholds {
            min_abs_move: 0.001,
            min_pct_move: 0.0,
            ..Thresholds::default()
        };
        assert!(evaluate_move(0.010, 0.015, &thresholds).is_none());
        assert!(evaluate_move(0.010, 0.030, &thresholds).is_some());
    }

    #[test]
    fn percentage_uses_floor_price() {
        let thresholds = Thresholds::default();
        let stats = evaluate_move(0.03, 0.06, &thresholds).unwrap();
        assert!((stats.delta_pct - 0.6).abs() < 1e-9);
    }

    #[test]
    fn boundary_moves_survive_float_rounding() {
        let thresholds = Thresholds::default();
        assert!(evaluate_move(0.46, 0.48, &thresholds).is_some());
    }

    #[test]
    fn non_positive_prices_are_rejected() {
        let thresholds = Thresholds::default();
        assert!(evaluate_move(0.0, 0.5, &thresholds).is_none());
    }

    #[test]
    fn window_reaches_back_one_full_bucket() {
        use chrono::TimeZone;
        let bucket = Utc.with_ymd_and_hms(2026, 1, 5, 12, 5, 0).unwrap();
        assert_eq!(
            window_start(bucket, 5),
            Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap()
        );
    }
}
