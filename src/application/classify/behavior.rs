//! Shape of the price path after an alert fired.

use crate::application::detect::gate::at_least;
use crate::domain::alert::Alert;
use crate::domain::snapshot::PricePoint;

/// Minimum history for any behaviour flag to be set.
const MIN_POINTS: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriceBehavior {
    /// Two consecutive deltas in the alert's direction, each past the floor.
    pub sustained: bool,
    /// A delta against the direction past the floor, or a snap back to
    /// within the floor of the pre-move price.
    pub reversal: bool,
    /// Every delta below the floor.
    pub flatline: bool,
}

fn matches_direction(delta: f64, direction: f64, floor: f64) -> bool {
    delta * direction > 0.0 && at_least(delta.abs(), floor)
}

/// Inspect the points at and after the trigger bucket.
#[must_use]
pub fn analyze(alert: &Alert, points: &[PricePoint], floor: f64) -> PriceBehavior {
    if points.len() < MIN_POINTS {
        return PriceBehavior::default();
    }
    let direction = alert.direction();
    let anchor = points
        .iter()
        .enumerate()
        .min_by_key(|(_, p)| (p.bucket_ts - alert.bucket_ts).num_seconds().abs())
        .map_or(0, |(i, _)| i);
    let post = &points[anchor..];
    let deltas: Vec<f64> = post.windows(2).map(|w| w[1].price - w[0].price).collect();

    let sustained = deltas.windows(2).any(|pair| {
        matches_direction(pair[0], direction, floor) && matches_direction(pair[1], direction, floor)
    });
    let against = deltas
        .iter()
        .any(|d| matches_direction(*d, -direction, floor));
    let snapback = post
        .iter()
        .skip(1)
        .any(|p| !at_least((p.price - alert.old_price).abs(), floor));
    let flatline = !deltas.is_empty() && deltas.iter().all(|d| !at_least(d.abs(), floor));

    PriceBehavior {
        sustained,
        reversal: against || snapback,
        flatline,
    }
}

/// Trailing streak of moves in `direction`: `(snapshots, minutes)`.
///
/// A history without any qualifying delta reports a single snapshot over
/// zero minutes.
#[must_use]
pub fn sustained_streak(points: &[PricePoint], direction: f64) -> (usize, i64) {
    let deltas = points
        .windows(2)
        .rev()
        .take_while(|w| (w[1].price - w[0].price) * direction > 0.0)
        .count();
    if deltas == 0 {
        return (1, 0);
    }
    let start = points.len() - 1 - deltas;
    let minutes = (points[points.len() - 1].bucket_ts - points[start].bucket_ts).num_minutes();
    (deltas + 1, minutes)
}

/// Minutes spanned by the history.
#[must_use]
pub fn span_minutes(points: &[PricePoint]) -> i64 {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) => (last.bucket_ts - first.bucket_ts).num_minutes(),
        _ => 0,
    }
}
