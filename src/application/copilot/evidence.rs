//! Evidence lines built from a short snapshot history.

use serde::Serialize;

use crate::application::classify::behavior::{span_minutes, sustained_streak};
use crate::application::classify::speed::{signal_speed, SignalSpeed};
use crate::application::format::{abs_move, compact_move, usd, Descriptors};
use crate::domain::alert::Alert;
use crate::domain::snapshot::PricePoint;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evidence {
    pub lines: Vec<String>,
    /// History points the lines were built from.
    pub points: usize,
    pub streak_snapshots: usize,
    pub streak_minutes: i64,
    pub span_minutes: i64,
    pub speed: SignalSpeed,
}

/// Fraction of the alert's move given back by the last snapshot, if the
/// last delta runs against the alert.
fn last_retrace(alert: &Alert, points: &[PricePoint]) -> Option<f64> {
    let [.., prev, last] = points else {
        return None;
    };
    let delta = last.price - prev.price;
    if delta * alert.direction() >= 0.0 || alert.abs_move() <= 0.0 {
        return None;
    }
    Some(delta.abs() / alert.abs_move())
}

/// Gather the evidence shown to the user and passed to the completion
/// service.
#[must_use]
pub fn gather(
    alert: &Alert,
    points: &[PricePoint],
    window_minutes: u32,
    descriptors: &Descriptors,
) -> Evidence {
    let (streak_snapshots, streak_minutes) = sustained_streak(points, alert.direction());
    let span = span_minutes(points);
    let speed = signal_speed(window_minutes, alert.abs_move(), streak_snapshots);

    let mut lines = Vec::with_capacity(4);
    lines.push(format!(
        "Sustained move across {streak_snapshots} snapshots ({streak_minutes}m)"
    ));
    lines.push(format!(
        "Abs move: {} | pct: {} ({window_minutes}m)",
        abs_move(alert),
        compact_move(alert)
    ));
    lines.push(format!(
        "Liquidity: {} ({}) | Vol24h: {} ({})",
        descriptors.liquidity(alert.liquidity),
        usd(alert.liquidity),
        descriptors.volume(alert.volume_24h),
        usd(alert.volume_24h),
    ));
    match last_retrace(alert, points) {
        Some(fraction) => lines.push(format!(
            "Reversal risk: last snapshot retraced {:.1}%",
            fraction * 100.0
        )),
        None => lines.push(format!("No reversal observed in last {span}m")),
    }

    Evidence {
        lines,
        points: points.len(),
        streak_snapshots,
        streak_minutes,
        span_minutes: span,
        speed,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::testkit::domain::alert_at;

    fn t(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 5, 12, minute, 0).unwrap()
    }

    fn series(prices: &[f64]) -> Vec<PricePoint> {
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| PricePoint::new(t(i as u32 * 5), *p))
            .collect()
    }

    #[test]
    fn steady_climb_reports_streak_and_no_reversal() {
        let mut alert = alert_at("c", t(5), 0.40, 0.44);
        alert.delta_pct = 0.1;
        alert.volume_24h = 7000.0;
        let evidence = gather(
            &alert,
            &series(&[0.40, 0.42, 0.44, 0.46]),
            60,
            &Descriptors::default(),
        );
        assert_eq!(evidence.streak_snapshots, 4);
        assert_eq!(evidence.lines[0], "Sustained move across 4 snapshots (15m)");
        assert_eq!(evidence.lines[1], "Abs move: +0.040 | pct: +10.0% (60m)");
        assert_eq!(
            evidence.lines[2],
            "Liquidity: High ($6,000) | Vol24h: High ($7,000)"
        );
        assert_eq!(evidence.lines[3], "No reversal observed in last 15m");
        assert_eq!(evidence.speed, SignalSpeed::Standard);
    }

    #[test]
    fn pullback_reports_retrace() {
        let alert = alert_at("c", t(5), 0.40, 0.50);
        let evidence = gather(
            &alert,
            &series(&[0.40, 0.50, 0.46]),
            5,
            &Descriptors::default(),
        );
        assert_eq!(evidence.lines[3], "Reversal risk: last snapshot retraced 40.0%");
        assert_eq!(evidence.streak_snapshots, 1);
    }
}
