//! Signal speed label attached to copilot context.

use std::fmt;

use serde::Serialize;

use crate::application::detect::gate::at_least;

const FAST_MAX_WINDOW_MINUTES: u32 = 15;
const FAST_MIN_ABS_MOVE: f64 = 0.03;
const FAST_MIN_SUSTAINED: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalSpeed {
    Fast,
    Standard,
}

impl SignalSpeed {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "FAST",
            Self::Standard => "STANDARD",
        }
    }
}

impl fmt::Display for SignalSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `FAST` for short windows with a decent move held over at least two
/// snapshots.
#[must_use]
pub fn signal_speed(window_minutes: u32, abs_move: f64, sustained_snapshots: usize) -> SignalSpeed {
    if window_minutes <= FAST_MAX_WINDOW_MINUTES
        && at_least(abs_move, FAST_MIN_ABS_MOVE)
        && sustained_snapshots >= FAST_MIN_SUSTAINED
    {
        SignalSpeed::Fast
    } else {
        SignalSpeed::Standard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_sustained_moves_are_fast() {
        assert_eq!(signal_speed(5, 0.03, 2), SignalSpeed::Fast);
        assert_eq!(signal_speed(15, 0.05, 3), SignalSpeed::Fast);
    }

    #[test]
    fn long_windows_or_single_points_are_standard() {
        assert_eq!(signal_speed(60, 0.10, 5), SignalSpeed::Standard);
        assert_eq!(signal_speed(5, 0.10, 1), SignalSpeed::Standard);
        assert_eq!(signal_speed(5, 0.02, 4), SignalSpeed::Standard);
    }
}
