//! Consecutive-failure circuit breaker with a single half-open trial.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{error, info};

/// Observable breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, Copy)]
enum Inner {
    Closed { failures: u32 },
    Open { until: Instant },
    /// Cooldown elapsed; one trial call is in flight.
    HalfOpen,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    service: &'static str,
    threshold: u32,
    cooldown: Duration,
    state: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(service: &'static str, threshold: u32, cooldown: Duration) -> Self {
        Self {
            service,
            threshold: threshold.max(1),
            cooldown,
            state: Mutex::new(Inner::Closed { failures: 0 }),
        }
    }

    #[must_use]
    pub fn service(&self) -> &'static str {
        self.service
    }

    #[must_use]
    pub fn state(&self) -> BreakerState {
        match *self.state.lock() {
            Inner::Closed { .. } => BreakerState::Closed,
            Inner::Open { until } if Instant::now() >= until => BreakerState::HalfOpen,
            Inner::Open { .. } => BreakerState::Open,
            Inner::HalfOpen => BreakerState::HalfOpen,
        }
    }

    /// Whether a call may go out now. After the cooldown exactly one caller
    /// is admitted as the half-open trial; the rest are refused until the
    /// trial reports back.
    pub fn try_acquire(&self) -> bool {
        let mut state = self.state.lock();
        match *state {
            Inner::Closed { .. } => true,
            Inner::Open { until } if Instant::now() >= until => {
                info!(service = self.service, "circuit half-open, admitting trial call");
                *state = Inner::HalfOpen;
                true
            }
            Inner::Open { .. } | Inner::HalfOpen => false,
        }
    }

    pub fn record_success(&self) {
        let mut state = self.state.lock();
        if matches!(*state, Inner::HalfOpen) {
            info!(service = self.service, "circuit closed after successful trial call");
        }
        *state = Inner::Closed { failures: 0 };
    }

    pub fn record_failure(&self) {
        let mut state = self.state.lock();
        let next = match *state {
            Inner::Closed { failures } if failures + 1 < self.threshold => Inner::Closed {
                failures: failures + 1,
            },
            Inner::Open { until } => Inner::Open { until },
            Inner::Closed { .. } | Inner::HalfOpen => {
                error!(
                    service = self.service,
                    cooldown_ms = self.cooldown.as_millis() as u64,
                    "circuit breaker tripped"
                );
                Inner::Open {
                    until: Instant::now() + self.cooldown,
                }
            }
        };
        *state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn opens_after_threshold_and_admits_a_trial_after_cooldown() {
        let breaker = CircuitBreaker::new("llm", 3, Duration::from_secs(30));
        for _ in 0..2 {
            assert!(breaker.try_acquire());
            breaker.record_failure();
        }
        assert_eq!(breaker.state(), BreakerState::Closed);
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Open);
        assert!(!breaker.try_acquire());

        tokio::time::advance(Duration::from_secs(31)).await;
        assert!(breaker.try_acquire());
        assert!(!breaker.try_acquire(), "only one trial call while half-open");

        breaker.record_success();
        assert_eq!(breaker.state(), BreakerState::Closed);
        assert!(breaker.try_acquire());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_trial_reopens() {
        let breaker = CircuitBreaker::new("telegram", 1, Duration::from_secs(10));
        breaker.record_failure();
        tokio::time::advance(Duration::from_secs(11)).await;
        assert!(breaker.try_acquire());
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Open);
        assert!(!breaker.try_acquire());
    }

    #[test]
    fn success_resets_failure_count() {
        let breaker = CircuitBreaker::new("llm", 2, Duration::from_secs(10));
        breaker.record_failure();
        breaker.record_success();
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Closed);
    }
}
