//! Breaker, concurrency limit, timeout and retry around one external
//! dependency.

use std::future::Future;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoffBuilder;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::breaker::CircuitBreaker;
use super::config::GuardConfig;
use crate::error::{GuardError, Result};

pub struct CallGuard {
    service: &'static str,
    breaker: CircuitBreaker,
    permits: Semaphore,
    config: GuardConfig,
}

impl CallGuard {
    pub fn new(service: &'static str, config: GuardConfig) -> Self {
        Self {
            service,
            breaker: CircuitBreaker::new(service, config.failure_threshold, config.cooldown()),
            permits: Semaphore::new(config.max_concurrency.max(1)),
            config,
        }
    }

    #[must_use]
    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Run `op` with up to `max_attempts` tries.
    ///
    /// An open breaker fails fast with [`GuardError::CircuitOpen`] before any
    /// attempt is made. Each attempt is bounded by the timeout and counts
    /// toward the breaker.
    pub async fn call<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let open = GuardError::CircuitOpen {
            service: self.service,
        };
        let Ok(_permit) = self.permits.acquire().await else {
            return Err(open.into());
        };

        let mut backoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(std::time::Duration::from_millis(self.config.initial_delay_ms))
            .with_max_interval(std::time::Duration::from_millis(self.config.max_delay_ms))
            .with_multiplier(self.config.backoff_multiplier)
            .with_randomization_factor(0.2)
            .with_max_elapsed_time(None)
            .build();

        let attempts = self.config.max_attempts.max(1);
        let mut last_error = String::new();
        for attempt in 1..=attempts {
            if !self.breaker.try_acquire() {
                debug!(service = self.service, attempt, "circuit open, call short-circuited");
                return Err(open.into());
            }
            match tokio::time::timeout(self.config.timeout(), op()).await {
                Ok(Ok(value)) => {
                    self.breaker.record_success();
                    return Ok(value);
                }
                Ok(Err(err)) => last_error = err.to_string(),
                Err(_) => {
                    last_error = GuardError::Timeout {
                        service: self.service,
                        timeout_ms: self.config.timeout_ms,
                    }
                    .to_string();
                }
            }
            self.breaker.record_failure();

            if attempt < attempts {
                let delay = backoff
                    .next_backoff()
                    .unwrap_or_else(|| std::time::Duration::from_millis(self.config.max_delay_ms));
                warn!(
                    service = self.service,
                    attempt,
                    max_attempts = attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %last_error,
                    "external call failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }

        warn!(service = self.service, attempts, error = %last_error, "external call exhausted");
        Err(GuardError::Exhausted {
            service: self.service,
            attempts,
            last_error,
        }
        .into())
    }
}
