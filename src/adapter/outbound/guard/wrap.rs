//! Guarded decorators for the completion and messenger ports.

use std::sync::Arc;

use async_trait::async_trait;

use super::call::CallGuard;
use super::config::GuardConfig;
use crate::error::Result;
use crate::port::outbound::llm::Llm;
use crate::port::outbound::messenger::{Messenger, OutboundMessage};

pub struct GuardedLlm {
    inner: Arc<dyn Llm>,
    guard: CallGuard,
}

impl GuardedLlm {
    pub fn new(inner: Arc<dyn Llm>, config: GuardConfig) -> Self {
        Self {
            guard: CallGuard::new("llm", config),
            inner,
        }
    }

    #[must_use]
    pub fn guard(&self) -> &CallGuard {
        &self.guard
    }
}

#[async_trait]
impl Llm for GuardedLlm {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        self.guard.call(|| self.inner.complete(system, prompt)).await
    }
}

pub struct GuardedMessenger {
    inner: Arc<dyn Messenger>,
    guard: CallGuard,
}

impl GuardedMessenger {
    pub fn new(inner: Arc<dyn Messenger>, config: GuardConfig) -> Self {
        Self {
            guard: CallGuard::new("messenger", config),
            inner,
        }
    }

    #[must_use]
    pub fn guard(&self) -> &CallGuard {
        &self.guard
    }
}

#[async_trait]
impl Messenger for GuardedMessenger {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn send(&self, message: &OutboundMessage) -> Result<()> {
        self.guard.call(|| self.inner.send(message)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::guard::breaker::BreakerState;
    use crate::error::{Error, GuardError};
    use crate::testkit::llm::ScriptedLlm;
    use crate::testkit::messenger::RecordingMessenger;

    fn single_shot() -> GuardConfig {
        GuardConfig {
            max_attempts: 1,
            failure_threshold: 2,
            ..GuardConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn failing_llm_trips_breaker_and_stops_calling() {
        let inner = Arc::new(ScriptedLlm::failing());
        let llm = GuardedLlm::new(inner.clone(), single_shot());
        for _ in 0..2 {
            assert!(llm.complete("s", "p").await.is_err());
        }
        assert_eq!(llm.guard().breaker().state(), BreakerState::Open);

        let err = llm.complete("s", "p").await.unwrap_err();
        assert!(matches!(err, Error::Guard(GuardError::CircuitOpen { .. })));
        assert!(err.is_external());
        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn messenger_passes_through_when_healthy() {
        let inner = Arc::new(RecordingMessenger::new());
        let messenger = GuardedMessenger::new(inner.clone(), single_shot());
        messenger.send(&OutboundMessage::new(1, "hi")).await.unwrap();
        assert_eq!(inner.count(), 1);
        assert_eq!(messenger.name(), "recording");
    }
}
