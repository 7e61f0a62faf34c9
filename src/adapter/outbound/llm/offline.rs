//! Completion client for deployments without an API key.

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::port::outbound::llm::Llm;

/// Fails every request, so the copilot takes its transport-failure path.
#[derive(Debug, Clone)]
pub struct OfflineLlm {
    reason: String,
}

impl OfflineLlm {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Llm for OfflineLlm {
    fn name(&self) -> &'static str {
        "offline"
    }

    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String> {
        Err(Error::Completion(format!("no completion provider: {}", self.reason)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_call_is_an_external_failure() {
        let llm = OfflineLlm::new("ANTHROPIC_API_KEY not set");
        let err = llm.complete("s", "p").await.unwrap_err();
        assert!(err.is_external());
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }
}
