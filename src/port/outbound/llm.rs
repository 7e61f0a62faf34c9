//! LLM completion port used by the copilot.
//!
//! Defines a generic interface for large language model completion requests.

use async_trait::async_trait;

use crate::error::Result;

/// Client for large language model text completion.
///
/// Implementations wrap specific LLM providers (OpenAI, Anthropic, etc.) and
/// handle authentication and response extraction. Retries and circuit
/// breaking are layered on top by the call guard, not by providers.
///
/// # Errors
///
/// The [`complete`](Self::complete) method returns an error for API failures,
/// rate limits, or invalid responses.
#[async_trait]
pub trait Llm: Send + Sync {
    /// Return the provider name for logging.
    fn name(&self) -> &'static str;

    /// Send a completion request and return the generated text.
    ///
    /// # Arguments
    ///
    /// * `system` - Instructions for the model.
    /// * `prompt` - The user message (the copilot sends a JSON context).
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}
