//! Anthropic Claude completion client.
//!
//! Implements [`Llm`] over the Anthropic Messages API. The copilot's
//! instructions travel in the top-level `system` field and the JSON context
//! as the single user message.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Error, Result};
use crate::port::outbound::llm::Llm;

/// Anthropic Messages API endpoint.
const API_URL: &str = "https://api.anthropic.com/v1/messages";

/// API version header value.
const API_VERSION: &str = "2023-06-01";

#[derive(Debug)]
pub struct Anthropic {
    client: Client,
    api_key: String,
    /// Model identifier (e.g., "claude-sonnet-4-6").
    model: String,
    max_tokens: usize,
    temperature: f64,
    endpoint: String,
}

impl Anthropic {
    /// Create a client with explicit configuration. `timeout` bounds
    /// connect and read of a single request.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        max_tokens: usize,
        temperature: f64,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            max_tokens,
            temperature,
            endpoint: API_URL.to_string(),
        })
    }

    /// Create a client from the `ANTHROPIC_API_KEY` environment variable.
    pub fn from_env(
        model: impl Into<String>,
        max_tokens: usize,
        temperature: f64,
        timeout: Duration,
    ) -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| ConfigError::MissingField {
            field: "ANTHROPIC_API_KEY",
        })?;
        Self::new(api_key, model, max_tokens, temperature, timeout)
    }

    /// Point the client at a different endpoint (proxies, tests).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Serialize)]
struct Request<'a> {
    model: &'a str,
    max_tokens: usize,
    temperature: f64,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct Response {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl Llm for Anthropic {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let request = Request {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::Completion(e.to_string()))?
            .json::<Response>()
            .await?;

        let text: String = response.content.into_iter().map(|c| c.text).collect();
        if text.trim().is_empty() {
            return Err(Error::Completion("empty completion".into()));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_system_and_single_user_message() {
        let request = Request {
            model: "claude-sonnet-4-6",
            max_tokens: 512,
            temperature: 0.2,
            system: "Be conservative.",
            messages: vec![Message {
                role: "user",
                content: r#"{"market":"BTC"}"#,
            }],
        };

        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["system"], "Be conservative.");
        assert_eq!(json["max_tokens"], 512);
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], r#"{"market":"BTC"}"#);
    }

    #[test]
    fn response_blocks_are_concatenated() {
        let json = r#"{
            "content": [
                {"type": "text", "text": "{\"recommendation\":"},
                {"type": "text", "text": "\"WAIT\"}"}
            ],
            "id": "msg_123",
            "role": "assistant"
        }"#;

        let response: Response = serde_json::from_str(json).unwrap();
        let text: String = response.content.into_iter().map(|c| c.text).collect();
        assert_eq!(text, r#"{"recommendation":"WAIT"}"#);
    }

    #[test]
    fn non_text_blocks_deserialize_as_empty() {
        let json = r#"{"content": [{"type": "tool_use", "id": "x"}]}"#;
        let response: Response = serde_json::from_str(json).unwrap();
        assert_eq!(response.content[0].text, "");
    }

    #[test]
    fn malformed_response_is_rejected() {
        assert!(serde_json::from_str::<Response>(r#"{"id": "x"}"#).is_err());
    }

    #[test]
    fn client_name_and_endpoint_override() {
        let client = Anthropic::new("key", "model", 256, 0.0, Duration::from_secs(5))
            .unwrap()
            .with_endpoint("http://127.0.0.1:9/v1/messages");
        assert_eq!(client.name(), "anthropic");
        assert_eq!(client.endpoint, "http://127.0.0.1:9/v1/messages");
    }
}
