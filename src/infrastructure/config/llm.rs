//! Completion provider configuration.
//!
//! API keys are read from the environment (`ANTHROPIC_API_KEY`,
//! `OPENAI_API_KEY`), never from the config file.

use std::time::Duration;

use serde::Deserialize;

/// `[llm]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProvider,

    /// Connect and read timeout of a single HTTP request.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default)]
    pub anthropic: ProviderConfig,

    #[serde(default = "default_openai")]
    pub openai: ProviderConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            request_timeout_ms: default_request_timeout_ms(),
            anthropic: ProviderConfig::default(),
            openai: default_openai(),
        }
    }
}

impl LlmConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.max(1))
    }

    /// Settings of the selected provider.
    #[must_use]
    pub fn selected(&self) -> &ProviderConfig {
        match self.provider {
            LlmProvider::Anthropic => &self.anthropic,
            LlmProvider::OpenAi => &self.openai,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Anthropic,
    #[serde(alias = "open_ai")]
    OpenAi,
}

impl LlmProvider {
    /// Environment variable holding the provider's API key.
    #[must_use]
    pub const fn key_var(self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }
}

/// Model settings for one provider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_anthropic_model")]
    pub model: String,
    /// Copilot advice should be repeatable; keep this low.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: default_anthropic_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_openai() -> ProviderConfig {
    ProviderConfig {
        model: "gpt-4o-mini".into(),
        ..ProviderConfig::default()
    }
}

fn default_anthropic_model() -> String {
    "claude-3-5-haiku-latest".into()
}

const fn default_temperature() -> f64 {
    0.2
}

const fn default_max_tokens() -> usize {
    600
}

const fn default_request_timeout_ms() -> u64 {
    15_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_configured_provider() {
        let config: LlmConfig = toml::from_str(
            r#"
            provider = "openai"

            [openai]
            model = "gpt-4.1-mini"
            "#,
        )
        .unwrap();
        assert_eq!(config.provider, LlmProvider::OpenAi);
        assert_eq!(config.selected().model, "gpt-4.1-mini");
        assert_eq!(config.selected().max_tokens, 600);
        assert_eq!(config.provider.key_var(), "OPENAI_API_KEY");
    }

    #[test]
    fn openai_section_defaults_to_openai_model() {
        let config = LlmConfig::default();
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.selected().model, "claude-3-5-haiku-latest");
    }
}
