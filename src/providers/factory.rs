use crate::config::{LlmConfig, ProviderConfig, ProviderKind};
use crate::error::ParserError;
use crate::providers::{AnthropicProvider, LlmProvider, OpenAIProvider};
use std::time::Duration;

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider instance from configuration
    pub fn create(
        kind: ProviderKind,
        config: &ProviderConfig,
        timeout: Duration,
    ) -> Result<Box<dyn LlmProvider>, ParserError> {
        match kind {
            ProviderKind::OpenAI => Ok(Box::new(OpenAIProvider::new(config, timeout)?)),
            ProviderKind::Anthropic => Ok(Box::new(AnthropicProvider::new(config, timeout)?)),
        }
    }

    /// Create the provider selected in the LLM configuration
    pub fn from_config(config: &LlmConfig) -> Result<Box<dyn LlmProvider>, ParserError> {
        Self::create(
            config.provider,
            &config.provider_config(config.provider),
            Duration::from_secs(config.timeout),
        )
    }

    /// List all available provider names
    pub fn available_providers() -> Vec<&'static str> {
        ProviderKind::ALL.iter().map(ProviderKind::as_str).collect()
    }
}
