use crate::config::{ProviderConfig, ProviderKind};
use crate::error::ParserError;
use crate::providers::{read_envelope, LlmProvider, Prompt};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    timeout: Duration,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider from configuration
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Result<Self, ParserError> {
        let kind = ProviderKind::Anthropic;

        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var(kind.api_key_env()).ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ParserError::ProviderAuthMissing(format!(
                    "{} not found in config or environment",
                    kind.api_key_env()
                ))
            })?;

        Ok(AnthropicProvider {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| kind.default_base_url().to_string()),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| kind.default_model().to_string()),
            max_tokens: config.max_tokens,
            timeout,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String, model: String) -> Self {
        AnthropicProvider {
            client: Client::new(),
            api_key,
            base_url,
            model,
            max_tokens: 512,
            timeout: Duration::from_secs(30),
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String, ParserError> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url.trim_end_matches('/')))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&json!({
                "model": self.model,
                "max_tokens": self.max_tokens,
                "temperature": 0,
                "system": prompt.system,
                "messages": [
                    {
                        "role": "user",
                        "content": prompt.user
                    }
                ]
            }))
            .send()
            .await
            .map_err(|e| ParserError::from_request(e, self.timeout))?;

        let response_body = read_envelope(response, self.timeout).await?;
        debug!("Anthropic response: {:?}", response_body);

        let content = response_body["content"][0]["text"]
            .as_str()
            .ok_or_else(|| {
                ParserError::ProviderMalformedResponse(
                    "Failed to extract content from Anthropic response".to_string(),
                )
            })?
            .to_string();

        Ok(content)
    }
}
