use crate::config::{ProviderConfig, ProviderKind};
use crate::error::ParserError;
use crate::providers::{read_envelope, LlmProvider, Prompt};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    timeout: Duration,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider from configuration
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Result<Self, ParserError> {
        let kind = ProviderKind::OpenAI;

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

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| kind.default_base_url().to_string());

        let model = config
            .model
            .clone()
            .unwrap_or_else(|| kind.default_model().to_string());

        Ok(OpenAIProvider {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            base_url,
            model,
            max_tokens: config.max_tokens,
            timeout,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String, model: String) -> Self {
        OpenAIProvider {
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
impl LlmProvider for OpenAIProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String, ParserError> {
        let response = self
            .client
            .post(format!(
                "{}/v1/chat/completions",
                self.base_url.trim_end_matches('/')
            ))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.model,
                "messages": [
                    {"role": "system", "content": prompt.system},
                    {"role": "user", "content": prompt.user}
                ],
                "temperature": 0,
                "max_tokens": self.max_tokens,
                "response_format": {"type": "json_object"}
            }))
            .send()
            .await
            .map_err(|e| ParserError::from_request(e, self.timeout))?;

        let response_body = read_envelope(response, self.timeout).await?;
        debug!("OpenAI response: {:?}", response_body);

        let content = response_body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                ParserError::ProviderMalformedResponse(
                    "Failed to extract content from OpenAI response".to_string(),
                )
            })?
            .to_string();

        Ok(content)
    }
}
