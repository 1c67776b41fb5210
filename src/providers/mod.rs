mod anthropic;
mod factory;
mod fake;
mod open_ai;
mod prompt;
mod retry;

pub use anthropic::AnthropicProvider;
pub use factory::ProviderFactory;
pub use fake::{FakeProvider, FakeReply};
pub use open_ai::OpenAIProvider;
pub use prompt::{
    build_ingredient_prompt, prompt_examples, Prompt, PromptExample, INGREDIENT_PROMPT_TEMPLATE,
};
pub use retry::{complete_with_retry, RetryPolicy};

use crate::error::ParserError;
use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Response, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Unified trait for all LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (e.g., "openai", "anthropic")
    fn provider_name(&self) -> &str;

    /// Get the model identifier sent with every request
    fn model(&self) -> &str;

    /// Send the prompt with deterministic sampling and return the model's
    /// raw text, which is expected to be a JSON object.
    async fn complete(&self, prompt: &Prompt) -> Result<String, ParserError>;
}

#[async_trait]
impl<T: LlmProvider + ?Sized> LlmProvider for Arc<T> {
    fn provider_name(&self) -> &str {
        (**self).provider_name()
    }

    fn model(&self) -> &str {
        (**self).model()
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String, ParserError> {
        (**self).complete(prompt).await
    }
}

/// Check the status of a provider response and decode its JSON envelope.
///
/// 429 becomes [`ParserError::ProviderRateLimited`] so the retry loop can
/// back off; any other failure status is reported with its body.
pub(crate) async fn read_envelope(
    response: Response,
    timeout: Duration,
) -> Result<Value, ParserError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());
        return Err(ParserError::ProviderRateLimited { retry_after_secs });
    }

    let body = response
        .text()
        .await
        .map_err(|e| ParserError::from_request(e, timeout))?;

    if !status.is_success() {
        return Err(ParserError::ProviderApi {
            status: status.as_u16(),
            message: body,
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        ParserError::ProviderMalformedResponse(format!("invalid response envelope: {}", e))
    })
}
