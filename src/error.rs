use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while building parsers or talking to a provider.
///
/// Parsing itself never surfaces these to callers: the rule-based parser
/// degrades to partial results and the LLM parser converts them into a
/// zero-confidence result. They are returned from constructors and from the
/// provider and knowledge-base seams.
#[derive(Error, Debug)]
pub enum ParserError {
    /// Provider call exceeded the configured duration
    #[error("Provider call timed out after {0:?}")]
    ProviderTimeout(Duration),

    /// Provider signalled a rate limit (HTTP 429)
    #[error("Provider rate limited, retry after {retry_after_secs:?} seconds")]
    ProviderRateLimited { retry_after_secs: Option<u64> },

    /// Provider response did not decode to the expected shape
    #[error("Malformed provider response: {0}")]
    ProviderMalformedResponse(String),

    /// Credential missing for the selected provider
    #[error("Missing credential: {0}")]
    ProviderAuthMissing(String),

    /// Provider answered with a non-success status
    #[error("Provider returned error: {status} - {message}")]
    ProviderApi { status: u16, message: String },

    /// Network failure talking to the provider
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Knowledge base lookup failed
    #[error("Knowledge base error: {0}")]
    KnowledgeBase(String),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    BuilderError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParserError {
    /// Only rate limits are worth retrying; everything else fails the call.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ParserError::ProviderRateLimited { .. })
    }

    /// Maps a transport error, keeping timeouts distinct from other failures.
    pub fn from_request(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            ParserError::ProviderTimeout(timeout)
        } else {
            ParserError::Request(err)
        }
    }
}
