//! Scripted LLM provider for testing.
//!
//! Replies are served in the order they were queued, then the fallback reply
//! repeats forever. Call times come from `tokio::time::Instant`, so retry
//! delays can be asserted under a paused clock.

use crate::error::ParserError;
use crate::providers::{LlmProvider, Prompt};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use tokio::time::Instant;

/// What the fake provider does on one call
#[derive(Debug, Clone, PartialEq)]
pub enum FakeReply {
    /// Return this text as the model output
    Content(String),
    /// Fail with HTTP 429 semantics
    RateLimited,
    /// Fail with a non-retryable API error
    Error { status: u16, message: String },
    /// Never answer; only a timeout or cancellation ends the call
    Hang,
}

impl FakeReply {
    pub fn content(text: impl Into<String>) -> Self {
        FakeReply::Content(text.into())
    }
}

#[derive(Debug)]
pub struct FakeProvider {
    model: String,
    replies: Mutex<VecDeque<FakeReply>>,
    fallback: FakeReply,
    calls: Mutex<Vec<Instant>>,
    last_prompt: Mutex<Option<Prompt>>,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeProvider {
    /// A provider with an empty script; every call fails with a 500.
    pub fn new() -> Self {
        FakeProvider {
            model: "fake-model".to_string(),
            replies: Mutex::new(VecDeque::new()),
            fallback: FakeReply::Error {
                status: 500,
                message: "no scripted reply".to_string(),
            },
            calls: Mutex::new(Vec::new()),
            last_prompt: Mutex::new(None),
        }
    }

    /// Queue a reply for the next unanswered call.
    pub fn then(mut self, reply: FakeReply) -> Self {
        self.replies
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
        self
    }

    /// Reply used once the queue is empty.
    pub fn otherwise(mut self, reply: FakeReply) -> Self {
        self.fallback = reply;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// When each call started, in order
    pub fn call_times(&self) -> Vec<Instant> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_prompt(&self) -> Option<Prompt> {
        self.last_prompt
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn next_reply(&self) -> FakeReply {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl LlmProvider for FakeProvider {
    fn provider_name(&self) -> &str {
        "fake"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String, ParserError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Instant::now());
        *self
            .last_prompt
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(prompt.clone());

        match self.next_reply() {
            FakeReply::Content(text) => Ok(text),
            FakeReply::RateLimited => Err(ParserError::ProviderRateLimited {
                retry_after_secs: None,
            }),
            FakeReply::Error { status, message } => {
                Err(ParserError::ProviderApi { status, message })
            }
            FakeReply::Hang => std::future::pending().await,
        }
    }
}
