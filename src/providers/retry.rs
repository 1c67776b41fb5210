use crate::error::ParserError;
use crate::providers::{LlmProvider, Prompt};
use log::{debug, info, warn};
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// How a provider call is bounded and retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after a rate-limit response, on top of the first attempt
    pub max_retries: u32,
    /// Deadline for each individual provider call
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based): 2s, 4s, 8s, ...
    pub fn backoff_delay(attempt: u32) -> Duration {
        Duration::from_secs(2u64.saturating_pow(attempt))
    }
}

enum RetryState {
    Requesting { attempt: u32 },
    Backoff { attempt: u32 },
    Done(String),
    Failed(ParserError),
}

/// Call the provider, backing off and retrying only on rate limits.
///
/// Every call runs under `policy.timeout`; expiry drops the request and is
/// reported as [`ParserError::ProviderTimeout`]. Attempts run sequentially in
/// the caller's task, so dropping the returned future also cancels any
/// pending backoff.
pub async fn complete_with_retry(
    provider: &dyn LlmProvider,
    prompt: &Prompt,
    policy: &RetryPolicy,
) -> Result<String, ParserError> {
    let mut state = RetryState::Requesting { attempt: 0 };

    loop {
        state = match state {
            RetryState::Requesting { attempt } => {
                debug!(
                    "Calling {} (attempt {}/{})",
                    provider.provider_name(),
                    attempt + 1,
                    policy.max_retries + 1
                );

                match timeout(policy.timeout, provider.complete(prompt)).await {
                    Err(_) => RetryState::Failed(ParserError::ProviderTimeout(policy.timeout)),
                    Ok(Ok(content)) => {
                        if attempt > 0 {
                            info!(
                                "{} succeeded after {} retries",
                                provider.provider_name(),
                                attempt
                            );
                        }
                        RetryState::Done(content)
                    }
                    Ok(Err(e)) if e.is_retryable() && attempt < policy.max_retries => {
                        warn!(
                            "Provider {} failed (attempt {}/{}): {}",
                            provider.provider_name(),
                            attempt + 1,
                            policy.max_retries + 1,
                            e
                        );
                        RetryState::Backoff {
                            attempt: attempt + 1,
                        }
                    }
                    Ok(Err(e)) => RetryState::Failed(e),
                }
            }
            RetryState::Backoff { attempt } => {
                let delay = RetryPolicy::backoff_delay(attempt);
                debug!("Waiting {:?} before retry", delay);
                sleep(delay).await;
                RetryState::Requesting { attempt }
            }
            RetryState::Done(content) => return Ok(content),
            RetryState::Failed(e) => return Err(e),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{FakeProvider, FakeReply};
    use tokio::time::Instant;

    fn prompt() -> Prompt {
        Prompt {
            system: "system".to_string(),
            user: "1 cup flour".to_string(),
        }
    }

    #[test]
    fn test_backoff_delays() {
        assert_eq!(RetryPolicy::backoff_delay(1), Duration::from_secs(2));
        assert_eq!(RetryPolicy::backoff_delay(2), Duration::from_secs(4));
        assert_eq!(RetryPolicy::backoff_delay(3), Duration::from_secs(8));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limits_exhaust_retries() {
        let provider = FakeProvider::new().otherwise(FakeReply::RateLimited);
        let started = Instant::now();

        let result = complete_with_retry(&provider, &prompt(), &RetryPolicy::default()).await;

        assert!(matches!(
            result,
            Err(ParserError::ProviderRateLimited { .. })
        ));
        assert_eq!(provider.call_count(), 4);

        let offsets: Vec<Duration> = provider
            .call_times()
            .iter()
            .map(|t| t.duration_since(started))
            .collect();
        assert_eq!(
            offsets,
            vec![
                Duration::ZERO,
                Duration::from_secs(2),
                Duration::from_secs(6),
                Duration::from_secs(14),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_retry() {
        let provider = FakeProvider::new()
            .then(FakeReply::RateLimited)
            .then(FakeReply::content(r#"{"ingredient": "flour"}"#));

        let result = complete_with_retry(&provider, &prompt(), &RetryPolicy::default()).await;

        assert_eq!(result.unwrap(), r#"{"ingredient": "flour"}"#);
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_errors_are_not_retried() {
        let provider = FakeProvider::new().otherwise(FakeReply::Error {
            status: 500,
            message: "boom".to_string(),
        });

        let result = complete_with_retry(&provider, &prompt(), &RetryPolicy::default()).await;

        assert!(matches!(
            result,
            Err(ParserError::ProviderApi { status: 500, .. })
        ));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_call_times_out() {
        let provider = FakeProvider::new().otherwise(FakeReply::Hang);
        let policy = RetryPolicy {
            max_retries: 3,
            timeout: Duration::from_secs(5),
        };
        let started = Instant::now();

        let result = complete_with_retry(&provider, &prompt(), &policy).await;

        match result {
            Err(ParserError::ProviderTimeout(limit)) => assert_eq!(limit, Duration::from_secs(5)),
            other => panic!("expected timeout, got {:?}", other),
        }
        assert_eq!(started.elapsed(), Duration::from_secs(5));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_fails_on_first_rate_limit() {
        let provider = FakeProvider::new().otherwise(FakeReply::RateLimited);
        let policy = RetryPolicy {
            max_retries: 0,
            ..Default::default()
        };

        let result = complete_with_retry(&provider, &prompt(), &policy).await;

        assert!(result.is_err());
        assert_eq!(provider.call_count(), 1);
    }
}
