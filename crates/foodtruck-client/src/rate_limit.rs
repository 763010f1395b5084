//! Retry policy for transient provider failures.
//!
//! Rate limiting (HTTP 429) and network-level failures are retried; every
//! other error is returned on the first attempt. A 429 waits for whatever
//! the server asked for in `Retry-After`, never less than the exponential
//! backoff.

use std::future::Future;
use std::time::Duration;

use crate::error::ClientError;

/// Upper bound on a server-requested pause.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    max_retries: u32,
    backoff_base: Duration,
}

impl RetryPolicy {
    /// `max_retries` extra attempts, pausing `backoff_base_secs * 2^attempt`
    /// seconds between them.
    pub(crate) const fn new(max_retries: u32, backoff_base_secs: u64) -> Self {
        Self {
            max_retries,
            backoff_base: Duration::from_secs(backoff_base_secs),
        }
    }

    /// Pause before retrying after `err` on zero-based `attempt`, or `None`
    /// when the error should be returned to the caller.
    fn delay_after(&self, err: &ClientError, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_retries {
            return None;
        }
        let backoff = self.backoff_base.saturating_mul(1 << attempt.min(31));
        match err {
            ClientError::RateLimited {
                retry_after_secs, ..
            } => {
                let requested = Duration::from_secs(*retry_after_secs).min(MAX_RETRY_AFTER);
                Some(requested.max(backoff))
            }
            ClientError::Http(_) => Some(backoff),
            _ => None,
        }
    }

    /// Runs `operation` until it succeeds, fails permanently, or the retry
    /// budget is spent. The last error is returned.
    pub(crate) async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, ClientError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let mut attempt = 0u32;
        loop {
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            let Some(delay) = self.delay_after(&err, attempt) else {
                return Err(err);
            };

            attempt += 1;
            tracing::warn!(
                attempt,
                max_retries = self.max_retries,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "transient provider error, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn rate_limited(retry_after_secs: u64) -> ClientError {
        ClientError::RateLimited {
            host: "data.example.org".to_owned(),
            retry_after_secs,
        }
    }

    #[test]
    fn retry_after_wins_over_shorter_backoff() {
        let policy = RetryPolicy::new(3, 2);
        assert_eq!(
            policy.delay_after(&rate_limited(30), 0),
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn backoff_wins_over_shorter_retry_after() {
        let policy = RetryPolicy::new(3, 2);
        assert_eq!(
            policy.delay_after(&rate_limited(1), 2),
            Some(Duration::from_secs(8))
        );
        assert_eq!(
            policy.delay_after(&rate_limited(0), 0),
            Some(Duration::from_secs(2))
        );
    }

    #[test]
    fn huge_retry_after_is_capped() {
        let policy = RetryPolicy::new(1, 0);
        assert_eq!(
            policy.delay_after(&rate_limited(86_400), 0),
            Some(MAX_RETRY_AFTER)
        );
    }

    #[test]
    fn exhausted_budget_stops_retrying() {
        let policy = RetryPolicy::new(2, 0);
        assert!(policy.delay_after(&rate_limited(0), 1).is_some());
        assert_eq!(policy.delay_after(&rate_limited(0), 2), None);
        assert_eq!(RetryPolicy::new(0, 0).delay_after(&rate_limited(0), 0), None);
    }

    #[test]
    fn permanent_failures_are_not_retried() {
        let policy = RetryPolicy::new(5, 1);
        let status = ClientError::UnexpectedStatus {
            status: 500,
            endpoint: "https://data.example.org/vendors.json".to_owned(),
        };
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let body = ClientError::Deserialize {
            context: "vendor list".to_owned(),
            source,
        };
        assert_eq!(policy.delay_after(&status, 0), None);
        assert_eq!(policy.delay_after(&body, 0), None);
    }

    #[tokio::test(start_paused = true)]
    async fn run_sleeps_for_retry_after_before_next_attempt() {
        let calls = &AtomicU32::new(0);
        let started = tokio::time::Instant::now();

        let value = RetryPolicy::new(2, 0)
            .run(move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(rate_limited(30))
                } else {
                    Ok(7)
                }
            })
            .await
            .unwrap();

        assert_eq!(value, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(started.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn run_returns_last_error_once_budget_is_spent() {
        let calls = &AtomicU32::new(0);
        let started = tokio::time::Instant::now();

        let result = RetryPolicy::new(2, 0)
            .run(move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(rate_limited(30))
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(started.elapsed() >= Duration::from_secs(60));
        assert!(matches!(
            result,
            Err(ClientError::RateLimited {
                retry_after_secs: 30,
                ..
            })
        ));
    }
}
