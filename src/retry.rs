use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::error::Error;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BACKOFF_UNIT: Duration = Duration::from_secs(2);

/// Bounded retry on rate-limited provider responses.
///
/// Only an upstream 429 is retried; every other failure returns immediately.
/// The sleep before attempt N+1 is `backoff_unit * N` (2s, then 4s with the
/// defaults). A 429 on the final attempt becomes `RateLimitExceeded` carrying
/// the last response body.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_unit: DEFAULT_BACKOFF_UNIT,
        }
    }
}

impl RetryPolicy {
    #[cfg(test)]
    pub fn with_backoff_unit(max_attempts: u32, backoff_unit: Duration) -> Self {
        Self {
            max_attempts,
            backoff_unit,
        }
    }

    pub async fn run<F, Fut>(&self, mut attempt: F) -> Result<String, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<String, Error>>,
    {
        let mut last_body = String::new();
        for attempt_number in 1..=self.max_attempts.max(1) {
            match attempt().await {
                Ok(text) => return Ok(text),
                Err(err) if err.is_rate_limit() => {
                    if let Error::Upstream { body, .. } = err {
                        last_body = body;
                    }
                    if attempt_number == self.max_attempts.max(1) {
                        break;
                    }
                    let backoff = self.backoff_unit * attempt_number;
                    warn!(
                        attempt = attempt_number,
                        backoff_secs = backoff.as_secs(),
                        "provider rate limited the request, backing off"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(err) => return Err(err),
            }
        }

        Err(Error::RateLimitExceeded { body: last_body })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use super::RetryPolicy;
    use crate::error::Error;

    fn rate_limited(body: &str) -> Error {
        Error::Upstream {
            provider: "gemini",
            status: 429,
            body: body.to_string(),
        }
    }

    fn zero_backoff() -> RetryPolicy {
        RetryPolicy::with_backoff_unit(3, Duration::ZERO)
    }

    #[tokio::test]
    async fn first_attempt_success_makes_a_single_call() {
        let calls = Cell::new(0u32);
        let result = zero_backoff()
            .run(|| {
                calls.set(calls.get() + 1);
                async { Ok("reply".to_string()) }
            })
            .await;

        assert_eq!(result.expect("should succeed"), "reply");
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn rate_limits_are_retried_until_success() {
        let calls = Cell::new(0u32);
        let result = zero_backoff()
            .run(|| {
                calls.set(calls.get() + 1);
                let outcome = if calls.get() < 3 {
                    Err(rate_limited("slow down"))
                } else {
                    Ok("made it".to_string())
                };
                async move { outcome }
            })
            .await;

        assert_eq!(result.expect("third attempt should succeed"), "made it");
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn persistent_rate_limits_exhaust_after_three_attempts() {
        let calls = Cell::new(0u32);
        let err = zero_backoff()
            .run(|| {
                calls.set(calls.get() + 1);
                let body = format!("quota {}", calls.get());
                async move { Err::<String, _>(rate_limited(&body)) }
            })
            .await
            .expect_err("all attempts rate limited");

        assert_eq!(calls.get(), 3);
        match err {
            Error::RateLimitExceeded { body } => assert_eq!(body, "quota 3"),
            other => panic!("expected RateLimitExceeded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_rate_limit_failures_are_not_retried() {
        let calls = Cell::new(0u32);
        let err = zero_backoff()
            .run(|| {
                calls.set(calls.get() + 1);
                async {
                    Err::<String, _>(Error::Upstream {
                        provider: "groq",
                        status: 500,
                        body: "boom".to_string(),
                    })
                }
            })
            .await
            .expect_err("server error should fail immediately");

        assert_eq!(calls.get(), 1);
        match err {
            Error::Upstream { status, .. } => assert_eq!(status, 500),
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn backoff_grows_linearly_with_attempt_number() {
        let policy = RetryPolicy::with_backoff_unit(3, Duration::from_millis(10));
        let started = std::time::Instant::now();
        let _ = policy
            .run(|| async { Err::<String, _>(rate_limited("busy")) })
            .await;

        // Two sleeps: 10ms after attempt 1, 20ms after attempt 2.
        assert!(
            started.elapsed() >= Duration::from_millis(30),
            "expected at least 30ms of backoff, got {:?}",
            started.elapsed()
        );
    }

    #[tokio::test]
    async fn success_after_one_rate_limit_uses_two_attempts() {
        let calls = Cell::new(0u32);
        let result = zero_backoff()
            .run(|| {
                calls.set(calls.get() + 1);
                let outcome = if calls.get() == 1 {
                    Err(rate_limited("busy"))
                } else {
                    Ok("second try".to_string())
                };
                async move { outcome }
            })
            .await;

        assert_eq!(result.expect("second attempt should succeed"), "second try");
        assert_eq!(calls.get(), 2);
    }
}
