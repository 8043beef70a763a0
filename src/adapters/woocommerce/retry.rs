//! Retry policy for store requests
//!
//! [`RetryPolicy`] is a plain value object built from [`RetryConfig`]. The
//! decision of what to do after a failure is the pure function
//! [`RetryPolicy::decide`]; [`RetryPolicy::run`] applies it around any request
//! future and sleeps inline, so the calling task is blocked for the delay.
//!
//! | Failure | Action |
//! |---|---|
//! | 401, other 4xx, invalid response | give up immediately |
//! | 429 | sleep `floor(Retry-After * rate_limit_multiplier)` seconds, no attempt consumed |
//! | 5xx, connectivity | exponential backoff until `max_attempts` |

use crate::config::RetryConfig;
use crate::domain::FetchError;
use std::future::Future;
use std::time::Duration;

/// Retry-After used when a 429 response carries no usable hint
pub const DEFAULT_RETRY_AFTER_SECS: f64 = 1.0;

/// What to do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAction {
    /// Sleep for the given delay, then try again
    RetryAfter(Duration),
    /// Surface the error to the caller
    GiveUp,
}

/// Retry policy applied uniformly around every store request
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    max_delay: Duration,
    backoff_multiplier: f64,
    rate_limit_multiplier: f64,
}

impl RetryPolicy {
    /// Builds a policy from configuration
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            backoff_multiplier: config.backoff_multiplier,
            rate_limit_multiplier: config.rate_limit_multiplier,
        }
    }

    /// Maximum number of counted attempts
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay after the `attempt`-th counted failure (1-based)
    ///
    /// `initial_delay * multiplier^(attempt - 1)`, capped at `max_delay`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let factor = self.backoff_multiplier.powi(exponent);
        let delay_ms = (self.initial_delay.as_millis() as f64 * factor)
            .min(self.max_delay.as_millis() as f64);
        Duration::from_millis(delay_ms as u64)
    }

    /// Delay before retrying a rate-limited request
    ///
    /// The server hint is multiplied and floored to whole seconds, no jitter.
    pub fn rate_limit_delay(&self, retry_after_secs: f64) -> Duration {
        let secs = (retry_after_secs.max(0.0) * self.rate_limit_multiplier).floor();
        Duration::from_secs(secs as u64)
    }

    /// Decides what to do after a failure
    ///
    /// # Arguments
    ///
    /// * `failed_attempts` - counted failures so far, including this one
    /// * `error` - the failure
    pub fn decide(&self, failed_attempts: u32, error: &FetchError) -> RetryAction {
        match error {
            FetchError::RateLimited { retry_after_secs } => {
                RetryAction::RetryAfter(self.rate_limit_delay(*retry_after_secs))
            }
            FetchError::Server { .. } | FetchError::Connectivity(_) => {
                if failed_attempts >= self.max_attempts {
                    RetryAction::GiveUp
                } else {
                    RetryAction::RetryAfter(self.backoff_delay(failed_attempts))
                }
            }
            _ => RetryAction::GiveUp,
        }
    }

    /// Runs `operation` until it succeeds or the policy gives up
    ///
    /// Rate-limited attempts are not counted, so a server that keeps answering
    /// 429 is waited on indefinitely.
    ///
    /// # Errors
    ///
    /// Non-retryable errors are returned as-is. When counted attempts run out
    /// the last error is wrapped in [`FetchError::RetriesExhausted`].
    pub async fn run<F, Fut, T>(&self, mut operation: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let mut failed_attempts = 0u32;

        loop {
            let error = match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            let counted = !matches!(error, FetchError::RateLimited { .. });
            if counted {
                failed_attempts += 1;
            }

            match self.decide(failed_attempts, &error) {
                RetryAction::RetryAfter(delay) => {
                    if counted {
                        crate::log_retry_attempt!(
                            failed_attempts,
                            self.max_attempts,
                            delay.as_millis() as u64,
                            error
                        );
                    } else {
                        tracing::warn!(
                            delay_secs = delay.as_secs(),
                            "Rate limited by store, waiting before retry"
                        );
                    }
                    tokio::time::sleep(delay).await;
                }
                RetryAction::GiveUp if error.is_retryable() && counted => {
                    return Err(FetchError::RetriesExhausted {
                        attempts: failed_attempts,
                        last: Box::new(error),
                    });
                }
                RetryAction::GiveUp => return Err(error),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// Parses a Retry-After header value in seconds
///
/// Missing, negative or non-numeric values (including HTTP dates) fall back
/// to [`DEFAULT_RETRY_AFTER_SECS`].
pub fn parse_retry_after(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use test_case::test_case;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::from_config(&RetryConfig {
            max_attempts: 5,
            initial_delay_ms: 1,
            max_delay_ms: 10,
            backoff_multiplier: 2.0,
            rate_limit_multiplier: 2.0,
        })
    }

    fn server_error() -> FetchError {
        FetchError::Server {
            status: 500,
            message: "Internal Server Error".to_string(),
        }
    }

    #[test_case(1, 1000 ; "first retry waits the initial delay")]
    #[test_case(2, 2000 ; "second retry doubles")]
    #[test_case(3, 4000 ; "third retry doubles again")]
    #[test_case(4, 8000 ; "fourth retry")]
    #[test_case(10, 60000 ; "capped at max delay")]
    fn test_backoff_delay(attempt: u32, expected_ms: u64) {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_delay(attempt), Duration::from_millis(expected_ms));
    }

    #[test_case(1.0, 2 ; "one second doubles")]
    #[test_case(1.5, 3 ; "fractional hint")]
    #[test_case(0.4, 0 ; "floored to whole seconds")]
    #[test_case(30.0, 60 ; "large hint")]
    fn test_rate_limit_delay(retry_after: f64, expected_secs: u64) {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.rate_limit_delay(retry_after),
            Duration::from_secs(expected_secs)
        );
    }

    #[test]
    fn test_decide_server_error_until_exhausted() {
        let policy = RetryPolicy::default();
        for attempt in 1..5 {
            assert!(matches!(
                policy.decide(attempt, &server_error()),
                RetryAction::RetryAfter(_)
            ));
        }
        assert_eq!(policy.decide(5, &server_error()), RetryAction::GiveUp);
    }

    #[test]
    fn test_decide_rate_limit_is_never_exhausted() {
        let policy = RetryPolicy::default();
        let error = FetchError::RateLimited {
            retry_after_secs: 3.0,
        };
        assert_eq!(
            policy.decide(1000, &error),
            RetryAction::RetryAfter(Duration::from_secs(6))
        );
    }

    #[test_case(FetchError::Authentication("invalid key".to_string()) ; "unauthorized")]
    #[test_case(FetchError::Client { status: 404, message: String::new() } ; "not found")]
    #[test_case(FetchError::InvalidResponse("not json".to_string()) ; "invalid body")]
    fn test_decide_gives_up_immediately(error: FetchError) {
        let policy = RetryPolicy::default();
        assert_eq!(policy.decide(1, &error), RetryAction::GiveUp);
    }

    #[test_case(None, 1.0 ; "missing header")]
    #[test_case(Some("5"), 5.0 ; "integer seconds")]
    #[test_case(Some(" 2.5 "), 2.5 ; "fractional seconds")]
    #[test_case(Some("Wed, 21 Oct 2015 07:28:00 GMT"), 1.0 ; "http date")]
    #[test_case(Some("-3"), 1.0 ; "negative")]
    fn test_parse_retry_after(value: Option<&str>, expected: f64) {
        assert_eq!(parse_retry_after(value), expected);
    }

    #[tokio::test]
    async fn test_run_succeeds_after_transient_failures() {
        let policy = fast_policy();
        let calls = Cell::new(0u32);

        let result = policy
            .run(|| {
                calls.set(calls.get() + 1);
                let call = calls.get();
                async move {
                    if call < 3 {
                        Err(server_error())
                    } else {
                        Ok(call)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_run_exhausts_after_max_attempts() {
        let policy = fast_policy();
        let calls = Cell::new(0u32);

        let result: Result<(), FetchError> = policy
            .run(|| {
                calls.set(calls.get() + 1);
                async { Err(FetchError::Connectivity("refused".to_string())) }
            })
            .await;

        assert_eq!(calls.get(), 5);
        match result {
            Err(FetchError::RetriesExhausted { attempts, last }) => {
                assert_eq!(attempts, 5);
                assert!(matches!(*last, FetchError::Connectivity(_)));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_does_not_retry_authentication() {
        let policy = fast_policy();
        let calls = Cell::new(0u32);

        let result: Result<(), FetchError> = policy
            .run(|| {
                calls.set(calls.get() + 1);
                async { Err(FetchError::Authentication("bad key".to_string())) }
            })
            .await;

        assert_eq!(calls.get(), 1);
        assert!(matches!(result, Err(FetchError::Authentication(_))));
    }

    #[tokio::test]
    async fn test_run_rate_limits_do_not_consume_attempts() {
        let policy = fast_policy();
        let calls = Cell::new(0u32);

        let result = policy
            .run(|| {
                calls.set(calls.get() + 1);
                let call = calls.get();
                async move {
                    if call <= 7 {
                        Err(FetchError::RateLimited {
                            retry_after_secs: 0.0,
                        })
                    } else {
                        Ok(call)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_sleeps_twice_the_retry_after_hint() {
        let policy = RetryPolicy::default();
        let calls = Cell::new(0u32);
        let start = tokio::time::Instant::now();

        let result = policy
            .run(|| {
                calls.set(calls.get() + 1);
                let call = calls.get();
                async move {
                    if call == 1 {
                        Err(FetchError::RateLimited {
                            retry_after_secs: 3.0,
                        })
                    } else {
                        Ok(call)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(6), "waited {waited:?}");
        assert!(waited < Duration::from_secs(7), "waited {waited:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_sleeps_exponential_backoff() {
        let policy = RetryPolicy::default();
        let calls = Cell::new(0u32);
        let start = tokio::time::Instant::now();

        let result = policy
            .run(|| {
                calls.set(calls.get() + 1);
                let call = calls.get();
                async move {
                    if call < 3 {
                        Err(server_error())
                    } else {
                        Ok(call)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
        // 1 s after the first failure, 2 s after the second
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(3), "waited {waited:?}");
        assert!(waited < Duration::from_secs(4), "waited {waited:?}");
    }
}
