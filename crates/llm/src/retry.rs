use crate::error::LlmError;
use std::future::Future;
use std::time::Duration;

/// Bounded retry with a fixed wait between attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            wait: Duration::from_secs(20),
        }
    }
}

/// Tagged result of a retried operation. Exhaustion is data, not an
/// exception: callers decide whether it aborts the run.
#[derive(Debug)]
pub enum RetryOutcome<T> {
    Success { value: T, attempts: u32 },
    Exhausted { attempts: u32, last_error: LlmError },
}

impl<T> RetryOutcome<T> {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Run `op` up to `policy.max_attempts` times. The zero-based attempt
/// number is passed to each call so the operation can vary behavior on
/// retries (the cache is bypassed after the first attempt). Errors marked
/// non-retryable end the loop early.
pub async fn with_retries<T, F, Fut>(policy: RetryPolicy, mut op: F) -> RetryOutcome<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error = None;

    for attempt in 0..max_attempts {
        if attempt > 0 {
            log::warn!("Retrying (attempt {} of {max_attempts})", attempt + 1);
            tokio::time::sleep(policy.wait).await;
        }
        match op(attempt).await {
            Ok(value) => {
                return RetryOutcome::Success {
                    value,
                    attempts: attempt + 1,
                }
            }
            Err(err) => {
                log::warn!("Attempt {} failed: {err}", attempt + 1);
                if !err.is_retryable() {
                    return RetryOutcome::Exhausted {
                        attempts: attempt + 1,
                        last_error: err,
                    };
                }
                last_error = Some(err);
            }
        }
    }

    RetryOutcome::Exhausted {
        attempts: max_attempts,
        last_error: last_error
            .unwrap_or_else(|| LlmError::InvalidResponse("no attempts made".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            wait: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let outcome = with_retries(fast_policy(3), |_| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(LlmError::Network("down".to_string()))
                } else {
                    Ok("ok".to_string())
                }
            }
        })
        .await;

        match outcome {
            RetryOutcome::Success { value, attempts } => {
                assert_eq!(value, "ok");
                assert_eq!(attempts, 3);
            }
            RetryOutcome::Exhausted { .. } => panic!("expected success"),
        }
    }

    #[tokio::test]
    async fn exhausts_after_max_attempts() {
        let outcome: RetryOutcome<String> = with_retries(fast_policy(2), |_| async {
            Err(LlmError::Network("down".to_string()))
        })
        .await;

        match outcome {
            RetryOutcome::Exhausted { attempts, .. } => assert_eq!(attempts, 2),
            RetryOutcome::Success { .. } => panic!("expected exhaustion"),
        }
    }

    #[tokio::test]
    async fn non_retryable_errors_end_early() {
        let calls = AtomicU32::new(0);
        let outcome: RetryOutcome<String> = with_retries(fast_policy(5), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(LlmError::MissingApiKey) }
        })
        .await;

        assert!(!outcome.is_success());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
