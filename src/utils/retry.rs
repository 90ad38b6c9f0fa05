// Retry with exponential backoff

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

const MAX_BACKOFF_EXPONENT: u32 = 5;

/// Runs `operation` up to `max_attempts` times (at least once), doubling
/// `base_delay` between failures. The last error is returned unchanged.
pub async fn with_retry<F, Fut, T, E>(
    mut operation: F,
    max_attempts: u32,
    base_delay: Duration,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(error) => {
                attempt += 1;
                if attempt >= max_attempts {
                    return Err(error);
                }

                let delay = base_delay * 2u32.pow((attempt - 1).min(MAX_BACKOFF_EXPONENT));
                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "Operation failed, retrying: {}",
                    error
                );
                sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<u32, String> = with_retry(
            move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Err(format!("attempt {} failed", n))
                } else {
                    Ok(n)
                }
            },
            3,
            Duration::ZERO,
        )
        .await;

        assert_eq!(result, Ok(3));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_returns_last_error() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), String> = with_retry(
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("down".to_string())
            },
            2,
            Duration::ZERO,
        )
        .await;

        assert_eq!(result, Err("down".to_string()));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_zero_attempts_still_runs_once() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), &str> = tokio_test::block_on(with_retry(
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("nope")
            },
            0,
            Duration::ZERO,
        ));

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
