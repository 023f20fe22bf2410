// file: src/utils/retry.rs
// description: bounded retry loop with exponential backoff for transient errors

use crate::error::Result;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Exponential backoff: 1s, 2s, 4s, ... capped at 16s.
pub fn backoff_delay(attempt: usize) -> Duration {
    let capped = attempt.min(5) as u32;
    Duration::from_millis(500 * (1 << capped))
}

/// Runs `op` up to `attempts` times, sleeping between attempts.
///
/// Only transient errors are retried; terminal errors surface immediately.
pub async fn with_retries<T, F, Fut>(operation: &str, attempts: usize, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = attempts.max(1);
    let mut attempt = 0usize;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt + 1 < attempts => {
                attempt += 1;
                let delay = backoff_delay(attempt);
                warn!(
                    operation,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient failure, retrying"
                );
                sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_backoff_growth_is_capped() {
        assert_eq!(backoff_delay(1), Duration::from_millis(1000));
        assert_eq!(backoff_delay(2), Duration::from_millis(2000));
        assert_eq!(backoff_delay(5), Duration::from_millis(16000));
        assert_eq!(backoff_delay(50), Duration::from_millis(16000));
    }

    #[tokio::test]
    async fn test_terminal_error_is_not_retried() {
        let calls = AtomicUsize::new(0);
        let result: Result<()> = with_retries("op", 5, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(PipelineError::EmptyFiling("x".to_string())) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_success_short_circuits() {
        let calls = AtomicUsize::new(0);
        let result = with_retries("op", 5, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(42) }
        })
        .await
        .unwrap();

        assert_eq!(result, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
