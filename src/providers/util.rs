use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Retry policy for transient upstream failures. Only the request itself is
/// retried; a non-success HTTP status is not transient and fails fast.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    pub retries: usize,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            retries: 2,
            delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    pub async fn run<F, Fut, T>(&self, mut request: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, reqwest::Error>>,
    {
        let mut remaining = self.retries;
        loop {
            match request().await {
                Ok(val) => return Ok(val),
                Err(err) if remaining > 0 => {
                    debug!(error = %err, remaining, "Transient request failure, retrying");
                    remaining -= 1;
                    tokio::time::sleep(self.delay).await;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let calls = AtomicUsize::new(0);
        let policy = RetryPolicy {
            retries: 3,
            delay: Duration::from_millis(1),
        };
        let result: Result<i32> = policy
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(7) }
            })
            .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exhausted_retries_return_last_error() {
        let calls = AtomicUsize::new(0);
        let policy = RetryPolicy {
            retries: 2,
            delay: Duration::from_millis(1),
        };
        // Nothing listens on the discard port, so every attempt fails.
        let client = reqwest::Client::new();
        let result = policy
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                client.get("http://127.0.0.1:9/").send()
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
