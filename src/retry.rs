use backoff::backoff::Backoff;
use std::{fmt::Display, future::Future, time::Duration};

/// Fixed-interval retry policy: at most `max_retries` extra attempts, `interval` apart.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    interval: Duration,
    retries_used: u32,
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, interval: Duration) -> Self {
        Self { max_retries, interval, retries_used: 0 }
    }

    #[cfg(test)]
    pub(crate) fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Runs `operation` until it succeeds, fails with an error `is_retryable` rejects,
    /// or the policy runs out of retries. The last error is returned.
    pub async fn run<T, E, Op, Fut, P>(&self, mut operation: Op, is_retryable: P) -> Result<T, E>
    where
        Op: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: Display,
    {
        let policy = Self::new(self.max_retries, self.interval);
        let is_retryable = &is_retryable;
        backoff::future::retry_notify(
            policy,
            move || {
                let attempt = operation();
                async move {
                    attempt.await.map_err(|err| {
                        if is_retryable(&err) {
                            backoff::Error::transient(err)
                        } else {
                            backoff::Error::permanent(err)
                        }
                    })
                }
            },
            |err: E, wait: Duration| {
                tracing::warn!(error = %err, wait_ms = wait.as_millis() as u64, "Retrying after failure");
            },
        )
        .await
    }
}

impl Backoff for RetryPolicy {
    fn reset(&mut self) {
        self.retries_used = 0;
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        if self.retries_used >= self.max_retries {
            return None;
        }
        self.retries_used += 1;
        Some(self.interval)
    }
}
