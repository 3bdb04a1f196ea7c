//! Bounded retry for remote mutations
//!
//! Wraps [`backoff::ExponentialBackoff`] with a hard cap on the number of
//! retries. Only errors for which [`Error::is_transient`] holds are retried.

use std::future::Future;
use std::time::Duration;

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use vault_meta::RetrySettings;

use crate::{Error, Result};

/// How many times, and how patiently, a failed mutation is retried.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_interval: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            initial_interval: Duration::from_millis(settings.initial_interval_ms),
            multiplier: 2.0,
        }
    }
}

/// Exponential backoff that gives up after a fixed number of retries.
struct BoundedBackoff {
    inner: ExponentialBackoff,
    max_retries: u32,
    remaining: u32,
}

impl Backoff for BoundedBackoff {
    fn next_backoff(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.inner.next_backoff()
    }

    fn reset(&mut self) {
        self.remaining = self.max_retries;
        self.inner.reset();
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    fn backoff(&self) -> BoundedBackoff {
        let inner = ExponentialBackoff {
            initial_interval: self.initial_interval,
            current_interval: self.initial_interval,
            multiplier: self.multiplier,
            randomization_factor: 0.0,
            max_elapsed_time: None,
            ..ExponentialBackoff::default()
        };
        BoundedBackoff {
            inner,
            max_retries: self.max_retries,
            remaining: self.max_retries,
        }
    }

    /// Run `operation`, retrying transient failures.
    ///
    /// The final error is returned unchanged once retries are exhausted or a
    /// permanent error occurs.
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        backoff::future::retry_notify(
            self.backoff(),
            || {
                let attempt = operation();
                async move {
                    attempt.await.map_err(|err| {
                        if err.is_transient() {
                            backoff::Error::transient(err)
                        } else {
                            backoff::Error::permanent(err)
                        }
                    })
                }
            },
            |err: Error, delay: Duration| {
                tracing::warn!(
                    operation = label,
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying after transient failure"
                );
            },
        )
        .await
    }
}
