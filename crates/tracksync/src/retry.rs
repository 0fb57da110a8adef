//! Caller-level retry policy.
//!
//! The fetch path never retries on its own. Hosts that want backoff wrap a
//! step in [`with_retry`], which re-runs the same step (same continuation)
//! while the error is transient or a rate limit.

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};

use crate::error::{Result, SyncError, short_error_message};
use crate::sync::{ProgressCallback, SyncProgress, emit};

/// Initial backoff delay.
pub const INITIAL_BACKOFF_MS: u64 = 1000;

/// Backoff ceiling.
pub const MAX_BACKOFF_MS: u64 = 60_000;

/// Retries after the first attempt.
pub const MAX_RETRIES: usize = 5;

/// Configuration for retry operations.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Minimum delay between retries.
    pub min_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Maximum number of retry attempts.
    pub max_retries: usize,
    /// Whether to add jitter to delays.
    pub with_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(INITIAL_BACKOFF_MS),
            max_delay: Duration::from_millis(MAX_BACKOFF_MS),
            max_retries: MAX_RETRIES,
            with_jitter: true,
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn new(min_delay: Duration, max_delay: Duration, max_retries: usize) -> Self {
        Self {
            min_delay,
            max_delay,
            max_retries,
            with_jitter: true,
        }
    }

    /// A policy that gives up on the first failure.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.with_jitter = jitter;
        self
    }

    /// Build an exponential backoff strategy from this configuration.
    #[must_use]
    pub fn into_backoff(self) -> ExponentialBuilder {
        let mut builder = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries);

        if self.with_jitter {
            builder = builder.with_jitter();
        }

        builder
    }
}

/// Run `operation`, retrying while [`SyncError::is_retryable`] holds.
///
/// Authorization and validation failures are returned on the first attempt.
/// A rate limit that names its own wait ([`SyncError::retry_hint`]) is never
/// retried sooner than that, even past `max_delay`. Each backoff is reported
/// as [`SyncProgress::RetryBackoff`].
pub async fn with_retry<T, F, Fut>(
    mut operation: F,
    config: &RetryConfig,
    on_progress: Option<&ProgressCallback>,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempt = AtomicU32::new(0);

    let retry_op = || {
        attempt.fetch_add(1, Ordering::SeqCst);
        operation()
    };

    retry_op
        .retry(config.clone().into_backoff())
        .adjust(|err: &SyncError, delay: Option<Duration>| {
            // `None` means the retry budget is spent; a hint does not extend it.
            delay.map(|d| err.retry_hint().map_or(d, |hint| d.max(hint)))
        })
        .notify(|err: &SyncError, dur: Duration| {
            let current_attempt = attempt.load(Ordering::SeqCst);
            let reason = short_error_message(err);
            emit(
                on_progress,
                SyncProgress::RetryBackoff {
                    retry_after_ms: dur.as_millis() as u64,
                    attempt: current_attempt,
                    reason: reason.clone(),
                },
            );
            if err.is_rate_limited() {
                tracing::warn!(
                    "Rate limited, retrying in {:?} (attempt {}): {}",
                    dur,
                    current_attempt,
                    reason
                );
            } else {
                tracing::debug!(
                    "Transient failure, retrying in {:?} (attempt {}): {}",
                    dur,
                    current_attempt,
                    reason
                );
            }
        })
        .when(SyncError::is_retryable)
        .await
}
