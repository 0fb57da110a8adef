//! Progress reporting through structured logs.

use tracksync::{ProgressCallback, SyncProgress};

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: SyncProgress) {
        match event {
            SyncProgress::StepStarted {
                kind,
                step,
                continuing,
            } => {
                tracing::debug!(kind = %kind, step, continuing, "Fetching page");
            }

            SyncProgress::PageFetched {
                kind,
                step,
                count,
                total_so_far,
                has_more,
            } => {
                tracing::info!(kind = %kind, step, count, total_so_far, has_more, "Fetched page");
            }

            SyncProgress::RetryBackoff {
                retry_after_ms,
                attempt,
                reason,
            } => {
                tracing::warn!(retry_after_ms, attempt, reason = %reason, "Backing off");
            }

            SyncProgress::SyncComplete { kind, steps, total } => {
                tracing::info!(kind = %kind, steps, total, "Sync complete");
            }

            _ => {}
        }
    }

    /// Convert to a ProgressCallback for the library.
    pub fn into_callback(self) -> ProgressCallback {
        Box::new(move |event| self.handle(event))
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
