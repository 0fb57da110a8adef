//! Progress reporting for sync operations.

use crate::github::ResourceKind;

/// Progress events emitted while syncing.
///
/// Events are delivered to the caller's callback as they happen and are
/// never buffered by the library.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SyncProgress {
    /// About to fetch one page.
    StepStarted {
        kind: ResourceKind,
        /// Step number within the operation (1-indexed).
        step: u32,
        /// Whether this step resumes from a continuation token.
        continuing: bool,
    },

    /// Fetched and mapped one page.
    PageFetched {
        kind: ResourceKind,
        step: u32,
        /// Rows on this page.
        count: usize,
        /// Rows fetched so far in this operation.
        total_so_far: usize,
        /// Whether the service reported another page.
        has_more: bool,
    },

    /// A retryable failure; the same step will be attempted again.
    RetryBackoff {
        /// Delay before the next attempt.
        retry_after_ms: u64,
        /// Attempt that just failed (1-indexed).
        attempt: u32,
        /// Short description of the failure.
        reason: String,
    },

    /// Every page has been fetched.
    SyncComplete {
        kind: ResourceKind,
        steps: u32,
        total: usize,
    },
}

/// Callback for progress updates during sync operations.
pub type ProgressCallback = Box<dyn Fn(SyncProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: SyncProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}
