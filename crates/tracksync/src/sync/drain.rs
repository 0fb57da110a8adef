//! Drive repeated steps to the end, the way a host scheduler would.

use std::collections::HashSet;

use super::progress::{ProgressCallback, SyncProgress, emit};
use super::step::{SyncParams, sync_step};
use crate::error::{Result, SyncError};
use crate::github::{ContinuationToken, GitHubClient, ResourceKind, Row};
use crate::retry::{RetryConfig, with_retry};

/// Remembers every continuation handed out in one operation.
///
/// A service that links back to a page already fetched would otherwise keep
/// the loop alive forever.
#[derive(Debug, Default)]
pub(crate) struct CycleGuard {
    seen: HashSet<String>,
}

impl CycleGuard {
    pub(crate) fn check(&mut self, token: &ContinuationToken) -> Result<()> {
        if self.seen.insert(token.as_str().to_string()) {
            Ok(())
        } else {
            Err(SyncError::malformed(format!(
                "next-page link repeats an earlier page: {token}"
            )))
        }
    }
}

/// Fetch every page of `kind`, concatenating rows in page order.
///
/// Each step is wrapped in the retry policy; a step that still fails aborts
/// the whole operation without returning the rows gathered so far.
pub async fn sync_to_end(
    client: &GitHubClient,
    kind: ResourceKind,
    params: &SyncParams,
    retry: &RetryConfig,
    on_progress: Option<&ProgressCallback>,
) -> Result<Vec<Row>> {
    let mut rows: Vec<Row> = Vec::new();
    let mut continuation: Option<ContinuationToken> = None;
    let mut guard = CycleGuard::default();
    let mut step: u32 = 0;

    loop {
        step += 1;
        emit(
            on_progress,
            SyncProgress::StepStarted {
                kind,
                step,
                continuing: continuation.is_some(),
            },
        );

        let prior = continuation.as_ref();
        let output = with_retry(
            || sync_step(client, kind, params, prior),
            retry,
            on_progress,
        )
        .await?;

        let count = output.rows.len();
        rows.extend(output.rows);

        emit(
            on_progress,
            SyncProgress::PageFetched {
                kind,
                step,
                count,
                total_so_far: rows.len(),
                has_more: output.continuation.is_some(),
            },
        );

        match output.continuation {
            Some(next) => {
                guard.check(&next)?;
                continuation = Some(next);
            }
            None => break,
        }
    }

    tracing::debug!(kind = %kind, steps = step, total = rows.len(), "Sync drained");
    emit(
        on_progress,
        SyncProgress::SyncComplete {
            kind,
            steps: step,
            total: rows.len(),
        },
    );

    Ok(rows)
}
