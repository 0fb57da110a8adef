//! tracksync - resumable, stateless sync of GitHub repositories, pull
//! requests and issues into flat rows.
//!
//! A host asks for one page at a time with [`sync::sync_step`], stores the
//! returned [`github::ContinuationToken`], and passes it back on the next call
//! (possibly from another process). [`sync::sync_to_end`] drives those steps
//! in-process with a retry policy, and [`autocomplete::search_repos`] powers
//! repository pickers.
//!
//! ```ignore
//! use tracksync::{GitHubClient, RepoResolver, RequestBuilder, ResourceKind, SyncParams, sync_step};
//!
//! let client = GitHubClient::new(
//!     RequestBuilder::default().with_token(Some(token)),
//!     RepoResolver::default(),
//!     std::time::Duration::from_secs(30),
//! )?;
//! let params = SyncParams::for_repo("https://github.com/acme/widgets");
//! let first = sync_step(&client, ResourceKind::Issues, &params, None).await?;
//! if let Some(token) = &first.continuation {
//!     let next = sync_step(&client, ResourceKind::Issues, &params, Some(token)).await?;
//! }
//! ```

pub mod autocomplete;
pub mod error;
pub mod github;
pub mod http;
pub mod repo_ref;
pub mod retry;
pub mod sync;

pub use autocomplete::{RepoChoice, search_repos};
pub use error::{Result, SyncError, short_error_message};
pub use github::{
    ContinuationToken, FilterSet, GitHubClient, IssueRow, IssueState, IssueUpdate, NewIssue,
    PullRequestRow, RepoRow, RequestBuilder, ResourceKind, Row, create_issue, update_issue,
};
pub use repo_ref::{RepoResolver, RepositoryReference, resolve_repo_url};
pub use retry::{RetryConfig, with_retry};
pub use sync::{ProgressCallback, StepOutput, SyncParams, SyncProgress, sync_step, sync_to_end};
