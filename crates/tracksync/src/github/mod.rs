//! GitHub REST API: request construction, page fetching and row mapping.

pub mod client;
pub mod convert;
pub mod issues;
pub mod pagination;
pub mod request;
pub mod types;

pub use client::{GitHubClient, parse_rate_limit_headers};
pub use convert::{IssueRow, PullRequestRow, RepoRow, Row, map_record, map_records};
pub use issues::{IssueUpdate, NewIssue, create_issue, update_issue};
pub use pagination::{LinkRelations, Page, parse_link_header};
pub use request::{ContinuationToken, FilterSet, IssueState, RequestBuilder, ResourceKind};
pub use types::RateLimitInfo;
