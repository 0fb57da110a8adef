//! GitHub API data types.
//!
//! These structs deserialize the raw records returned by the REST API. Only
//! the fields the row mapper reads are declared; every field is optional at
//! this layer so that a missing required field is reported by name from
//! [`super::convert`] instead of as an opaque serde error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rate-limit metadata read from response headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RateLimitInfo {
    /// `x-ratelimit-limit`.
    pub limit: Option<u64>,
    /// `x-ratelimit-remaining`.
    pub remaining: Option<u64>,
    /// `x-ratelimit-reset`, as a timestamp.
    pub reset_at: Option<DateTime<Utc>>,
    /// `retry-after`, in seconds.
    pub retry_after: Option<u64>,
}

impl RateLimitInfo {
    /// True when no rate-limit header was present at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A user or organization as embedded in other records.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteUser {
    pub login: String,
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteLabel {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteMilestone {
    pub title: String,
    pub number: Option<u64>,
}

/// The slim repository object embedded in a branch ref.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteRepoSummary {
    pub full_name: Option<String>,
}

/// `base` / `head` of a pull request.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteBranchRef {
    #[serde(rename = "ref")]
    pub branch: Option<String>,
    pub sha: Option<String>,
    pub repo: Option<RemoteRepoSummary>,
}

/// Marker present on issue-list items that are really pull requests.
#[derive(Debug, Clone, Deserialize)]
pub struct RemotePullRequestMarker {
    pub html_url: Option<String>,
}

/// Repository record from `/user/repos`.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteRepo {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub html_url: Option<String>,
    pub owner: Option<RemoteUser>,
    pub description: Option<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub archived: bool,
    pub default_branch: Option<String>,
    pub language: Option<String>,
    pub stargazers_count: Option<u64>,
    pub forks_count: Option<u64>,
    pub open_issues_count: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub pushed_at: Option<DateTime<Utc>>,
}

/// Pull request record from `/repos/{owner}/{name}/pulls`.
#[derive(Debug, Clone, Deserialize)]
pub struct RemotePullRequest {
    pub id: Option<u64>,
    pub number: Option<u64>,
    pub html_url: Option<String>,
    pub title: Option<String>,
    pub state: Option<String>,
    #[serde(default)]
    pub draft: bool,
    pub body: Option<String>,
    pub user: Option<RemoteUser>,
    pub assignee: Option<RemoteUser>,
    pub assignees: Option<Vec<RemoteUser>>,
    pub labels: Option<Vec<RemoteLabel>>,
    pub milestone: Option<RemoteMilestone>,
    pub base: Option<RemoteBranchRef>,
    pub head: Option<RemoteBranchRef>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
}

/// Issue record from `/repos/{owner}/{name}/issues`.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteIssue {
    pub id: Option<u64>,
    pub number: Option<u64>,
    pub html_url: Option<String>,
    pub title: Option<String>,
    pub state: Option<String>,
    pub body: Option<String>,
    pub user: Option<RemoteUser>,
    pub assignee: Option<RemoteUser>,
    pub assignees: Option<Vec<RemoteUser>>,
    pub labels: Option<Vec<RemoteLabel>>,
    pub milestone: Option<RemoteMilestone>,
    pub comments: Option<u64>,
    pub pull_request: Option<RemotePullRequestMarker>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_ref_reads_ref_keyword() {
        let branch: RemoteBranchRef = serde_json::from_value(serde_json::json!({
            "ref": "main",
            "sha": "abc123",
            "repo": { "full_name": "acme/widgets" }
        }))
        .expect("branch ref should parse");
        assert_eq!(branch.branch.as_deref(), Some("main"));
        assert_eq!(
            branch.repo.and_then(|r| r.full_name).as_deref(),
            Some("acme/widgets")
        );
    }

    #[test]
    fn test_issue_tolerates_nulls_and_missing_fields() {
        let issue: RemoteIssue = serde_json::from_value(serde_json::json!({
            "id": 1,
            "number": 7,
            "assignee": null,
            "labels": null,
            "milestone": null
        }))
        .expect("sparse issue should parse");
        assert_eq!(issue.number, Some(7));
        assert!(issue.assignee.is_none());
        assert!(issue.labels.is_none());
        assert!(issue.assignees.is_none());
        assert!(issue.pull_request.is_none());
    }

    #[test]
    fn test_rate_limit_info_is_empty() {
        assert!(RateLimitInfo::default().is_empty());
        let info = RateLimitInfo {
            remaining: Some(0),
            ..RateLimitInfo::default()
        };
        assert!(!info.is_empty());
    }
}
