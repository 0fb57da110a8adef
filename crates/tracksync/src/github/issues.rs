//! Issue create/update actions.

use serde::Serialize;
use serde_json::Value;

use super::client::GitHubClient;
use super::convert::{IssueRow, to_issue_row};
use super::request::IssueState;
use super::types::RemoteIssue;
use crate::error::{Result, SyncError};
use crate::http::HttpMethod;

/// Fields for a new issue. Only `title` is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewIssue {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<String>,
}

/// A partial issue update. Unset fields are left untouched on the service;
/// `Some(vec![])` clears labels or assignees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IssueUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<IssueState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<String>>,
}

impl IssueUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Create an issue in the repository at `repo_url`.
pub async fn create_issue(
    client: &GitHubClient,
    repo_url: &str,
    issue: &NewIssue,
) -> Result<IssueRow> {
    if issue.title.trim().is_empty() {
        return Err(SyncError::invalid_parameter("title", "must not be empty"));
    }

    let repo = client.resolver().resolve(repo_url)?;
    let path = format!("/repos/{}/{}/issues", repo.owner, repo.name);
    let body = to_json(issue)?;

    let request = client
        .requests()
        .json_request(HttpMethod::Post, &path, &body)?;
    let created = client.send_json(request).await?;

    tracing::info!(repo = %repo, title = %issue.title, "Created issue");
    decode_issue(&created)
}

/// Apply `update` to issue `number` in the repository at `repo_url`.
pub async fn update_issue(
    client: &GitHubClient,
    repo_url: &str,
    number: u64,
    update: &IssueUpdate,
) -> Result<IssueRow> {
    if update.is_empty() {
        return Err(SyncError::invalid_parameter(
            "update",
            "at least one field must be set",
        ));
    }
    if update.state == Some(IssueState::All) {
        return Err(SyncError::invalid_parameter(
            "state",
            "must be open or closed",
        ));
    }
    if let Some(title) = &update.title
        && title.trim().is_empty()
    {
        return Err(SyncError::invalid_parameter("title", "must not be empty"));
    }

    let repo = client.resolver().resolve(repo_url)?;
    let path = format!("/repos/{}/{}/issues/{number}", repo.owner, repo.name);
    let body = to_json(update)?;

    let request = client
        .requests()
        .json_request(HttpMethod::Patch, &path, &body)?;
    let updated = client.send_json(request).await?;

    tracing::info!(repo = %repo, number, "Updated issue");
    decode_issue(&updated)
}

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| SyncError::invalid_parameter("body", e.to_string()))
}

fn decode_issue(value: &Value) -> Result<IssueRow> {
    let issue: RemoteIssue = serde_json::from_value(value.clone())
        .map_err(|e| SyncError::malformed(format!("invalid issue record: {e}")))?;
    to_issue_row(&issue)
}
