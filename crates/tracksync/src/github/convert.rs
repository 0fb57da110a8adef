//! Projection of raw GitHub records into flat table rows.
//!
//! Every function here is pure: the same record always maps to the same row.
//! Absent optional data (assignee, labels, milestone, branch refs) becomes
//! `None` or an empty list. A missing identifying field is an error naming the
//! field, never a silently dropped row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::request::ResourceKind;
use super::types::{RemoteBranchRef, RemoteIssue, RemotePullRequest, RemoteRepo, RemoteUser};
use crate::error::{Result, SyncError};

/// A repository row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRow {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub owner: Option<String>,
    pub url: String,
    pub description: Option<String>,
    pub is_private: bool,
    pub is_fork: bool,
    pub is_archived: bool,
    pub default_branch: Option<String>,
    pub language: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub open_issues: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub pushed_at: Option<DateTime<Utc>>,
}

/// A pull request row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRow {
    pub id: u64,
    pub number: u64,
    pub title: Option<String>,
    pub url: String,
    pub state: Option<String>,
    pub is_draft: bool,
    pub body: Option<String>,
    pub author: Option<String>,
    pub assignees: Vec<String>,
    pub labels: Vec<String>,
    pub milestone: Option<String>,
    pub base_branch: Option<String>,
    pub base_repo: Option<String>,
    pub head_branch: Option<String>,
    pub head_repo: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
}

/// An issue row.
///
/// The issues endpoint also lists pull requests; those rows are kept and
/// flagged with `is_pull_request`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRow {
    pub id: u64,
    pub number: u64,
    pub title: Option<String>,
    pub url: String,
    pub state: Option<String>,
    pub body: Option<String>,
    pub author: Option<String>,
    pub assignees: Vec<String>,
    pub labels: Vec<String>,
    pub milestone: Option<String>,
    pub comments: u64,
    pub is_pull_request: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// One mapped row of any resource kind. Serializes as the bare row object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Row {
    Repo(RepoRow),
    PullRequest(PullRequestRow),
    Issue(IssueRow),
}

impl Row {
    /// The service's stable record id.
    #[must_use]
    pub fn id(&self) -> u64 {
        match self {
            Row::Repo(r) => r.id,
            Row::PullRequest(r) => r.id,
            Row::Issue(r) => r.id,
        }
    }

    /// The per-repository number of a pull request or issue.
    #[must_use]
    pub fn number(&self) -> Option<u64> {
        match self {
            Row::Repo(_) => None,
            Row::PullRequest(r) => Some(r.number),
            Row::Issue(r) => Some(r.number),
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Row::Repo(r) => &r.url,
            Row::PullRequest(r) => &r.url,
            Row::Issue(r) => &r.url,
        }
    }
}

/// Map one raw record of `kind` into its row.
pub fn map_record(kind: ResourceKind, record: &Value) -> Result<Row> {
    match kind {
        ResourceKind::Repos => decode::<RemoteRepo>(record, "repository")
            .and_then(|r| to_repo_row(&r))
            .map(Row::Repo),
        ResourceKind::PullRequests => decode::<RemotePullRequest>(record, "pull request")
            .and_then(|r| to_pull_request_row(&r))
            .map(Row::PullRequest),
        ResourceKind::Issues => decode::<RemoteIssue>(record, "issue")
            .and_then(|r| to_issue_row(&r))
            .map(Row::Issue),
    }
}

/// Map every record of a page, stopping at the first bad one.
pub fn map_records(kind: ResourceKind, records: &[Value]) -> Result<Vec<Row>> {
    records.iter().map(|r| map_record(kind, r)).collect()
}

/// Convert a repository record.
pub fn to_repo_row(repo: &RemoteRepo) -> Result<RepoRow> {
    const RECORD: &str = "repository";
    Ok(RepoRow {
        id: required(repo.id, "id", RECORD)?,
        name: required(repo.name.clone(), "name", RECORD)?,
        full_name: required(repo.full_name.clone(), "full_name", RECORD)?,
        owner: repo.owner.as_ref().map(|o| o.login.clone()),
        url: required(repo.html_url.clone(), "html_url", RECORD)?,
        description: repo.description.clone(),
        is_private: repo.private,
        is_fork: repo.fork,
        is_archived: repo.archived,
        default_branch: repo.default_branch.clone(),
        language: repo.language.clone(),
        stars: repo.stargazers_count.unwrap_or(0),
        forks: repo.forks_count.unwrap_or(0),
        open_issues: repo.open_issues_count.unwrap_or(0),
        created_at: repo.created_at,
        updated_at: repo.updated_at,
        pushed_at: repo.pushed_at,
    })
}

/// Convert a pull request record.
pub fn to_pull_request_row(pr: &RemotePullRequest) -> Result<PullRequestRow> {
    const RECORD: &str = "pull request";
    let (base_branch, base_repo) = branch_parts(pr.base.as_ref());
    let (head_branch, head_repo) = branch_parts(pr.head.as_ref());

    Ok(PullRequestRow {
        id: required(pr.id, "id", RECORD)?,
        number: required(pr.number, "number", RECORD)?,
        title: pr.title.clone(),
        url: required(pr.html_url.clone(), "html_url", RECORD)?,
        state: pr.state.clone(),
        is_draft: pr.draft,
        body: pr.body.clone(),
        author: pr.user.as_ref().map(|u| u.login.clone()),
        assignees: merge_assignees(pr.assignees.as_deref(), pr.assignee.as_ref()),
        labels: label_names(pr.labels.as_deref()),
        milestone: pr.milestone.as_ref().map(|m| m.title.clone()),
        base_branch,
        base_repo,
        head_branch,
        head_repo,
        created_at: pr.created_at,
        updated_at: pr.updated_at,
        closed_at: pr.closed_at,
        merged_at: pr.merged_at,
    })
}

/// Convert an issue record.
pub fn to_issue_row(issue: &RemoteIssue) -> Result<IssueRow> {
    const RECORD: &str = "issue";
    Ok(IssueRow {
        id: required(issue.id, "id", RECORD)?,
        number: required(issue.number, "number", RECORD)?,
        title: issue.title.clone(),
        url: required(issue.html_url.clone(), "html_url", RECORD)?,
        state: issue.state.clone(),
        body: issue.body.clone(),
        author: issue.user.as_ref().map(|u| u.login.clone()),
        assignees: merge_assignees(issue.assignees.as_deref(), issue.assignee.as_ref()),
        labels: label_names(issue.labels.as_deref()),
        milestone: issue.milestone.as_ref().map(|m| m.title.clone()),
        comments: issue.comments.unwrap_or(0),
        is_pull_request: issue.pull_request.is_some(),
        created_at: issue.created_at,
        updated_at: issue.updated_at,
        closed_at: issue.closed_at,
    })
}

fn decode<'a, T: Deserialize<'a>>(record: &'a Value, name: &str) -> Result<T> {
    T::deserialize(record).map_err(|e| SyncError::malformed(format!("invalid {name} record: {e}")))
}

fn required<T>(value: Option<T>, field: &str, record: &str) -> Result<T> {
    value.ok_or_else(|| SyncError::missing_field(field, record))
}

/// Array order first, then the singular `assignee` if it is not already listed.
fn merge_assignees(many: Option<&[RemoteUser]>, one: Option<&RemoteUser>) -> Vec<String> {
    let mut logins: Vec<String> = Vec::new();
    for user in many.unwrap_or_default().iter().chain(one) {
        if !logins.contains(&user.login) {
            logins.push(user.login.clone());
        }
    }
    logins
}

fn label_names(labels: Option<&[super::types::RemoteLabel]>) -> Vec<String> {
    labels
        .unwrap_or_default()
        .iter()
        .map(|l| l.name.clone())
        .collect()
}

fn branch_parts(branch: Option<&RemoteBranchRef>) -> (Option<String>, Option<String>) {
    match branch {
        Some(b) => (
            b.branch.clone(),
            b.repo.as_ref().and_then(|r| r.full_name.clone()),
        ),
        None => (None, None),
    }
}
