//! Construction of outbound list requests.
//!
//! The first page of a sync is built from the resource kind, the resolved
//! repository and the filters. Every later page is built from the
//! continuation token alone: the token is the service's own next-page URL and
//! already encodes the filters, so they are never applied a second time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, SyncError};
use crate::http::{HttpHeaders, HttpMethod, HttpRequest};
use crate::repo_ref::RepositoryReference;

/// Public GitHub REST API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// REST API version pinned on every request.
pub const API_VERSION: &str = "2022-11-28";

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = "tracksync";

/// Largest page the API serves.
pub const MAX_PER_PAGE: u8 = 100;

/// The resources a sync can list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Repos,
    PullRequests,
    Issues,
}

impl ResourceKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Repos => "repos",
            ResourceKind::PullRequests => "pull_requests",
            ResourceKind::Issues => "issues",
        }
    }

    /// Whether listing this kind needs a repository reference.
    #[must_use]
    pub fn requires_repo(self) -> bool {
        !matches!(self, ResourceKind::Repos)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "repos" | "repositories" => Ok(ResourceKind::Repos),
            "pulls" | "pull_requests" | "prs" => Ok(ResourceKind::PullRequests),
            "issues" => Ok(ResourceKind::Issues),
            _ => Err(SyncError::UnsupportedResource(s.to_string())),
        }
    }
}

/// The `state` filter for pull requests and issues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    #[default]
    Open,
    Closed,
    All,
}

impl IssueState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
            IssueState::All => "all",
        }
    }
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueState {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(IssueState::Open),
            "closed" => Ok(IssueState::Closed),
            "all" => Ok(IssueState::All),
            other => Err(SyncError::invalid_parameter(
                "state",
                format!("expected open, closed or all, got '{other}'"),
            )),
        }
    }
}

/// Filters applied to the first page of a sync.
///
/// Kinds ignore filters that do not apply to them: `base` is for pull
/// requests, `labels` and `assignee` for issues, and repos take none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    /// Defaults to [`IssueState::Open`] when unset.
    pub state: Option<IssueState>,
    /// Base branch of pull requests.
    pub base: Option<String>,
    /// Issue labels; all must match.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Issue assignee login (`none` and `*` are understood by the service).
    pub assignee: Option<String>,
}

/// Opaque "resume here" value handed back to the caller between steps.
///
/// In practice the service's next-page URL. Callers store and replay it
/// unchanged; it carries no expiring credentials.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds list and mutation requests against one API base.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    api_url: String,
    token: Option<String>,
    user_agent: String,
    per_page: u8,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl RequestBuilder {
    /// Create a builder for `api_url` (e.g. `https://api.github.com` or
    /// `https://git.example.com/api/v3`). Scheme and host are lowercased and
    /// trailing slashes trimmed, so the service's own next links match it.
    pub fn new(api_url: &str) -> Self {
        let raw = api_url.trim();
        let normalized = Url::parse(raw).map_or_else(|_| raw.to_string(), String::from);
        Self {
            api_url: normalized.trim_end_matches('/').to_string(),
            token: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            per_page: MAX_PER_PAGE,
        }
    }

    /// Authenticate requests with a bearer token. Surrounding whitespace
    /// (a trailing newline from a token file) is dropped.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Page size for first-page requests, clamped to `1..=100`.
    #[must_use]
    pub fn with_per_page(mut self, per_page: u8) -> Self {
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    #[must_use]
    pub fn per_page(&self) -> u8 {
        self.per_page
    }

    /// Build the request for one page.
    ///
    /// Without a continuation this is the filtered first page of `kind`.
    /// With one, `repo` and `filters` are ignored and the token URL is
    /// requested verbatim, so two calls with the same token produce equal
    /// requests whatever filters they were given.
    pub fn build(
        &self,
        kind: ResourceKind,
        repo: Option<&RepositoryReference>,
        filters: &FilterSet,
        continuation: Option<&ContinuationToken>,
    ) -> Result<HttpRequest> {
        self.check_header_values()?;
        let url = match continuation {
            Some(token) => self.check_continuation(token)?.to_string(),
            None => self.first_page_url(kind, repo, filters)?,
        };

        Ok(HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: self.headers(false),
            body: Vec::new(),
        })
    }

    /// Build a JSON request against a path under the API base.
    pub fn json_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<HttpRequest> {
        self.check_header_values()?;
        let body = serde_json::to_vec(body)
            .map_err(|e| SyncError::invalid_parameter("body", e.to_string()))?;
        Ok(HttpRequest {
            method,
            url: format!("{}{}", self.api_url, path),
            headers: self.headers(true),
            body,
        })
    }

    fn first_page_url(
        &self,
        kind: ResourceKind,
        repo: Option<&RepositoryReference>,
        filters: &FilterSet,
    ) -> Result<String> {
        let path = match (kind, repo) {
            (ResourceKind::Repos, _) => "/user/repos".to_string(),
            (ResourceKind::PullRequests, Some(repo)) => {
                format!("/repos/{}/{}/pulls", repo.owner, repo.name)
            }
            (ResourceKind::Issues, Some(repo)) => {
                format!("/repos/{}/{}/issues", repo.owner, repo.name)
            }
            (_, None) => {
                return Err(SyncError::invalid_reference(
                    "",
                    format!("listing {kind} requires a repository URL"),
                ));
            }
        };

        let mut url = Url::parse(&format!("{}{}", self.api_url, path)).map_err(|e| {
            SyncError::invalid_parameter("api_url", format!("'{}': {e}", self.api_url))
        })?;

        {
            let mut query = url.query_pairs_mut();
            match kind {
                ResourceKind::Repos => {}
                ResourceKind::PullRequests => {
                    query.append_pair("state", filters.state.unwrap_or_default().as_str());
                    if let Some(base) = filters.base.as_deref().filter(|b| !b.is_empty()) {
                        query.append_pair("base", base);
                    }
                }
                ResourceKind::Issues => {
                    query.append_pair("state", filters.state.unwrap_or_default().as_str());
                    let labels: Vec<&str> = filters
                        .labels
                        .iter()
                        .map(|l| l.trim())
                        .filter(|l| !l.is_empty())
                        .collect();
                    if !labels.is_empty() {
                        query.append_pair("labels", &labels.join(","));
                    }
                    if let Some(assignee) = filters.assignee.as_deref().filter(|a| !a.is_empty())
                    {
                        query.append_pair("assignee", assignee);
                    }
                }
            }
            query.append_pair("per_page", &self.per_page.to_string());
        }

        Ok(url.to_string())
    }

    /// A token must be an absolute URL under the configured API base, so a
    /// forged token can never carry credentials to another host.
    fn check_continuation<'t>(&self, token: &'t ContinuationToken) -> Result<&'t str> {
        let raw = token.as_str();
        Url::parse(raw)
            .map_err(|e| SyncError::invalid_continuation(format!("not an absolute URL ({e})")))?;

        let prefix = format!("{}/", self.api_url);
        if !raw.starts_with(&prefix) {
            return Err(SyncError::invalid_continuation(format!(
                "token does not point under {}",
                self.api_url
            )));
        }
        Ok(raw)
    }

    /// Control characters cannot go into a header value; reject them here
    /// instead of letting the transport fail on every attempt.
    fn check_header_values(&self) -> Result<()> {
        let values = [
            ("token", self.token.as_deref()),
            ("user_agent", Some(self.user_agent.as_str())),
        ];
        for (name, value) in values {
            if value.is_some_and(|v| v.chars().any(char::is_control)) {
                return Err(SyncError::invalid_parameter(
                    name,
                    "contains control characters",
                ));
            }
        }
        Ok(())
    }

    fn headers(&self, with_body: bool) -> HttpHeaders {
        let mut headers = vec![
            (
                "Accept".to_string(),
                "application/vnd.github+json".to_string(),
            ),
            ("X-GitHub-Api-Version".to_string(), API_VERSION.to_string()),
            ("User-Agent".to_string(), self.user_agent.clone()),
        ];
        if let Some(token) = &self.token {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        if with_body {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        headers
    }
}
