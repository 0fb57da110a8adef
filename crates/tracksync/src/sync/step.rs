//! One stateless sync step: fetch a single page and hand back where to resume.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};
use crate::github::{
    ContinuationToken, FilterSet, GitHubClient, ResourceKind, Row, map_records,
};

/// Parameters of a logical sync, as supplied by the host.
///
/// Only read on the first step. Continuing steps ignore them entirely: the
/// continuation token already encodes the repository and filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncParams {
    /// Repository URL. Required for pull requests and issues.
    pub repo_url: Option<String>,
    #[serde(default)]
    pub filters: FilterSet,
}

impl SyncParams {
    pub fn for_repo(repo_url: impl Into<String>) -> Self {
        Self {
            repo_url: Some(repo_url.into()),
            filters: FilterSet::default(),
        }
    }

    #[must_use]
    pub fn with_filters(mut self, filters: FilterSet) -> Self {
        self.filters = filters;
        self
    }
}

/// Result of one step.
///
/// `continuation` is `None` exactly when there is nothing left to fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutput {
    pub rows: Vec<Row>,
    pub continuation: Option<ContinuationToken>,
}

impl StepOutput {
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.continuation.is_none()
    }
}

/// Run one step of a sync.
///
/// With no `prior` continuation this resolves the repository and requests the
/// filtered first page. With one, resolution and filters are skipped and the
/// token is requested as-is. Exactly one network call either way; nothing is
/// kept between calls, so any process may run the next step.
pub async fn sync_step(
    client: &GitHubClient,
    kind: ResourceKind,
    params: &SyncParams,
    prior: Option<&ContinuationToken>,
) -> Result<StepOutput> {
    let repo = match prior {
        None if kind.requires_repo() => {
            let url = params.repo_url.as_deref().ok_or_else(|| {
                SyncError::invalid_reference("", format!("listing {kind} requires a repository URL"))
            })?;
            Some(client.resolver().resolve(url)?)
        }
        _ => None,
    };

    let request = client
        .requests()
        .build(kind, repo.as_ref(), &params.filters, prior)?;
    let page = client.fetch_page(request).await?;
    let rows = map_records(kind, &page.records)?;

    Ok(StepOutput {
        rows,
        continuation: page.continuation,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::github::{IssueState, RequestBuilder};
    use crate::http::{HttpMethod, MockTransport, canned};
    use crate::repo_ref::RepoResolver;

    const FIRST: &str = "https://api.github.com/repos/acme/widgets/issues?state=open&per_page=100";
    const SECOND: &str =
        "https://api.github.com/repositories/77/issues?state=open&per_page=100&page=2";

    fn client(transport: &MockTransport) -> GitHubClient {
        GitHubClient::new_with_transport(
            RequestBuilder::default(),
            RepoResolver::default(),
            Arc::new(transport.clone()),
        )
    }

    fn issue(number: u64) -> serde_json::Value {
        serde_json::json!({
            "id": 1000 + number,
            "number": number,
            "title": format!("Issue {number}"),
            "html_url": format!("https://github.com/acme/widgets/issues/{number}"),
            "state": "open"
        })
    }

    fn body(numbers: &[u64]) -> String {
        serde_json::Value::Array(numbers.iter().map(|n| issue(*n)).collect()).to_string()
    }

    fn open_issues() -> SyncParams {
        SyncParams::for_repo("https://github.com/acme/widgets").with_filters(FilterSet {
            state: Some(IssueState::Open),
            ..FilterSet::default()
        })
    }

    #[tokio::test]
    async fn test_two_page_issue_sync() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Get,
            FIRST,
            canned(
                200,
                &[("Link", format!("<{SECOND}>; rel=\"next\", <{SECOND}>; rel=\"last\"").as_str())],
                body(&[1, 2]),
            ),
        );
        transport.push_response(
            HttpMethod::Get,
            SECOND,
            canned(
                200,
                &[("Link", format!("<{FIRST}>; rel=\"prev\"").as_str())],
                body(&[3]),
            ),
        );
        let client = client(&transport);
        let params = open_issues();

        let first = sync_step(&client, ResourceKind::Issues, &params, None)
            .await
            .unwrap();
        assert_eq!(first.rows.len(), 2);
        let token = first.continuation.clone().expect("first page has a successor");
        assert_eq!(token.as_str(), SECOND);

        let second = sync_step(&client, ResourceKind::Issues, &params, Some(&token))
            .await
            .unwrap();
        assert_eq!(second.rows.iter().map(Row::number).collect::<Vec<_>>(), vec![Some(3)]);
        assert!(second.is_last());

        let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(urls, vec![FIRST.to_string(), SECOND.to_string()]);
    }

    #[tokio::test]
    async fn test_continuing_step_skips_resolution() {
        let transport = MockTransport::new();
        transport.push_response(HttpMethod::Get, SECOND, canned(200, &[], body(&[3])));

        let params = SyncParams::for_repo("not a url at all");
        let output = sync_step(
            &client(&transport),
            ResourceKind::Issues,
            &params,
            Some(&ContinuationToken::new(SECOND)),
        )
        .await
        .unwrap();
        assert_eq!(output.rows.len(), 1);
    }

    #[tokio::test]
    async fn test_initial_step_rejects_bad_repo_url_without_request() {
        let transport = MockTransport::new();
        let err = sync_step(
            &client(&transport),
            ResourceKind::PullRequests,
            &SyncParams::for_repo("https://github.com/acme"),
            None,
        )
        .await
        .expect_err("bad repo url should fail");
        assert!(matches!(err, SyncError::InvalidReference { .. }));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_initial_step_requires_repo_url_for_issues() {
        let transport = MockTransport::new();
        let err = sync_step(
            &client(&transport),
            ResourceKind::Issues,
            &SyncParams::default(),
            None,
        )
        .await
        .expect_err("missing repo url should fail");
        assert!(matches!(err, SyncError::InvalidReference { .. }));
    }

    #[tokio::test]
    async fn test_repos_step_needs_no_repo_url() {
        let url = "https://api.github.com/user/repos?per_page=100";
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Get,
            url,
            canned(
                200,
                &[],
                r#"[{"id": 1, "name": "widgets", "full_name": "acme/widgets", "html_url": "https://github.com/acme/widgets"}]"#,
            ),
        );

        let output = sync_step(
            &client(&transport),
            ResourceKind::Repos,
            &SyncParams::default(),
            None,
        )
        .await
        .unwrap();
        assert_eq!(output.rows.len(), 1);
        assert!(output.is_last());
    }

    #[tokio::test]
    async fn test_empty_last_page_is_not_an_error() {
        let transport = MockTransport::new();
        transport.push_response(HttpMethod::Get, FIRST, canned(200, &[], ""));

        let output = sync_step(&client(&transport), ResourceKind::Issues, &open_issues(), None)
            .await
            .unwrap();
        assert!(output.rows.is_empty());
        assert!(output.is_last());
    }

    #[tokio::test]
    async fn test_bad_record_fails_the_whole_step() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Get,
            FIRST,
            canned(200, &[], r#"[{"id": 1, "number": 1, "html_url": "u"}, {"id": 2}]"#),
        );

        let err = sync_step(&client(&transport), ResourceKind::Issues, &open_issues(), None)
            .await
            .expect_err("record without number should fail");
        assert!(matches!(err, SyncError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_step_output_serializes_for_the_host() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Get,
            FIRST,
            canned(200, &[("Link", format!("<{SECOND}>; rel=\"next\"").as_str())], body(&[5])),
        );

        let output = sync_step(&client(&transport), ResourceKind::Issues, &open_issues(), None)
            .await
            .unwrap();
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["continuation"], SECOND);
        assert_eq!(json["rows"][0]["number"], 5);
    }
}
