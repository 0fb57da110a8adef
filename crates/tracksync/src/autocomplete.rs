//! Repository autocomplete.
//!
//! Unlike a sync, the search drives every page itself before filtering, so
//! the host gets one complete answer per keystroke.

use serde::Serialize;

use crate::error::Result;
use crate::github::{ContinuationToken, GitHubClient, ResourceKind, Row};
use crate::sync::{CycleGuard, SyncParams, sync_step};

/// One autocomplete entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoChoice {
    /// `owner/name`, shown to the user.
    pub display: String,
    /// Repository web URL, fed back as a sync's repository parameter.
    pub value: String,
}

/// List every repository visible to the client and keep those whose
/// `owner/name` contains `text`, ignoring case.
///
/// Matches keep the service's order. An empty `text` matches everything. Any
/// failed page fails the search; a partial list is never returned.
pub async fn search_repos(client: &GitHubClient, text: &str) -> Result<Vec<RepoChoice>> {
    let needle = text.trim().to_lowercase();
    let params = SyncParams::default();
    let mut choices = Vec::new();
    let mut continuation: Option<ContinuationToken> = None;
    let mut guard = CycleGuard::default();
    let mut pages = 0u32;

    loop {
        let output = sync_step(client, ResourceKind::Repos, &params, continuation.as_ref()).await?;
        pages += 1;

        choices.extend(output.rows.into_iter().filter_map(|row| match row {
            Row::Repo(repo) if repo.full_name.to_lowercase().contains(&needle) => {
                Some(RepoChoice {
                    display: repo.full_name,
                    value: repo.url,
                })
            }
            _ => None,
        }));

        match output.continuation {
            Some(next) => {
                guard.check(&next)?;
                continuation = Some(next);
            }
            None => break,
        }
    }

    tracing::debug!(query = %text, pages, matches = choices.len(), "Repository search");
    Ok(choices)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::SyncError;
    use crate::github::RequestBuilder;
    use crate::http::{HttpMethod, MockTransport, canned};
    use crate::repo_ref::RepoResolver;

    const FIRST: &str = "https://api.github.com/user/repos?per_page=100";
    const SECOND: &str = "https://api.github.com/user/repos?per_page=100&page=2";

    fn client(transport: &MockTransport) -> GitHubClient {
        GitHubClient::new_with_transport(
            RequestBuilder::default(),
            RepoResolver::default(),
            Arc::new(transport.clone()),
        )
    }

    fn repos(names: &[&str]) -> String {
        serde_json::Value::Array(
            names
                .iter()
                .enumerate()
                .map(|(i, full)| {
                    let name = full.split('/').nth(1).unwrap_or(full);
                    serde_json::json!({
                        "id": i + 1,
                        "name": name,
                        "full_name": full,
                        "html_url": format!("https://github.com/{full}")
                    })
                })
                .collect(),
        )
        .to_string()
    }

    fn two_pages(transport: &MockTransport) {
        let link = format!("<{SECOND}>; rel=\"next\"");
        transport.push_response(
            HttpMethod::Get,
            FIRST,
            canned(
                200,
                &[("Link", link.as_str())],
                repos(&["acme/Widgets", "acme/gears", "other/widget-docs"]),
            ),
        );
        transport.push_response(
            HttpMethod::Get,
            SECOND,
            canned(200, &[], repos(&["zeta/WIDGETS-legacy", "zeta/misc"])),
        );
    }

    #[tokio::test]
    async fn test_search_spans_all_pages_case_insensitively() {
        let transport = MockTransport::new();
        two_pages(&transport);

        let choices = search_repos(&client(&transport), "Widget").await.unwrap();
        let names: Vec<&str> = choices.iter().map(|c| c.display.as_str()).collect();
        assert_eq!(
            names,
            vec!["acme/Widgets", "other/widget-docs", "zeta/WIDGETS-legacy"]
        );
        assert_eq!(choices[0].value, "https://github.com/acme/Widgets");
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_query_returns_everything() {
        let transport = MockTransport::new();
        two_pages(&transport);

        let choices = search_repos(&client(&transport), "").await.unwrap();
        assert_eq!(choices.len(), 5);
    }

    #[tokio::test]
    async fn test_no_match_is_empty() {
        let transport = MockTransport::new();
        two_pages(&transport);

        assert!(search_repos(&client(&transport), "nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_page_fails_search() {
        let transport = MockTransport::new();
        let link = format!("<{SECOND}>; rel=\"next\"");
        transport.push_response(
            HttpMethod::Get,
            FIRST,
            canned(200, &[("Link", link.as_str())], repos(&["acme/widgets"])),
        );
        transport.push_failure(HttpMethod::Get, SECOND, "connection reset");

        let err = search_repos(&client(&transport), "widgets")
            .await
            .expect_err("a failed page must not look like an empty result");
        assert!(matches!(err, SyncError::TransientFetch { .. }));
    }

    #[tokio::test]
    async fn test_self_referencing_next_link_is_rejected() {
        let transport = MockTransport::new();
        let link = format!("<{SECOND}>; rel=\"next\"");
        transport.push_response(
            HttpMethod::Get,
            FIRST,
            canned(200, &[("Link", link.as_str())], repos(&["acme/a"])),
        );
        transport.push_response(
            HttpMethod::Get,
            SECOND,
            canned(200, &[("Link", link.as_str())], repos(&["acme/b"])),
        );

        let err = search_repos(&client(&transport), "acme")
            .await
            .expect_err("cycle should fail");
        assert!(matches!(err, SyncError::MalformedResponse { .. }));
    }
}
