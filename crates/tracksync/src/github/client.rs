//! GitHub API client: one request in, one decoded page out.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use serde_json::Value;

use super::pagination::{Page, parse_link_header};
use super::request::RequestBuilder;
use super::types::RateLimitInfo;
use crate::error::{Result, SyncError};
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpError, HttpHeaders, HttpRequest, HttpResponse, HttpTransport, header_get};
use crate::repo_ref::RepoResolver;

/// Default transport timeout.
pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// GitHub API client.
///
/// Holds everything a step needs besides its parameters: the transport, the
/// request builder (API base, token, page size) and the repository resolver
/// for the matching web host. Cheap to clone; holds no per-sync state.
#[derive(Clone)]
pub struct GitHubClient {
    transport: Arc<dyn HttpTransport>,
    requests: RequestBuilder,
    resolver: RepoResolver,
}

impl GitHubClient {
    /// Create a client backed by reqwest with the given request timeout.
    pub fn new(
        requests: RequestBuilder,
        resolver: RepoResolver,
        timeout: StdDuration,
    ) -> Result<Self> {
        let transport = ReqwestTransport::with_timeout(timeout)
            .map_err(|e| SyncError::transient(e.to_string()))?;
        Ok(Self::new_with_transport(
            requests,
            resolver,
            Arc::new(transport),
        ))
    }

    pub fn new_with_transport(
        requests: RequestBuilder,
        resolver: RepoResolver,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            transport,
            requests,
            resolver,
        }
    }

    #[must_use]
    pub fn requests(&self) -> &RequestBuilder {
        &self.requests
    }

    #[must_use]
    pub fn resolver(&self) -> &RepoResolver {
        &self.resolver
    }

    /// Execute one list request and decode the page.
    ///
    /// Performs exactly one network call and never retries. The continuation
    /// is the `next` relation of the `Link` header, or `None` on the last page.
    pub async fn fetch_page(&self, request: HttpRequest) -> Result<Page<Value>> {
        let url = request.url.clone();
        let response = self.send(request).await?;

        let links = response
            .header("link")
            .map(parse_link_header)
            .unwrap_or_default();
        let records = decode_records(&response.body)?;

        tracing::debug!(
            url = %url,
            status = response.status,
            records = records.len(),
            has_next = links.next.is_some(),
            total_pages = ?links.total_pages(),
            "Fetched page"
        );

        Ok(Page {
            records,
            continuation: links.continuation(),
        })
    }

    /// Execute one mutation request and decode the single object it returns.
    pub async fn send_json(&self, request: HttpRequest) -> Result<Value> {
        let url = request.url.clone();
        let method = request.method;
        let response = self.send(request).await?;

        tracing::debug!(
            url = %url,
            method = method.as_str(),
            status = response.status,
            "Mutation accepted"
        );

        let value: Value = serde_json::from_slice(&response.body)
            .map_err(|e| SyncError::malformed(format!("body is not valid JSON: {e}")))?;
        if !value.is_object() {
            return Err(SyncError::malformed("expected a JSON object"));
        }
        Ok(value)
    }

    /// Send a request and classify the status. Only 2xx comes back as `Ok`.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self.transport.send(request).await.map_err(|e| match e {
            HttpError::InvalidRequest(message) => SyncError::invalid_parameter("request", message),
            other => SyncError::transient(other.to_string()),
        })?;

        match response.status {
            200..=299 => Ok(response),
            400..=599 => {
                let rate_limit = parse_rate_limit_headers(&response.headers);
                let body = String::from_utf8_lossy(&response.body).trim().to_string();
                if let Some(info) = &rate_limit
                    && info.remaining == Some(0)
                {
                    tracing::warn!(
                        status = response.status,
                        reset_at = ?info.reset_at,
                        "Rate limit exhausted"
                    );
                }
                Err(SyncError::RemoteRejected {
                    status: response.status,
                    body: extract_message(&body),
                    rate_limit,
                })
            }
            other => Err(SyncError::malformed(format!(
                "unexpected HTTP status {other}"
            ))),
        }
    }
}

/// Extract rate limit info from response headers.
///
/// Returns `None` when none of the headers is present.
pub fn parse_rate_limit_headers(headers: &HttpHeaders) -> Option<RateLimitInfo> {
    let number = |name: &str| header_get(headers, name).and_then(|v| v.trim().parse::<u64>().ok());

    let reset_at = header_get(headers, "x-ratelimit-reset")
        .and_then(|v| v.trim().parse::<i64>().ok())
        .and_then(|epoch| chrono::DateTime::from_timestamp(epoch, 0));

    let info = RateLimitInfo {
        limit: number("x-ratelimit-limit"),
        remaining: number("x-ratelimit-remaining"),
        reset_at,
        retry_after: number("retry-after"),
    };
    (!info.is_empty()).then_some(info)
}

/// Decode a list body. Empty means zero records.
fn decode_records(body: &[u8]) -> Result<Vec<Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| SyncError::malformed(format!("body is not valid JSON: {e}")))?;

    let Value::Array(records) = value else {
        return Err(SyncError::malformed("expected a JSON array of records"));
    };

    if let Some(index) = records.iter().position(|r| !r.is_object()) {
        return Err(SyncError::malformed(format!(
            "record {index} is not a JSON object"
        )));
    }

    Ok(records)
}

/// GitHub error bodies are `{"message": "...", "documentation_url": "..."}`.
/// Keep the message when present, otherwise the raw body.
fn extract_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
