//! Wire-level request/response values and the transport that carries them.
//!
//! The request builder produces an [`HttpRequest`], a transport turns it into
//! an [`HttpResponse`], and the client classifies the result. Only
//! [`reqwest_transport::ReqwestTransport`] opens sockets.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// Methods the tracker API is called with: listing uses GET, issue
/// mutations use POST and PATCH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
}

impl HttpMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header name/value pairs in send order. Lookups ignore case.
pub type HttpHeaders = Vec<(String, String)>;

/// Everything that goes on the wire for one call.
///
/// Two requests are interchangeable exactly when they compare equal, which is
/// what makes a resumed step observably identical to an uninterrupted one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpRequest {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        header_get(&self.headers, name)
    }
}

/// Status, headers and raw body of one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        header_get(&self.headers, name)
    }
}

/// The call produced no response at all.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request failed before a response arrived: {0}")]
    Transport(String),

    /// The request could not be put on the wire as given (bad header value,
    /// unusable URL). Sending it again cannot help.
    #[error("request could not be built: {0}")]
    InvalidRequest(String),

    #[error("no response scripted for {method} {url}")]
    NoRoute { method: HttpMethod, url: String },
}

/// Carries one request to the service and returns whatever came back,
/// whatever the status. Implementations never retry.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// First value for `name`, compared case-insensitively.
#[must_use]
pub fn header_get<'a>(headers: &'a HttpHeaders, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find_map(|(key, value)| key.eq_ignore_ascii_case(name).then_some(value.as_str()))
}

pub mod reqwest_transport {
    use std::time::Duration;

    use super::{HttpError, HttpHeaders, HttpMethod, HttpRequest, HttpResponse, HttpTransport};
    use async_trait::async_trait;

    impl From<HttpMethod> for reqwest::Method {
        fn from(method: HttpMethod) -> Self {
            match method {
                HttpMethod::Get => Self::GET,
                HttpMethod::Post => Self::POST,
                HttpMethod::Patch => Self::PATCH,
            }
        }
    }

    /// Live transport over a shared `reqwest::Client`.
    #[derive(Clone)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    fn classify(e: reqwest::Error) -> HttpError {
        if e.is_builder() {
            HttpError::InvalidRequest(e.to_string())
        } else {
            HttpError::Transport(e.to_string())
        }
    }

    impl ReqwestTransport {
        pub fn new(client: reqwest::Client) -> Self {
            Self { client }
        }

        /// Every request sent through this transport is bounded by `timeout`.
        pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
            reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .map(Self::new)
                .map_err(|e| HttpError::Transport(e.to_string()))
        }
    }

    #[async_trait]
    impl HttpTransport for ReqwestTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
            let HttpRequest {
                method,
                url,
                headers,
                body,
            } = request;

            let mut outgoing = self.client.request(method.into(), url);
            for (name, value) in headers {
                outgoing = outgoing.header(name, value);
            }
            if !body.is_empty() {
                outgoing = outgoing.body(body);
            }

            let incoming = outgoing.send().await.map_err(classify)?;

            let status = incoming.status().as_u16();
            // Non-UTF-8 header values are kept as empty strings.
            let headers: HttpHeaders = incoming
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        value.to_str().unwrap_or_default().to_string(),
                    )
                })
                .collect();
            let body = incoming
                .bytes()
                .await
                .map_err(|e| HttpError::Transport(e.to_string()))?
                .to_vec();

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }
}

#[cfg(test)]
pub(crate) use mock::{MockTransport, canned};

#[cfg(test)]
mod mock {
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex, MutexGuard};

    use super::{HttpError, HttpMethod, HttpRequest, HttpResponse, HttpTransport};
    use async_trait::async_trait;

    enum Scripted {
        Reply(HttpResponse),
        Fail(String),
    }

    #[derive(Default)]
    struct Script {
        replies: HashMap<(HttpMethod, String), VecDeque<Scripted>>,
        sent: Vec<HttpRequest>,
    }

    /// Scripted in-memory transport.
    ///
    /// Replies are queued per method + URL and served first in, first out.
    /// Every request is recorded, answered or not.
    #[derive(Clone, Default)]
    pub struct MockTransport {
        script: Arc<Mutex<Script>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        fn script(&self) -> MutexGuard<'_, Script> {
            self.script.lock().unwrap_or_else(|e| e.into_inner())
        }

        fn enqueue(&self, method: HttpMethod, url: String, entry: Scripted) {
            self.script()
                .replies
                .entry((method, url))
                .or_default()
                .push_back(entry);
        }

        pub fn push_response(&self, method: HttpMethod, url: impl Into<String>, response: HttpResponse) {
            self.enqueue(method, url.into(), Scripted::Reply(response));
        }

        /// Queue a failure that happens before any response, e.g. a reset.
        pub fn push_failure(&self, method: HttpMethod, url: impl Into<String>, message: &str) {
            self.enqueue(method, url.into(), Scripted::Fail(message.to_string()));
        }

        /// Requests seen so far, in send order.
        pub fn requests(&self) -> Vec<HttpRequest> {
            self.script().sent.clone()
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
            let mut script = self.script();
            let key = (request.method, request.url.clone());
            script.sent.push(request);

            match script.replies.get_mut(&key).and_then(VecDeque::pop_front) {
                Some(Scripted::Reply(response)) => Ok(response),
                Some(Scripted::Fail(message)) => Err(HttpError::Transport(message)),
                None => Err(HttpError::NoRoute {
                    method: key.0,
                    url: key.1,
                }),
            }
        }
    }

    pub(crate) fn canned(status: u16, headers: &[(&str, &str)], body: impl AsRef<[u8]>) -> HttpResponse {
        HttpResponse {
            status,
            headers: headers
                .iter()
                .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
                .collect(),
            body: body.as_ref().to_vec(),
        }
    }
}
