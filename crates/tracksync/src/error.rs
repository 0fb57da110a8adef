//! Error taxonomy shared by every sync, autocomplete and mutation path.

use std::time::Duration;

use chrono::Utc;
use thiserror::Error;

use crate::github::RateLimitInfo;

/// Errors surfaced by the sync core.
///
/// Nothing in the core swallows one of these to keep going: every failure
/// aborts the current step. Retrying is the caller's call, see
/// [`SyncError::is_retryable`] and [`crate::retry`].
#[derive(Debug, Error)]
pub enum SyncError {
    /// The repository URL supplied by the user could not be resolved.
    #[error("Invalid repository reference '{input}': {reason}")]
    InvalidReference { input: String, reason: String },

    /// A resource kind outside repos/pulls/issues was requested.
    #[error("Unsupported resource kind: {0}")]
    UnsupportedResource(String),

    /// A continuation token that does not point at the configured API.
    #[error("Invalid continuation token: {reason}")]
    InvalidContinuation { reason: String },

    /// A mutation parameter failed validation before any request was sent.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The request never produced a response (DNS, connect, timeout, reset).
    #[error("Transient fetch error: {message}")]
    TransientFetch { message: String },

    /// The service answered with a 4xx/5xx status.
    #[error("Remote rejected request ({status}): {body}")]
    RemoteRejected {
        status: u16,
        body: String,
        rate_limit: Option<RateLimitInfo>,
    },

    /// The service answered with something outside the API contract.
    #[error("Malformed response{}: {message}", field_suffix(.field))]
    MalformedResponse {
        field: Option<String>,
        message: String,
    },
}

fn field_suffix(field: &Option<String>) -> String {
    field
        .as_ref()
        .map(|f| format!(" (field `{f}`)"))
        .unwrap_or_default()
}

impl SyncError {
    #[inline]
    pub fn invalid_reference(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidReference {
            input: input.into(),
            reason: reason.into(),
        }
    }

    #[inline]
    pub fn invalid_continuation(reason: impl Into<String>) -> Self {
        Self::InvalidContinuation {
            reason: reason.into(),
        }
    }

    #[inline]
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    #[inline]
    pub fn transient(message: impl Into<String>) -> Self {
        Self::TransientFetch {
            message: message.into(),
        }
    }

    /// A response that broke the contract without pointing at one field.
    #[inline]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            field: None,
            message: message.into(),
        }
    }

    /// A record that lacks a required field.
    #[inline]
    pub fn missing_field(field: &str, record: &str) -> Self {
        Self::MalformedResponse {
            field: Some(field.to_string()),
            message: format!("{record} record is missing required field"),
        }
    }

    /// HTTP status carried by a rejection, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteRejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the service refused the request because of rate limiting.
    ///
    /// 429 always counts. 403 counts only when the response says so: an
    /// exhausted `x-ratelimit-remaining`, a `retry-after` header, or a body
    /// that mentions the limit. Any other 403 is an authorization failure.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::RemoteRejected { status: 429, .. } => true,
            Self::RemoteRejected {
                status: 403,
                body,
                rate_limit,
            } => {
                rate_limit
                    .as_ref()
                    .is_some_and(|info| info.remaining == Some(0) || info.retry_after.is_some())
                    || body.to_ascii_lowercase().contains("rate limit")
            }
            _ => false,
        }
    }

    /// How long the service asked us to wait before trying again.
    ///
    /// `retry-after` wins; otherwise an exhausted quota waits until
    /// `x-ratelimit-reset`. `None` for anything that is not a rate limit.
    #[must_use]
    pub fn retry_hint(&self) -> Option<Duration> {
        let Self::RemoteRejected {
            rate_limit: Some(info),
            ..
        } = self
        else {
            return None;
        };
        if !self.is_rate_limited() {
            return None;
        }
        if let Some(seconds) = info.retry_after {
            return Some(Duration::from_secs(seconds));
        }
        if info.remaining == Some(0) {
            return info
                .reset_at
                .and_then(|reset| (reset - Utc::now()).to_std().ok());
        }
        None
    }

    /// Whether re-running the same step with the same continuation may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientFetch { .. }) || self.is_rate_limited()
    }
}

/// Extract a short error message suitable for progress lines.
///
/// Takes the first line of the rendered error and truncates long remote
/// bodies on a character boundary.
pub fn short_error_message(e: &SyncError) -> String {
    match e {
        SyncError::RemoteRejected { status, body, .. } => {
            let first = body.lines().next().unwrap_or_default();
            if first.chars().count() > 50 {
                let truncated: String = first.chars().take(47).collect();
                format!("HTTP {status}: {truncated}...")
            } else {
                format!("HTTP {status}: {first}")
            }
        }
        other => {
            let full = other.to_string();
            full.lines().next().unwrap_or(&full).to_string()
        }
    }
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
