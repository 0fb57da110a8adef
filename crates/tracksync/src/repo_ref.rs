//! Resolution of user-supplied repository URLs into owner/name pairs.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, SyncError};

/// Web host used when none is configured.
pub const DEFAULT_WEB_HOST: &str = "github.com";

/// An `owner/name` pair identifying one repository on the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryReference {
    pub owner: String,
    pub name: String,
}

impl RepositoryReference {
    /// Get the full name (owner/name).
    #[inline]
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepositoryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Parses repository URLs for a single web host.
#[derive(Debug, Clone)]
pub struct RepoResolver {
    host: String,
}

impl Default for RepoResolver {
    fn default() -> Self {
        Self::new(DEFAULT_WEB_HOST)
    }
}

impl RepoResolver {
    /// Create a resolver that accepts URLs on `host` (e.g. `github.com` or
    /// an enterprise host). A scheme or trailing slash in `host` is ignored.
    pub fn new(host: &str) -> Self {
        let host = host
            .trim()
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');
        Self {
            host: normalize_host(host),
        }
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Resolve `https://<host>/<owner>/<name>` into a [`RepositoryReference`].
    ///
    /// Tolerates `http`, a trailing slash, a `.git` suffix, a query or
    /// fragment, and extra path segments after the name. Pure: the same
    /// input always yields the same result.
    pub fn resolve(&self, input: &str) -> Result<RepositoryReference> {
        let invalid = |reason: &str| SyncError::invalid_reference(input, reason);

        let url = Url::parse(input.trim()).map_err(|e| invalid(&format!("not a URL ({e})")))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }

        let host = url.host_str().map(normalize_host).unwrap_or_default();
        if host != self.host {
            return Err(invalid(&format!("expected a {} URL", self.host)));
        }

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        let [owner, raw_name, ..] = segments.as_slice() else {
            return Err(invalid("expected /<owner>/<name> in the path"));
        };

        let name = raw_name.strip_suffix(".git").unwrap_or(*raw_name);

        if !is_valid_owner(owner) {
            return Err(invalid("owner is empty or contains invalid characters"));
        }
        if !is_valid_name(name) {
            return Err(invalid("name is empty or contains invalid characters"));
        }

        Ok(RepositoryReference {
            owner: (*owner).to_string(),
            name: name.to_string(),
        })
    }
}

/// Resolve a repository URL against the default web host.
pub fn resolve_repo_url(input: &str) -> Result<RepositoryReference> {
    RepoResolver::default().resolve(input)
}

fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('.').to_lowercase();
    host.strip_prefix("www.").unwrap_or(&host).to_string()
}

fn is_valid_owner(owner: &str) -> bool {
    !owner.is_empty() && owner.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(owner: &str, name: &str) -> RepositoryReference {
        RepositoryReference {
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_resolves_plain_url() {
        assert_eq!(
            resolve_repo_url("https://github.com/acme/widgets").unwrap(),
            reference("acme", "widgets")
        );
    }

    #[test]
    fn test_tolerates_trailing_slash_and_http() {
        assert_eq!(
            resolve_repo_url("https://github.com/acme/widgets/").unwrap(),
            reference("acme", "widgets")
        );
        assert_eq!(
            resolve_repo_url("http://github.com/acme/widgets").unwrap(),
            reference("acme", "widgets")
        );
        assert_eq!(
            resolve_repo_url("https://www.GitHub.com/acme/widgets").unwrap(),
            reference("acme", "widgets")
        );
    }

    #[test]
    fn test_strips_git_suffix_query_and_extra_segments() {
        assert_eq!(
            resolve_repo_url("https://github.com/acme/widgets.git").unwrap(),
            reference("acme", "widgets")
        );
        assert_eq!(
            resolve_repo_url("https://github.com/acme/widgets/pulls/12?tab=files#top").unwrap(),
            reference("acme", "widgets")
        );
    }

    #[test]
    fn test_keeps_dots_and_underscores_in_name() {
        assert_eq!(
            resolve_repo_url("https://github.com/rust-lang/rust.vim_x").unwrap(),
            reference("rust-lang", "rust.vim_x")
        );
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let url = "https://github.com/acme/widgets";
        assert_eq!(resolve_repo_url(url).unwrap(), resolve_repo_url(url).unwrap());
    }

    #[test]
    fn test_rejects_missing_segments() {
        for input in [
            "https://github.com",
            "https://github.com/",
            "https://github.com/acme",
            "https://github.com/acme/",
            "https://github.com//widgets",
        ] {
            let err = resolve_repo_url(input).expect_err(input);
            assert!(
                matches!(err, SyncError::InvalidReference { .. }),
                "{input}: {err:?}"
            );
        }
    }

    #[test]
    fn test_rejects_wrong_host_and_scheme() {
        assert!(matches!(
            resolve_repo_url("https://gitlab.com/acme/widgets"),
            Err(SyncError::InvalidReference { .. })
        ));
        assert!(matches!(
            resolve_repo_url("ftp://github.com/acme/widgets"),
            Err(SyncError::InvalidReference { .. })
        ));
        assert!(matches!(
            resolve_repo_url("github.com/acme/widgets"),
            Err(SyncError::InvalidReference { .. })
        ));
    }

    #[test]
    fn test_rejects_unsafe_segments() {
        assert!(resolve_repo_url("https://github.com/ac%20me/widgets").is_err());
        assert!(resolve_repo_url("https://github.com/acme/..").is_err());
        assert!(resolve_repo_url("https://github.com/acme/wid%3Fgets").is_err());
    }

    #[test]
    fn test_enterprise_host() {
        let resolver = RepoResolver::new("https://git.example.com/");
        assert_eq!(resolver.host(), "git.example.com");
        assert_eq!(
            resolver
                .resolve("https://git.example.com/platform/api")
                .unwrap(),
            reference("platform", "api")
        );
        assert!(resolver.resolve("https://github.com/platform/api").is_err());
    }

    #[test]
    fn test_error_keeps_offending_input() {
        match resolve_repo_url("https://github.com/acme") {
            Err(SyncError::InvalidReference { input, .. }) => {
                assert_eq!(input, "https://github.com/acme");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_full_name_and_display() {
        let r = reference("acme", "widgets");
        assert_eq!(r.full_name(), "acme/widgets");
        assert_eq!(r.to_string(), "acme/widgets");
    }
}
