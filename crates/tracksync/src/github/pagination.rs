//! Link-header pagination and the page container handed to the sync step.

use super::request::ContinuationToken;

/// Relations extracted from a `Link` response header.
///
/// Only `next` decides whether another page exists; the others are kept for
/// logging and progress estimates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkRelations {
    pub next: Option<String>,
    pub prev: Option<String>,
    pub first: Option<String>,
    pub last: Option<String>,
}

impl LinkRelations {
    /// Returns the total number of pages if the `last` link carries one.
    pub fn total_pages(&self) -> Option<u32> {
        self.last.as_deref().and_then(extract_page_from_url)
    }

    /// The continuation for the page after this one.
    pub fn continuation(&self) -> Option<ContinuationToken> {
        self.next.clone().map(ContinuationToken::new)
    }
}

/// Parse the Link header to extract pagination relations.
///
/// GitHub Link headers look like:
/// `<https://api.github.com/repositories/1/issues?state=open&page=2>; rel="next", <...&page=3>; rel="last"`
///
/// URLs may themselves contain commas (`labels=bug,ui`), so links are split
/// on their `<...>` brackets rather than on `,`.
pub fn parse_link_header(link_header: &str) -> LinkRelations {
    let mut info = LinkRelations::default();
    let mut rest = link_header;

    while let Some(open) = rest.find('<') {
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find('>') else {
            break;
        };
        let url = &after_open[..close];
        let tail = &after_open[close + 1..];
        // Parameters run up to the next link's opening bracket.
        let params_end = tail.find('<').unwrap_or(tail.len());
        let params = &tail[..params_end];
        rest = &tail[params_end..];

        if url.is_empty() {
            continue;
        }

        let rel = params
            .split(';')
            .map(str::trim)
            .find_map(|segment| segment.strip_prefix("rel="))
            .map(|value| value.trim_end_matches(',').trim().trim_matches('"'));

        let Some(rel_types) = rel else {
            continue;
        };

        // A single link may carry several space-separated relation types.
        for rel_type in rel_types.split_whitespace() {
            let slot = match rel_type {
                "next" => &mut info.next,
                "prev" => &mut info.prev,
                "first" => &mut info.first,
                "last" => &mut info.last,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(url.to_string());
            }
        }
    }

    info
}

/// Extract the page parameter from a URL.
fn extract_page_from_url(url: &str) -> Option<u32> {
    let query_start = url.find('?')?;
    let query = &url[query_start + 1..];

    for param in query.split('&') {
        if let Some(value) = param.strip_prefix("page=") {
            return value.parse().ok();
        }
    }

    None
}

/// One fetched page: records in service order plus the token for the next.
///
/// `continuation` is `None` exactly when this is the final page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub records: Vec<T>,
    pub continuation: Option<ContinuationToken>,
}

impl<T> Page<T> {
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.continuation.is_none()
    }
}
