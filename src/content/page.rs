//! Pagination envelope and continuation references

use serde::Serialize;
use url::Url;

use super::PostSummary;

/// Query parameter carrying the API access token
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Opaque pointer to the next page of a feed. For the content API this is
/// the `next_page` URL it returned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ContinuationRef(String);

impl ContinuationRef {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A copy safe to hand to a browser: the access token is removed.
    /// References that are not URLs are returned unchanged.
    pub fn public(&self) -> ContinuationRef {
        match Url::parse(&self.0) {
            Ok(url) => Self(without_param(&url, ACCESS_TOKEN_PARAM).to_string()),
            Err(_) => self.clone(),
        }
    }
}

/// Copy of `url` with every occurrence of `name` removed from its query
pub fn without_param(url: &Url, name: &str) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != name)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut stripped = url.clone();
    if kept.is_empty() {
        stripped.set_query(None);
    } else {
        stripped.query_pairs_mut().clear().extend_pairs(kept);
    }
    stripped
}

/// One page of the post feed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostPage {
    pub results: Vec<PostSummary>,
    /// `None` marks the end of the feed
    pub next_page: Option<ContinuationRef>,
    pub page: u32,
    pub total_pages: u32,
}

impl PostPage {
    pub fn is_last(&self) -> bool {
        self.next_page.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_strips_token() {
        let next = ContinuationRef::new(
            "https://blog.cdn.prismic.io/api/v2/documents/search?ref=abc&access_token=secret&page=2",
        );
        let public = next.public();
        assert!(!public.as_str().contains("secret"));
        assert!(public.as_str().contains("ref=abc"));
        assert!(public.as_str().contains("page=2"));
    }

    #[test]
    fn test_public_without_other_params() {
        let next = ContinuationRef::new("https://api.test/search?access_token=secret");
        assert_eq!(next.public().as_str(), "https://api.test/search");
    }

    #[test]
    fn test_public_opaque_token_unchanged() {
        let next = ContinuationRef::new("cursor-42");
        assert_eq!(next.public(), next);
    }
}
