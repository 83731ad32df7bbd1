//! Post feed accumulation
//!
//! The listing page starts from one page of posts and grows as the reader
//! asks for more. [`Feed`] holds that state and only changes through
//! [`Feed::apply`], so every transition is visible in one place:
//!
//! * `LoadMore` while a fetch is pending is refused (`Busy`), so two
//!   overlapping fetches can never append out of order.
//! * `LoadMore` at the end of the feed does nothing (`Exhausted`).
//! * A loaded page is appended as-is and its continuation replaces ours.
//! * A failed fetch keeps everything and records the error for retry.

use std::collections::HashSet;

use crate::client::{ContentSource, PostQuery};
use crate::content::{ContinuationRef, PostPage, PostSummary};
use crate::error::ContentError;

/// Events the feed reacts to
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// The reader asked for the next page
    LoadMore,
    /// The pending fetch returned a page
    Loaded(PostPage),
    /// The pending fetch failed
    Failed(String),
}

/// What happened in response to an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEffect {
    /// Caller must fetch this page and report back with `Loaded`/`Failed`
    Fetch(ContinuationRef),
    /// A fetch is already pending
    Busy,
    /// No continuation; nothing to load
    Exhausted,
    /// This many posts were appended
    Appended(usize),
    /// The failure was recorded
    Failed,
    /// A result arrived with no fetch pending and was dropped
    Ignored,
}

/// Accumulated listing state
#[derive(Debug, Clone, Default)]
pub struct Feed {
    posts: Vec<PostSummary>,
    next_page: Option<ContinuationRef>,
    loading: bool,
    last_error: Option<String>,
}

impl Feed {
    /// Start from the first page
    pub fn from_page(page: PostPage) -> Self {
        Self {
            posts: page.results,
            next_page: page.next_page,
            loading: false,
            last_error: None,
        }
    }

    /// An empty feed that continues at `next`
    pub fn resume(next: ContinuationRef) -> Self {
        Self {
            next_page: Some(next),
            ..Default::default()
        }
    }

    /// Fetch the first page of `query` and start a feed from it
    pub async fn start(source: &dyn ContentSource, query: &PostQuery) -> Result<Self, ContentError> {
        let page = source.query_posts(query).await?;
        tracing::debug!(
            "Feed started with {} posts (page {}/{}, last: {})",
            page.results.len(),
            page.page,
            page.total_pages,
            page.is_last()
        );
        Ok(Self::from_page(page))
    }

    pub fn posts(&self) -> &[PostSummary] {
        &self.posts
    }

    pub fn next_page(&self) -> Option<&ContinuationRef> {
        self.next_page.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether "load more" should be offered
    pub fn can_load_more(&self) -> bool {
        self.next_page.is_some() && !self.loading
    }

    /// Advance the state machine
    pub fn apply(&mut self, event: FeedEvent) -> FeedEffect {
        match event {
            FeedEvent::LoadMore => {
                if self.loading {
                    return FeedEffect::Busy;
                }
                match &self.next_page {
                    Some(next) => {
                        self.loading = true;
                        FeedEffect::Fetch(next.clone())
                    }
                    None => FeedEffect::Exhausted,
                }
            }
            FeedEvent::Loaded(page) => {
                if !self.loading {
                    return FeedEffect::Ignored;
                }
                self.loading = false;
                self.last_error = None;
                let count = page.results.len();
                self.posts.extend(page.results);
                self.next_page = page.next_page;
                FeedEffect::Appended(count)
            }
            FeedEvent::Failed(message) => {
                if !self.loading {
                    return FeedEffect::Ignored;
                }
                self.loading = false;
                self.last_error = Some(message);
                FeedEffect::Failed
            }
        }
    }

    /// Run one full load-more cycle against `source`.
    /// Returns the number of posts appended (0 when exhausted).
    pub async fn load_more(&mut self, source: &dyn ContentSource) -> Result<usize, ContentError> {
        let next = match self.apply(FeedEvent::LoadMore) {
            FeedEffect::Fetch(next) => next,
            _ => return Ok(0),
        };

        match source.fetch_page(&next).await {
            Ok(page) => match self.apply(FeedEvent::Loaded(page)) {
                FeedEffect::Appended(count) => Ok(count),
                _ => Ok(0),
            },
            Err(e) => {
                tracing::warn!("Loading more posts failed: {}", e);
                self.apply(FeedEvent::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Keep loading until the feed is exhausted
    pub async fn load_all(&mut self, source: &dyn ContentSource) -> Result<(), ContentError> {
        let mut seen = HashSet::new();
        while let Some(next) = self.next_page.clone() {
            if !seen.insert(next.clone()) {
                tracing::warn!("Continuation {} repeated, stopping", next.public().as_str());
                self.next_page = None;
                break;
            }
            self.load_more(source).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::memory::MemorySource;
    use crate::content::PublishedAt;
    use std::sync::atomic::Ordering;

    fn summary(uid: &str) -> PostSummary {
        PostSummary {
            uid: Some(uid.to_string()),
            published_at: PublishedAt::unknown(),
            title: uid.to_uppercase(),
            subtitle: String::new(),
            author: String::new(),
        }
    }

    fn page(uids: &[&str], next: Option<&str>) -> PostPage {
        PostPage {
            results: uids.iter().map(|u| summary(u)).collect(),
            next_page: next.map(ContinuationRef::new),
            page: 1,
            total_pages: 1,
        }
    }

    fn uids(feed: &Feed) -> Vec<String> {
        feed.posts()
            .iter()
            .filter_map(|p| p.uid.clone())
            .collect()
    }

    fn query(page_size: usize) -> PostQuery {
        PostQuery {
            document_type: "post".to_string(),
            page_size,
            fetch: Vec::new(),
            order_by: None,
        }
    }

    #[test]
    fn test_load_more_appends_and_replaces_continuation() {
        let mut feed = Feed::from_page(page(&["a", "b"], Some("T1")));
        assert!(feed.can_load_more());

        assert_eq!(
            feed.apply(FeedEvent::LoadMore),
            FeedEffect::Fetch(ContinuationRef::new("T1"))
        );
        assert!(feed.is_loading());
        assert!(!feed.can_load_more());

        assert_eq!(
            feed.apply(FeedEvent::Loaded(page(&["c", "d"], Some("T2")))),
            FeedEffect::Appended(2)
        );
        assert_eq!(uids(&feed), vec!["a", "b", "c", "d"]);
        assert_eq!(feed.next_page(), Some(&ContinuationRef::new("T2")));

        feed.apply(FeedEvent::LoadMore);
        feed.apply(FeedEvent::Loaded(page(&["e"], None)));
        assert_eq!(uids(&feed), vec!["a", "b", "c", "d", "e"]);
        assert!(feed.next_page().is_none());
        assert!(!feed.can_load_more());
    }

    #[test]
    fn test_load_more_without_continuation_is_inert() {
        let mut feed = Feed::from_page(page(&["a"], None));
        assert_eq!(feed.apply(FeedEvent::LoadMore), FeedEffect::Exhausted);
        assert!(!feed.is_loading());
        assert_eq!(uids(&feed), vec!["a"]);
    }

    #[test]
    fn test_load_more_while_pending_is_refused() {
        let mut feed = Feed::from_page(page(&["a"], Some("T1")));
        assert!(matches!(feed.apply(FeedEvent::LoadMore), FeedEffect::Fetch(_)));
        assert_eq!(feed.apply(FeedEvent::LoadMore), FeedEffect::Busy);

        feed.apply(FeedEvent::Loaded(page(&["b"], None)));
        // a second result with nothing pending is dropped, not appended twice
        assert_eq!(
            feed.apply(FeedEvent::Loaded(page(&["b"], None))),
            FeedEffect::Ignored
        );
        assert_eq!(uids(&feed), vec!["a", "b"]);
    }

    #[test]
    fn test_failure_keeps_state_for_retry() {
        let mut feed = Feed::from_page(page(&["a"], Some("T1")));
        feed.apply(FeedEvent::LoadMore);
        assert_eq!(
            feed.apply(FeedEvent::Failed("boom".to_string())),
            FeedEffect::Failed
        );
        assert_eq!(feed.last_error(), Some("boom"));
        assert_eq!(uids(&feed), vec!["a"]);
        assert!(feed.can_load_more());

        feed.apply(FeedEvent::LoadMore);
        feed.apply(FeedEvent::Loaded(page(&["b"], None)));
        assert!(feed.last_error().is_none());
    }

    #[tokio::test]
    async fn test_page_size_four_example() {
        let source = MemorySource::with_posts(10);
        let mut feed = Feed::start(&source, &query(4)).await.unwrap();
        assert_eq!(feed.posts().len(), 4);
        assert!(feed.next_page().is_some());

        let appended = feed.load_more(&source).await.unwrap();
        assert_eq!(appended, 4);
        assert_eq!(feed.posts().len(), 8);
        assert!(feed.next_page().is_some());

        feed.load_more(&source).await.unwrap();
        assert_eq!(feed.posts().len(), 10);
        assert!(feed.next_page().is_none());
        assert_eq!(feed.load_more(&source).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_load_all_preserves_server_order() {
        let source = MemorySource::with_posts(7);
        let mut feed = Feed::start(&source, &query(2)).await.unwrap();
        feed.load_all(&source).await.unwrap();

        let expected: Vec<String> = (1..=7).map(|i| format!("post-{}", i)).collect();
        assert_eq!(uids(&feed), expected);
        assert_eq!(source.page_fetches.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_load_more_error_is_surfaced() {
        let source = MemorySource::with_posts(3);
        let mut feed = Feed::start(&source, &query(1)).await.unwrap();
        source.fail.store(true, Ordering::SeqCst);

        assert!(feed.load_more(&source).await.is_err());
        assert!(feed.last_error().is_some());
        assert_eq!(feed.posts().len(), 1);

        source.fail.store(false, Ordering::SeqCst);
        assert_eq!(feed.load_more(&source).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_resume_from_continuation() {
        let source = MemorySource::with_posts(3);
        let mut feed = Feed::resume(ContinuationRef::new("memory://page/2"));
        source.query_posts(&query(1)).await.unwrap();
        feed.load_more(&source).await.unwrap();
        assert_eq!(uids(&feed), vec!["post-2"]);
    }
}
