//! In-memory content source for tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use super::{ContentSource, PostQuery};
use crate::content::{
    ContentBlock, ContinuationRef, Post, PostPage, PublishedAt,
};
use crate::content::rich_text::{RichTextElement, TextElement};
use crate::error::ContentError;

const PREFIX: &str = "memory://page/";

pub(crate) struct MemorySource {
    posts: Vec<Post>,
    page_size: AtomicUsize,
    pub(crate) fail: AtomicBool,
    /// Milliseconds `get_post` sleeps before answering
    pub(crate) delay_ms: AtomicU64,
    pub(crate) page_fetches: AtomicUsize,
    pub(crate) post_fetches: AtomicUsize,
}

impl MemorySource {
    pub(crate) fn new(posts: Vec<Post>) -> Self {
        Self {
            posts,
            page_size: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
            delay_ms: AtomicU64::new(0),
            page_fetches: AtomicUsize::new(0),
            post_fetches: AtomicUsize::new(0),
        }
    }

    /// `n` posts with uids `post-1..=post-n`, newest first
    pub(crate) fn with_posts(n: usize) -> Self {
        Self::new((1..=n).map(|i| sample_post(&format!("post-{}", i), 10 * i)).collect())
    }

    fn page(&self, number: usize) -> Result<PostPage, ContentError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ContentError::from_status(503, "memory://"));
        }
        let size = self.page_size.load(Ordering::SeqCst).max(1);
        let total_pages = self.posts.len().div_ceil(size);
        let start = (number - 1) * size;
        let results = self
            .posts
            .iter()
            .skip(start)
            .take(size)
            .map(Post::summary)
            .collect();
        let next_page = (number < total_pages)
            .then(|| ContinuationRef::new(format!("{}{}", PREFIX, number + 1)));
        Ok(PostPage {
            results,
            next_page,
            page: number as u32,
            total_pages: total_pages as u32,
        })
    }
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn query_posts(&self, query: &PostQuery) -> Result<PostPage, ContentError> {
        self.page_size.store(query.page_size, Ordering::SeqCst);
        self.page_fetches.fetch_add(1, Ordering::SeqCst);
        self.page(1)
    }

    async fn fetch_page(&self, next: &ContinuationRef) -> Result<PostPage, ContentError> {
        self.page_fetches.fetch_add(1, Ordering::SeqCst);
        let number = next
            .as_str()
            .strip_prefix(PREFIX)
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|n| *n >= 1)
            .ok_or_else(|| ContentError::ForeignContinuation {
                expected: PREFIX.to_string(),
                found: next.as_str().to_string(),
            })?;
        self.page(number)
    }

    async fn get_post(&self, uid: &str) -> Result<Post, ContentError> {
        self.post_fetches.fetch_add(1, Ordering::SeqCst);
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(ContentError::from_status(503, "memory://"));
        }
        self.posts
            .iter()
            .find(|p| p.uid == uid)
            .cloned()
            .ok_or_else(|| ContentError::NotFound(uid.to_string()))
    }
}

/// A post whose single block has `words` words
pub(crate) fn sample_post(uid: &str, words: usize) -> Post {
    Post {
        uid: uid.to_string(),
        published_at: PublishedAt::parse(Some("2021-03-25T19:25:28+0000")),
        title: format!("Title of {}", uid),
        subtitle: format!("Subtitle of {}", uid),
        author: "Joseph Oliveira".to_string(),
        banner: None,
        content: vec![ContentBlock {
            heading: format!("Heading of {}", uid),
            body: vec![RichTextElement::Paragraph(TextElement::plain(
                vec!["lorem"; words].join(" "),
            ))],
        }],
    }
}
