//! Content client - fetches posts from the headless content API

#[cfg(test)]
pub(crate) mod memory;
pub mod predicate;
mod prismic;
mod response;

use async_trait::async_trait;
use std::collections::HashSet;

use crate::config::ApiConfig;
use crate::content::{ContinuationRef, Post, PostPage};
use crate::error::ContentError;

pub use prismic::PrismicClient;

/// Largest page size the API accepts
pub const MAX_PAGE_SIZE: usize = 100;

/// A listing query: one document type, a page size and a field projection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
    pub document_type: String,
    pub page_size: usize,
    /// Fields to return, e.g. `post.title`; empty means all fields
    pub fetch: Vec<String>,
    pub order_by: Option<String>,
}

impl PostQuery {
    /// The query behind the listing page
    pub fn listing(config: &ApiConfig) -> Self {
        Self {
            document_type: config.document_type.clone(),
            page_size: config.per_page.clamp(1, MAX_PAGE_SIZE),
            fetch: config.listing_fields.clone(),
            order_by: config.order_by.clone(),
        }
    }

    /// The query used to discover every post identifier at build time
    pub fn identifiers(config: &ApiConfig) -> Self {
        Self {
            document_type: config.document_type.clone(),
            page_size: MAX_PAGE_SIZE,
            fetch: vec![format!("{}.uid", config.document_type)],
            order_by: config.order_by.clone(),
        }
    }
}

/// Anything that can serve posts. The generator, the server and the feed
/// only talk to this trait.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// First page of a listing
    async fn query_posts(&self, query: &PostQuery) -> Result<PostPage, ContentError>;

    /// The page a continuation reference points at
    async fn fetch_page(&self, next: &ContinuationRef) -> Result<PostPage, ContentError>;

    /// A full post by uid
    async fn get_post(&self, uid: &str) -> Result<Post, ContentError>;

    /// Every uid `query` reaches, in server order. Posts without a uid are
    /// skipped and a repeated continuation ends the walk.
    async fn discover_uids(&self, query: &PostQuery) -> Result<Vec<String>, ContentError> {
        let mut page = self.query_posts(query).await?;
        let mut uids = Vec::new();
        let mut seen = HashSet::new();

        loop {
            uids.extend(page.results.into_iter().filter_map(|p| p.uid));
            let next = match page.next_page {
                Some(next) if seen.insert(next.clone()) => next,
                Some(next) => {
                    tracing::warn!("Continuation {} repeated, stopping", next.public().as_str());
                    break;
                }
                None => break,
            };
            page = self.fetch_page(&next).await?;
        }

        Ok(uids)
    }
}
