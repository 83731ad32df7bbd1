//! Content module - posts, rich text and reading time

mod page;
mod post;
pub mod reading_time;
pub mod rich_text;

pub use page::{without_param, ContinuationRef, PostPage, ACCESS_TOKEN_PARAM};
pub use post::{Banner, ContentBlock, Post, PostSummary, PublishedAt};
pub use reading_time::{reading_time, ReadingTime};
