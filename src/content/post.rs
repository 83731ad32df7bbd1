//! Post models

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::reading_time::{reading_time_at, ReadingTime};
use super::rich_text::{self, RichTextElement};

/// First publication timestamp. Drafts previewed through the API and some
/// migrated documents have none, so absence is a normal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct PublishedAt(Option<DateTime<FixedOffset>>);

impl PublishedAt {
    pub fn new(date: DateTime<FixedOffset>) -> Self {
        Self(Some(date))
    }

    pub fn unknown() -> Self {
        Self(None)
    }

    /// Parse the API's timestamp (`2021-03-25T19:25:28+0000`) or RFC 3339.
    /// Unparseable input is treated as absent.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self(None);
        };
        let parsed = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z")
            .or_else(|_| DateTime::parse_from_rfc3339(raw));
        match parsed {
            Ok(date) => Self(Some(date)),
            Err(e) => {
                tracing::warn!("Ignoring unparseable publication date {:?}: {}", raw, e);
                Self(None)
            }
        }
    }

    pub fn get(&self) -> Option<&DateTime<FixedOffset>> {
        self.0.as_ref()
    }
}

/// Banner image shown above a post
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    pub url: String,
    #[serde(default)]
    pub alt: Option<String>,
}

/// A titled section of a post body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(default)]
    pub heading: String,
    #[serde(default)]
    pub body: Vec<RichTextElement>,
}

impl ContentBlock {
    /// Whitespace-separated words in the body's plain-text rendering
    pub fn word_count(&self) -> usize {
        rich_text::as_text(&self.body).split_whitespace().count()
    }
}

/// A full post as shown on its detail page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub uid: String,
    pub published_at: PublishedAt,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub banner: Option<Banner>,
    pub content: Vec<ContentBlock>,
}

impl Post {
    pub fn reading_time(&self, words_per_minute: usize) -> ReadingTime {
        reading_time_at(&self.content, words_per_minute)
    }

    /// The listing projection of this post
    pub fn summary(&self) -> PostSummary {
        PostSummary {
            uid: Some(self.uid.clone()),
            published_at: self.published_at,
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            author: self.author.clone(),
        }
    }
}

/// A post as listed in the feed (no body)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostSummary {
    /// Documents saved without a uid cannot be linked to
    pub uid: Option<String>,
    pub published_at: PublishedAt,
    pub title: String,
    pub subtitle: String,
    pub author: String,
}
