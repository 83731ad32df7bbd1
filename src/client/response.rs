//! Wire types for content API responses and their conversion into posts

use serde::Deserialize;

use crate::content::rich_text::{self, RichTextElement};
use crate::content::{
    Banner, ContentBlock, ContinuationRef, Post, PostPage, PostSummary, PublishedAt,
};

/// API info document (`GET {endpoint}`)
#[derive(Debug, Deserialize)]
pub struct ApiInfo {
    #[serde(default)]
    pub refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
pub struct ApiRef {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(rename = "isMasterRef", default)]
    pub is_master_ref: bool,
}

impl ApiInfo {
    pub fn master_ref(&self) -> Option<&str> {
        self.refs
            .iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference.as_str())
    }
}

/// Search response envelope
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub results: Vec<Document>,
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub data: PostData,
}

/// Post fields. Every field is optional on the wire since listing queries
/// project only a few of them.
#[derive(Debug, Default, Deserialize)]
pub struct PostData {
    #[serde(default)]
    pub title: Option<TextField>,
    #[serde(default)]
    pub subtitle: Option<TextField>,
    #[serde(default)]
    pub author: Option<TextField>,
    #[serde(default)]
    pub banner: Option<ImageField>,
    #[serde(default)]
    pub content: Vec<WireBlock>,
}

/// Key text or rich text, depending on how the custom type was modelled
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TextField {
    Plain(String),
    Rich(Vec<RichTextElement>),
}

impl TextField {
    fn into_string(self) -> String {
        match self {
            Self::Plain(s) => s,
            Self::Rich(elements) => rich_text::as_text(&elements),
        }
    }
}

/// Empty image fields arrive as `{}`
#[derive(Debug, Default, Deserialize)]
pub struct ImageField {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WireBlock {
    #[serde(default)]
    pub heading: Option<TextField>,
    #[serde(default)]
    pub body: Vec<RichTextElement>,
}

fn text(field: Option<TextField>) -> String {
    field.map(TextField::into_string).unwrap_or_default()
}

impl Document {
    pub fn into_summary(self) -> PostSummary {
        PostSummary {
            uid: self.uid,
            published_at: PublishedAt::parse(self.first_publication_date.as_deref()),
            title: text(self.data.title),
            subtitle: text(self.data.subtitle),
            author: text(self.data.author),
        }
    }

    pub fn into_post(self) -> Post {
        let uid = self.uid.unwrap_or(self.id);
        let banner = self.data.banner.and_then(|image| {
            image.url.filter(|u| !u.is_empty()).map(|url| Banner {
                url,
                alt: image.alt,
            })
        });
        let content = self
            .data
            .content
            .into_iter()
            .map(|block| ContentBlock {
                heading: text(block.heading),
                body: block.body,
            })
            .collect();

        Post {
            uid,
            published_at: PublishedAt::parse(self.first_publication_date.as_deref()),
            title: text(self.data.title),
            subtitle: text(self.data.subtitle),
            author: text(self.data.author),
            banner,
            content,
        }
    }
}

impl SearchResponse {
    pub fn into_page(self) -> PostPage {
        PostPage {
            page: self.page,
            total_pages: self.total_pages,
            next_page: self
                .next_page
                .filter(|n| !n.is_empty())
                .map(ContinuationRef::new),
            results: self
                .results
                .into_iter()
                .map(Document::into_summary)
                .collect(),
        }
    }
}
