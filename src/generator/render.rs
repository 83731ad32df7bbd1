//! Page rendering: turns posts and feeds into HTML strings

use anyhow::Result;
use chrono::Locale;
use chrono_tz::Tz;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tera::Context;

use crate::config::SiteConfig;
use crate::content::rich_text;
use crate::content::{Post, PostSummary, PublishedAt};
use crate::feed::Feed;
use crate::helpers::{date_xml, format_published, locale_for, Sanitizer};
use crate::i18n::I18n;
use crate::templates::{
    BlockData, LabelsData, PostCardData, PostPageData, SiteData, TemplateRenderer,
};

/// Characters escaped in a uid path segment
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_');

/// URL path of a post's detail page
pub fn post_path(uid: &str) -> String {
    format!("/post/{}/", utf8_percent_encode(uid, SEGMENT))
}

/// Renders every page of the site
pub struct PageRenderer {
    templates: TemplateRenderer,
    sanitizer: Sanitizer,
    i18n: I18n,
    site: SiteData,
    date_format: String,
    tz: Tz,
    locale: Locale,
    words_per_minute: usize,
}

impl PageRenderer {
    pub fn new(config: &SiteConfig, i18n: I18n) -> Result<Self> {
        Ok(Self {
            templates: TemplateRenderer::new()?,
            sanitizer: Sanitizer::new(),
            site: SiteData {
                title: config.title.clone(),
                description: config.description.clone(),
                language: config.language.clone(),
                logo: config.logo.clone(),
            },
            date_format: config.date_format.clone(),
            tz: config.tz(),
            locale: locale_for(&config.language),
            words_per_minute: config.words_per_minute,
            i18n,
        })
    }

    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site);
        context.insert(
            "labels",
            &LabelsData {
                home: self.i18n.get("home"),
                load_more: self.i18n.get("load_more"),
                loading: self.i18n.get("loading"),
                load_failed: self.i18n.get("load_failed"),
            },
        );
        context
    }

    fn date(&self, published: &PublishedAt) -> String {
        format_published(
            published,
            &self.date_format,
            &self.tz,
            self.locale,
            &self.i18n.get("date_unavailable"),
        )
    }

    fn card(&self, post: &PostSummary) -> PostCardData {
        PostCardData {
            path: post.uid.as_deref().map(post_path),
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            author: post.author.clone(),
            date: self.date(&post.published_at),
            datetime: date_xml(&post.published_at),
        }
    }

    fn post_data(&self, post: &Post) -> PostPageData {
        let blocks = post
            .content
            .iter()
            .map(|block| BlockData {
                heading: block.heading.clone(),
                html: self.sanitizer.clean(&rich_text::as_html(&block.body)),
            })
            .collect();

        PostPageData {
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            author: post.author.clone(),
            date: self.date(&post.published_at),
            datetime: date_xml(&post.published_at),
            reading_time: self.i18n.get_count(
                "reading_time",
                post.reading_time(self.words_per_minute).minutes(),
            ),
            banner_url: post.banner.as_ref().map(|b| b.url.clone()),
            banner_alt: post
                .banner
                .as_ref()
                .and_then(|b| b.alt.clone())
                .unwrap_or_else(|| post.title.clone()),
            blocks,
        }
    }

    /// The listing page. The continuation is embedded without its token.
    pub fn render_listing(&self, feed: &Feed) -> Result<String> {
        let cards: Vec<PostCardData> = feed.posts().iter().map(|p| self.card(p)).collect();
        let next_page = feed.next_page().map(|n| n.public().as_str().to_string());

        let mut context = self.base_context();
        context.insert("posts", &cards);
        context.insert("next_page", &next_page);
        self.templates.render("index.html", &context)
    }

    /// Listing entries only, appended by the load-more script
    pub fn render_items(&self, posts: &[PostSummary]) -> Result<String> {
        let cards: Vec<PostCardData> = posts.iter().map(|p| self.card(p)).collect();
        let mut context = Context::new();
        context.insert("posts", &cards);
        self.templates.render("post_items.html", &context)
    }

    pub fn render_post(&self, post: &Post) -> Result<String> {
        let mut context = self.base_context();
        context.insert("post", &self.post_data(post));
        self.templates.render("post.html", &context)
    }

    /// Placeholder shown while a post is generated on demand
    pub fn render_loading(&self, retry_secs: u64) -> Result<String> {
        let mut context = self.base_context();
        context.insert("retry_secs", &retry_secs);
        self.templates.render("loading.html", &context)
    }

    pub fn render_not_found(&self) -> Result<String> {
        self.render_message("not_found")
    }

    pub fn render_error(&self) -> Result<String> {
        self.render_message("error")
    }

    fn render_message(&self, key: &str) -> Result<String> {
        let mut context = self.base_context();
        context.insert("heading", &self.i18n.get(&format!("{}.title", key)));
        context.insert("message", &self.i18n.get(&format!("{}.message", key)));
        self.templates.render("message.html", &context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::memory::sample_post;
    use crate::content::rich_text::{RichTextElement, TextElement};
    use crate::content::{ContentBlock, ContinuationRef, PostPage};

    fn renderer() -> PageRenderer {
        PageRenderer::new(&SiteConfig::default(), I18n::new("pt-BR")).unwrap()
    }

    #[test]
    fn test_post_path() {
        assert_eq!(post_path("como-utilizar_hooks"), "/post/como-utilizar_hooks/");
        assert_eq!(post_path("a/../b"), "/post/a%2F%2E%2E%2Fb/");
    }

    #[test]
    fn test_render_post_has_reading_time_and_date() {
        let post = sample_post("hello", 450);
        let html = renderer().render_post(&post).unwrap();
        assert!(html.contains("3 min"));
        assert!(html.contains("25 mar 2021"));
        assert!(html.contains("Heading of hello"));
    }

    #[test]
    fn test_render_post_sanitizes_rich_text() {
        let mut post = sample_post("x", 1);
        post.content = vec![ContentBlock {
            heading: String::new(),
            body: vec![RichTextElement::Preformatted(TextElement::plain(
                "<script>alert(1)</script>",
            ))],
        }];
        let html = renderer().render_post(&post).unwrap();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("<pre>"));
    }

    #[test]
    fn test_render_post_without_date() {
        let mut post = sample_post("x", 1);
        post.published_at = PublishedAt::unknown();
        let html = renderer().render_post(&post).unwrap();
        assert!(html.contains("data indisponível"));
    }

    #[test]
    fn test_render_listing_hides_token() {
        let feed = Feed::from_page(PostPage {
            results: vec![sample_post("a", 1).summary()],
            next_page: Some(ContinuationRef::new(
                "https://blog.test/api/v2/documents/search?page=2&access_token=secret",
            )),
            page: 1,
            total_pages: 2,
        });
        let html = renderer().render_listing(&feed).unwrap();
        assert!(html.contains("Title of a"));
        assert!(html.contains("Carregar mais posts"));
        assert!(!html.contains("secret"));
    }

    #[test]
    fn test_render_items_without_uid_has_no_link() {
        let mut summary = sample_post("a", 1).summary();
        summary.uid = None;
        let html = renderer().render_items(&[summary]).unwrap();
        assert!(html.contains("Title of a"));
        assert!(!html.contains("<a href"));
    }

    #[test]
    fn test_render_messages() {
        let r = renderer();
        assert!(r.render_not_found().unwrap().contains("Post não encontrado"));
        assert!(r.render_error().unwrap().contains("Algo deu errado"));
        assert!(r.render_loading(2).unwrap().contains(r#"content="2""#));
    }
}
