//! Built-in site templates using the Tera template engine
//!
//! Templates are embedded in the binary. Autoescaping is on; the only
//! value marked safe is rich text that already went through the sanitizer.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

/// Static assets written next to the generated pages: (public path, contents)
pub const ASSETS: &[(&str, &str)] = &[
    ("styles/main.css", include_str!("site/main.css")),
    ("images/logo.svg", include_str!("site/logo.svg")),
];

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("index.html", include_str!("site/index.html")),
            ("post_items.html", include_str!("site/post_items.html")),
            ("post.html", include_str!("site/post.html")),
            ("loading.html", include_str!("site/loading.html")),
            ("message.html", include_str!("site/message.html")),
        ])?;

        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{}{}",
            truncated.trim_end(),
            omission
        )))
    }
}

// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub language: String,
    pub logo: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LabelsData {
    pub home: String,
    pub load_more: String,
    pub loading: String,
    pub load_failed: String,
}

/// A post in the listing
#[derive(Debug, Clone, Serialize)]
pub struct PostCardData {
    /// `None` when the post has no uid to link to
    pub path: Option<String>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: String,
    pub datetime: String,
}

/// A post on its detail page
#[derive(Debug, Clone, Serialize)]
pub struct PostPageData {
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: String,
    pub datetime: String,
    pub reading_time: String,
    pub banner_url: Option<String>,
    pub banner_alt: String,
    pub blocks: Vec<BlockData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockData {
    pub heading: String,
    /// Sanitized markup
    pub html: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteData {
        SiteData {
            title: "spacetraveling".to_string(),
            description: String::new(),
            language: "pt-BR".to_string(),
            logo: "/images/logo.svg".to_string(),
        }
    }

    fn labels() -> LabelsData {
        LabelsData {
            home: "Home".to_string(),
            load_more: "Load more posts".to_string(),
            loading: "Loading...".to_string(),
            load_failed: "Failed".to_string(),
        }
    }

    #[test]
    fn test_templates_parse() {
        assert!(TemplateRenderer::new().is_ok());
    }

    #[test]
    fn test_render_escapes_text_but_not_block_html() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = Context::new();
        context.insert("site", &site());
        context.insert("labels", &labels());
        context.insert(
            "post",
            &PostPageData {
                title: "<script>x</script>".to_string(),
                subtitle: String::new(),
                author: "Ana".to_string(),
                date: "25 mar 2021".to_string(),
                datetime: String::new(),
                reading_time: "4 min".to_string(),
                banner_url: None,
                banner_alt: String::new(),
                blocks: vec![BlockData {
                    heading: "Intro".to_string(),
                    html: "<p><strong>ok</strong></p>".to_string(),
                }],
            },
        );

        let html = renderer.render("post.html", &context).unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("<p><strong>ok</strong></p>"));
        assert!(html.contains("4 min"));
        // no datetime attribute for unknown dates
        assert!(html.contains("<time>25 mar 2021</time>"));
    }

    #[test]
    fn test_load_more_button_only_with_continuation() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = Context::new();
        context.insert("site", &site());
        context.insert("labels", &labels());
        context.insert("posts", &Vec::<PostCardData>::new());
        context.insert("next_page", &None::<String>);
        let html = renderer.render("index.html", &context).unwrap();
        assert!(!html.contains("load-more"));

        context.insert("next_page", &Some("https://api.test/search?page=2"));
        let html = renderer.render("index.html", &context).unwrap();
        assert!(html.contains(r#"id="load-more""#));
        assert!(html.contains("Load more posts"));
    }

    #[test]
    fn test_truncate_chars_filter() {
        let mut args = HashMap::new();
        args.insert("length".to_string(), tera::Value::from(5));
        let value = truncate_chars_filter(&tera::Value::from("hello world"), &args).unwrap();
        assert_eq!(value, tera::Value::from("hello..."));
    }
}
