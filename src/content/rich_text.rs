//! Structured rich text as delivered by the content API
//!
//! Rich text arrives as a list of elements (paragraphs, headings, list
//! items, images...). Text elements carry inline spans whose offsets are
//! UTF-16 code units, matching the API's JavaScript heritage.

use serde::{Deserialize, Serialize};

use crate::helpers::html_escape;

/// One element of a rich text field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RichTextElement {
    #[serde(rename = "paragraph")]
    Paragraph(TextElement),
    #[serde(rename = "heading1")]
    Heading1(TextElement),
    #[serde(rename = "heading2")]
    Heading2(TextElement),
    #[serde(rename = "heading3")]
    Heading3(TextElement),
    #[serde(rename = "heading4")]
    Heading4(TextElement),
    #[serde(rename = "heading5")]
    Heading5(TextElement),
    #[serde(rename = "heading6")]
    Heading6(TextElement),
    #[serde(rename = "preformatted")]
    Preformatted(TextElement),
    #[serde(rename = "list-item")]
    ListItem(TextElement),
    #[serde(rename = "o-list-item")]
    OrderedListItem(TextElement),
    #[serde(rename = "image")]
    Image(ImageElement),
    #[serde(rename = "embed")]
    Embed(EmbedElement),
    /// Element types this renderer does not know about
    #[serde(other)]
    Unsupported,
}

/// Text plus inline formatting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub spans: Vec<Span>,
}

impl TextElement {
    /// Plain text element without formatting
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            spans: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageElement {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbedElement {
    #[serde(default)]
    pub oembed: OEmbed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OEmbed {
    #[serde(default)]
    pub embed_url: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// Inline formatting over `[start, end)` in UTF-16 code units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: SpanKind,
    #[serde(default)]
    pub data: Option<SpanData>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    Strong,
    Em,
    Hyperlink,
    Label,
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpanData {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

impl RichTextElement {
    /// The text content, if this is a text element
    pub fn text(&self) -> Option<&TextElement> {
        match self {
            Self::Paragraph(t)
            | Self::Heading1(t)
            | Self::Heading2(t)
            | Self::Heading3(t)
            | Self::Heading4(t)
            | Self::Heading5(t)
            | Self::Heading6(t)
            | Self::Preformatted(t)
            | Self::ListItem(t)
            | Self::OrderedListItem(t) => Some(t),
            Self::Image(_) | Self::Embed(_) | Self::Unsupported => None,
        }
    }
}

/// Plain-text rendering: element texts joined by a single space
pub fn as_text(elements: &[RichTextElement]) -> String {
    elements
        .iter()
        .filter_map(|e| e.text())
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Markup rendering. The result is not sanitized; callers embedding it in a
/// page must pass it through [`crate::helpers::Sanitizer`].
pub fn as_html(elements: &[RichTextElement]) -> String {
    let mut html = String::new();
    let mut open_list: Option<&'static str> = None;

    for element in elements {
        let list_tag = match element {
            RichTextElement::ListItem(_) => Some("ul"),
            RichTextElement::OrderedListItem(_) => Some("ol"),
            _ => None,
        };

        if open_list != list_tag {
            if let Some(tag) = open_list {
                html.push_str(&format!("</{}>", tag));
            }
            if let Some(tag) = list_tag {
                html.push_str(&format!("<{}>", tag));
            }
            open_list = list_tag;
        }

        match element {
            RichTextElement::Paragraph(t) => wrap(&mut html, "p", t),
            RichTextElement::Heading1(t) => wrap(&mut html, "h1", t),
            RichTextElement::Heading2(t) => wrap(&mut html, "h2", t),
            RichTextElement::Heading3(t) => wrap(&mut html, "h3", t),
            RichTextElement::Heading4(t) => wrap(&mut html, "h4", t),
            RichTextElement::Heading5(t) => wrap(&mut html, "h5", t),
            RichTextElement::Heading6(t) => wrap(&mut html, "h6", t),
            RichTextElement::Preformatted(t) => {
                html.push_str("<pre>");
                html.push_str(&html_escape(&t.text));
                html.push_str("</pre>");
            }
            RichTextElement::ListItem(t) | RichTextElement::OrderedListItem(t) => {
                wrap(&mut html, "li", t)
            }
            RichTextElement::Image(img) => {
                html.push_str(&format!(
                    r#"<p class="block-img"><img src="{}" alt="{}"></p>"#,
                    html_escape(&img.url),
                    html_escape(img.alt.as_deref().unwrap_or(""))
                ));
            }
            RichTextElement::Embed(embed) => {
                let url = html_escape(&embed.oembed.embed_url);
                let title = embed
                    .oembed
                    .title
                    .as_deref()
                    .map(html_escape)
                    .unwrap_or_else(|| url.clone());
                html.push_str(&format!(
                    r#"<div class="embed"><a href="{}">{}</a></div>"#,
                    url, title
                ));
            }
            RichTextElement::Unsupported => {}
        }
    }

    if let Some(tag) = open_list {
        html.push_str(&format!("</{}>", tag));
    }

    html
}

fn wrap(html: &mut String, tag: &str, text: &TextElement) {
    html.push_str(&format!("<{}>", tag));
    html.push_str(&render_spans(&text.text, &text.spans));
    html.push_str(&format!("</{}>", tag));
}

/// Render text with overlapping spans by cutting it at every span boundary
/// and wrapping each segment in the spans that cover it.
fn render_spans(text: &str, spans: &[Span]) -> String {
    let resolved: Vec<(usize, usize, &Span)> = spans
        .iter()
        .filter_map(|span| {
            let start = utf16_to_byte(text, span.start);
            let end = utf16_to_byte(text, span.end);
            (start < end).then_some((start, end, span))
        })
        .collect();

    let mut cuts: Vec<usize> = vec![0, text.len()];
    for (start, end, _) in &resolved {
        cuts.push(*start);
        cuts.push(*end);
    }
    cuts.sort_unstable();
    cuts.dedup();

    let mut out = String::with_capacity(text.len());
    for window in cuts.windows(2) {
        let (from, to) = (window[0], window[1]);
        let mut active: Vec<&(usize, usize, &Span)> = resolved
            .iter()
            .filter(|(start, end, _)| *start <= from && to <= *end)
            .collect();
        // outermost first
        active.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

        for (_, _, span) in &active {
            out.push_str(&open_tag(span));
        }
        out.push_str(&html_escape(&text[from..to]).replace('\n', "<br>"));
        for (_, _, span) in active.iter().rev() {
            out.push_str(close_tag(span.kind));
        }
    }
    out
}

fn open_tag(span: &Span) -> String {
    let data = span.data.clone().unwrap_or_default();
    match span.kind {
        SpanKind::Strong => "<strong>".to_string(),
        SpanKind::Em => "<em>".to_string(),
        SpanKind::Hyperlink => {
            let href = html_escape(data.url.as_deref().unwrap_or("#"));
            match data.target.as_deref() {
                Some(target) => format!(r#"<a href="{}" target="{}">"#, href, html_escape(target)),
                None => format!(r#"<a href="{}">"#, href),
            }
        }
        SpanKind::Label => format!(
            r#"<span class="{}">"#,
            html_escape(data.label.as_deref().unwrap_or("label"))
        ),
        SpanKind::Unsupported => String::new(),
    }
}

fn close_tag(kind: SpanKind) -> &'static str {
    match kind {
        SpanKind::Strong => "</strong>",
        SpanKind::Em => "</em>",
        SpanKind::Hyperlink => "</a>",
        SpanKind::Label => "</span>",
        SpanKind::Unsupported => "",
    }
}

/// Convert a UTF-16 offset into a byte offset on a char boundary, clamped
/// to the end of the text.
fn utf16_to_byte(text: &str, offset: usize) -> usize {
    let mut units = 0;
    for (byte, ch) in text.char_indices() {
        if units >= offset {
            return byte;
        }
        units += ch.len_utf16();
    }
    text.len()
}
