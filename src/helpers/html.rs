//! HTML helper functions

use ammonia::Builder;
use std::collections::{HashMap, HashSet};

/// Escape text for use in HTML content or a quoted attribute
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Allow-list sanitizer for markup rendered from CMS rich text
pub struct Sanitizer {
    builder: Builder<'static>,
}

impl Sanitizer {
    pub fn new() -> Self {
        let mut builder = Builder::default();

        let tags: HashSet<&'static str> = HashSet::from([
            "a", "br", "div", "em", "h1", "h2", "h3", "h4", "h5", "h6", "img", "li", "ol", "p",
            "pre", "span", "strong", "ul",
        ]);
        builder.tags(tags);

        let mut tag_attributes: HashMap<&'static str, HashSet<&'static str>> = HashMap::new();
        tag_attributes.insert("a", HashSet::from(["href", "target"]));
        tag_attributes.insert("img", HashSet::from(["src", "alt"]));
        builder.tag_attributes(tag_attributes);

        builder.generic_attributes(HashSet::from(["class"]));
        builder.url_schemes(HashSet::from(["http", "https", "mailto"]));
        builder.link_rel(Some("noopener noreferrer"));

        Self { builder }
    }

    /// Clean untrusted markup, keeping only allow-listed tags and attributes
    pub fn clean(&self, html: &str) -> String {
        self.builder.clean(html).to_string()
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}
