//! Generator module - fetches content and writes the static site

mod render;

pub use render::{post_path, PageRenderer};

use anyhow::{bail, Context as _, Result};
use futures::stream::{self, StreamExt};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::fs;

use crate::client::{ContentSource, PostQuery};
use crate::config::SiteConfig;
use crate::error::ContentError;
use crate::feed::Feed;
use crate::i18n::I18n;
use crate::templates::ASSETS;
use crate::Blog;

lazy_static! {
    static ref UID_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
}

/// Whether `uid` can be used as a path segment under `post/`
pub fn is_valid_uid(uid: &str) -> bool {
    UID_RE.is_match(uid)
}

/// Counts reported after a build
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GenerateStats {
    pub listed: usize,
    pub posts: usize,
    pub skipped: usize,
}

/// Static site generator over a content source
pub struct Generator {
    config: SiteConfig,
    public_dir: PathBuf,
    renderer: PageRenderer,
    source: Arc<dyn ContentSource>,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog, source: Arc<dyn ContentSource>) -> Result<Self> {
        let mut i18n = I18n::new(&blog.config.language);
        i18n.load_languages(blog.base_dir.join(&blog.config.languages_dir))?;

        Ok(Self {
            renderer: PageRenderer::new(&blog.config, i18n)?,
            config: blog.config.clone(),
            public_dir: blog.public_dir.clone(),
            source,
        })
    }

    pub fn renderer(&self) -> &PageRenderer {
        &self.renderer
    }

    pub fn source(&self) -> &dyn ContentSource {
        self.source.as_ref()
    }

    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }

    /// Where the detail page of `uid` is written
    pub fn post_file(&self, uid: &str) -> PathBuf {
        self.public_dir.join("post").join(uid).join("index.html")
    }

    /// Generate the entire site
    pub async fn generate(&self) -> Result<GenerateStats> {
        fs::create_dir_all(&self.public_dir).await?;
        self.write_assets().await?;

        let listed = self.generate_index().await?;

        let uids = self
            .source
            .discover_uids(&PostQuery::identifiers(&self.config.api))
            .await
            .context("Failed to discover posts")?;
        tracing::info!("Discovered {} posts", uids.len());

        let (posts, skipped) = self.generate_posts(uids).await?;

        let not_found = self.renderer.render_not_found()?;
        self.write(&self.public_dir.join("404.html"), &not_found).await?;

        Ok(GenerateStats {
            listed,
            posts,
            skipped,
        })
    }

    async fn write_assets(&self) -> Result<()> {
        for (path, content) in ASSETS {
            self.write(&self.public_dir.join(path), content).await?;
        }
        Ok(())
    }

    /// Render the listing page from the first page of posts
    async fn generate_index(&self) -> Result<usize> {
        let feed = Feed::start(self.source.as_ref(), &PostQuery::listing(&self.config.api))
            .await
            .context("Failed to fetch the first page of posts")?;
        let html = self.renderer.render_listing(&feed)?;
        self.write(&self.public_dir.join("index.html"), &html).await?;
        Ok(feed.posts().len())
    }

    /// Build detail pages with at most `concurrency` fetches in flight
    async fn generate_posts(&self, uids: Vec<String>) -> Result<(usize, usize)> {
        let limit = self.config.concurrency.max(1);
        let mut results = stream::iter(uids)
            .map(|uid| async move {
                let outcome = self.build_post(&uid).await;
                (uid, outcome)
            })
            .buffer_unordered(limit);

        let mut built = 0;
        let mut skipped = 0;
        while let Some((uid, outcome)) = results.next().await {
            match outcome {
                Ok(_) => built += 1,
                Err(e) if is_not_found(&e) || is_invalid_uid(&e) => {
                    tracing::warn!("Skipping post {}: {}", uid, e);
                    skipped += 1;
                }
                Err(e) => return Err(e.context(format!("Failed to build post {}", uid))),
            }
        }

        Ok((built, skipped))
    }

    /// Fetch, render and write one detail page; returns the written file
    pub async fn build_post(&self, uid: &str) -> Result<PathBuf> {
        if !is_valid_uid(uid) {
            bail!(InvalidUid(uid.to_string()));
        }

        let post = self.source.get_post(uid).await?;
        let html = self.renderer.render_post(&post)?;
        let path = self.post_file(uid);
        self.write(&path, &html).await?;
        Ok(path)
    }

    /// Write `content` next to `path` and rename it into place, so readers
    /// see either the old file or the complete new one
    async fn write(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let temp = temp_path(path);
        fs::write(&temp, content)
            .await
            .with_context(|| format!("Failed to write {:?}", temp))?;
        if let Err(e) = fs::rename(&temp, path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e).with_context(|| format!("Failed to move {:?} into place", path));
        }

        tracing::debug!("Generated: {:?}", path);
        Ok(())
    }
}

/// A unique hidden sibling of `path`
fn temp_path(path: &Path) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(
        ".{}.{}.{}.tmp",
        name,
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::Relaxed)
    ))
}

/// A uid that cannot be turned into an output path
#[derive(Debug, thiserror::Error)]
#[error("invalid post uid: {0:?}")]
pub struct InvalidUid(pub String);

/// Whether a build error means the post does not exist
pub fn is_not_found(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<ContentError>()
        .map(ContentError::is_not_found)
        .unwrap_or(false)
}

fn is_invalid_uid(error: &anyhow::Error) -> bool {
    error.downcast_ref::<InvalidUid>().is_some()
}
