//! List posts available from the content API

use anyhow::{Context, Result};

use crate::client::PostQuery;
use crate::content::PostSummary;
use crate::feed::Feed;
use crate::Blog;

/// Print the first listing page, or every post with `all`
pub async fn run(blog: &Blog, all: bool) -> Result<()> {
    let client = blog.client()?;
    let mut feed = Feed::start(client.as_ref(), &PostQuery::listing(&blog.config.api))
        .await
        .context("Failed to fetch posts")?;

    if all {
        feed.load_all(client.as_ref()).await?;
    }

    println!("Posts ({}):", feed.posts().len());
    for post in feed.posts() {
        println!("  {}", describe(post));
    }
    if feed.next_page().is_some() {
        println!("  ... more available (use --all)");
    }

    Ok(())
}

fn describe(post: &PostSummary) -> String {
    let date = post
        .published_at
        .get()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "----------".to_string());
    let uid = post.uid.as_deref().unwrap_or("<no uid>");
    format!("{} - {} [{}]", date, post.title, uid)
}
