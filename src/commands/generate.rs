//! Generate static files

use anyhow::Result;

use crate::generator::GenerateStats;
use crate::Blog;

/// Fetch all content and write the static site
pub async fn run(blog: &Blog) -> Result<GenerateStats> {
    let start = std::time::Instant::now();

    let generator = blog.generator()?;
    let stats = generator.generate().await?;

    tracing::info!(
        "Listing has {} posts, built {} post pages ({} skipped)",
        stats.listed,
        stats.posts,
        stats.skipped
    );
    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(stats)
}
