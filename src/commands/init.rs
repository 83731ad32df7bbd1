//! Initialize a new blog site

use anyhow::{bail, Result};
use std::fs;
use std::path::Path;

const CONFIG_TEMPLATE: &str = r#"# Site
title: spacetraveling
description: ''
language: pt-BR
timezone: ''
logo: /images/logo.svg

# Directories
public_dir: public
languages_dir: languages

# Posts
date_format: d MMM yyyy
words_per_minute: 200

# Content API
# The endpoint and access token can also be set with
# PRISMIC_API_ENDPOINT and PRISMIC_ACCESS_TOKEN.
api:
  endpoint: https://your-repository.cdn.prismic.io/api/v2
  document_type: post
  per_page: 1
  listing_fields:
    - post.title
    - post.subtitle
    - post.author
  # order_by: document.first_publication_date desc
  timeout_secs: 30

# Server fallback for posts not generated at build time:
# blocking, placeholder or disabled
fallback: blocking

# Detail pages fetched in parallel while generating
concurrency: 4
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        bail!("{:?} already exists", config_path);
    }

    fs::create_dir_all(target_dir.join("languages"))?;
    fs::write(&config_path, CONFIG_TEMPLATE)?;
    tracing::debug!("Wrote {:?}", config_path);

    Ok(())
}
