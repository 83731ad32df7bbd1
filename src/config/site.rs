//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub language: String,
    pub timezone: String,
    pub logo: String,

    // Directory
    pub public_dir: String,
    pub languages_dir: String,

    // Date format (date-fns style tokens, e.g. "d MMM yyyy")
    pub date_format: String,

    // Reading time
    pub words_per_minute: usize,

    // Content API
    #[serde(default)]
    pub api: ApiConfig,

    // Generation
    pub fallback: FallbackMode,
    pub concurrency: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            description: String::new(),
            language: "pt-BR".to_string(),
            timezone: String::new(),
            logo: "/images/logo.svg".to_string(),


            public_dir: "public".to_string(),
            languages_dir: "languages".to_string(),

            date_format: "d MMM yyyy".to_string(),

            words_per_minute: 200,

            api: ApiConfig::default(),

            fallback: FallbackMode::Blocking,
            concurrency: 4,
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply command-line / environment overrides for the content API
    pub fn override_api(&mut self, endpoint: Option<String>, access_token: Option<String>) {
        if let Some(endpoint) = endpoint {
            tracing::debug!("Content API endpoint overridden: {}", endpoint);
            self.api.endpoint = endpoint;
        }
        if let Some(token) = access_token {
            self.api.access_token = Some(token);
        }
    }

    /// Resolve the configured timezone, falling back to UTC
    pub fn tz(&self) -> chrono_tz::Tz {
        if self.timezone.is_empty() {
            return chrono_tz::UTC;
        }
        self.timezone.parse().unwrap_or_else(|_| {
            tracing::warn!("Unknown timezone {:?}, using UTC", self.timezone);
            chrono_tz::UTC
        })
    }
}

/// Content API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the API, e.g. `https://my-repo.cdn.prismic.io/api/v2`
    pub endpoint: String,
    pub access_token: Option<String>,
    pub document_type: String,
    /// Posts per listing page
    pub per_page: usize,
    /// Fields projected for listing entries
    pub listing_fields: Vec<String>,
    /// Ordering passed to the API, e.g. `document.first_publication_date desc`
    pub order_by: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            access_token: None,
            document_type: "post".to_string(),
            per_page: 1,
            listing_fields: vec![
                "post.title".to_string(),
                "post.subtitle".to_string(),
                "post.author".to_string(),
            ],
            order_by: None,
            timeout_secs: 30,
        }
    }
}

/// What the server does for a post path that was not generated at build time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FallbackMode {
    /// Generate on request and answer once the page exists
    Blocking,
    /// Answer with a loading page and generate in the background
    Placeholder,
    /// Answer 404
    Disabled,
}
