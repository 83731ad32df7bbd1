//! reqwest client for the Prismic REST API (v2)

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tokio::sync::OnceCell;
use url::Url;

use super::predicate::{to_query, Predicate};
use super::response::{ApiInfo, SearchResponse};
use super::{ContentSource, PostQuery};
use crate::config::ApiConfig;
use crate::content::{without_param, ContinuationRef, Post, PostPage, ACCESS_TOKEN_PARAM};
use crate::error::ContentError;

/// Authenticated handle to a content repository
pub struct PrismicClient {
    client: Client,
    endpoint: Url,
    access_token: Option<String>,
    document_type: String,
    master_ref: OnceCell<String>,
}

impl PrismicClient {
    /// Create a client for `endpoint`, e.g. `https://my-repo.cdn.prismic.io/api/v2`
    pub fn new(endpoint: &str, access_token: Option<String>) -> Result<Self, ContentError> {
        Self::with_timeout(endpoint, access_token, Duration::from_secs(30))
    }

    pub fn with_timeout(
        endpoint: &str,
        access_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ContentError> {
        if endpoint.trim().is_empty() {
            return Err(ContentError::InvalidConfig(
                "api.endpoint is not set".to_string(),
            ));
        }
        let endpoint = Url::parse(endpoint.trim_end_matches('/'))
            .map_err(|e| ContentError::InvalidConfig(format!("bad endpoint {:?}: {}", endpoint, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("headless-blog/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            access_token: access_token.filter(|t| !t.is_empty()),
            document_type: "post".to_string(),
            master_ref: OnceCell::new(),
        })
    }

    /// Build from the `api` section of the site configuration
    pub fn from_config(config: &ApiConfig) -> Result<Self, ContentError> {
        let mut client = Self::with_timeout(
            &config.endpoint,
            config.access_token.clone(),
            Duration::from_secs(config.timeout_secs),
        )?;
        client.document_type = config.document_type.clone();
        Ok(client)
    }

    /// The master ref, fetched once per client
    async fn master_ref(&self) -> Result<&str, ContentError> {
        let reference = self
            .master_ref
            .get_or_try_init(|| async {
                let mut url = self.endpoint.clone();
                self.authorize(&mut url);
                let info: ApiInfo = self.get_json(url).await?;
                let master = info.master_ref().ok_or(ContentError::NoMasterRef)?;
                tracing::debug!("Resolved master ref {}", master);
                Ok::<_, ContentError>(master.to_string())
            })
            .await?;
        Ok(reference.as_str())
    }

    fn authorize(&self, url: &mut Url) {
        if let Some(token) = &self.access_token {
            url.query_pairs_mut().append_pair(ACCESS_TOKEN_PARAM, token);
        }
    }

    async fn search(&self, params: &[(&str, String)]) -> Result<SearchResponse, ContentError> {
        let reference = self.master_ref().await?.to_string();

        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| ContentError::InvalidConfig("endpoint cannot be a base URL".to_string()))?
            .extend(["documents", "search"]);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("ref", &reference);
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }
        self.authorize(&mut url);

        self.get_json(url).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, ContentError> {
        let shown = without_param(&url, ACCESS_TOKEN_PARAM).to_string();
        tracing::debug!("GET {}", shown);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Content API returned {} for {}", status, shown);
            return Err(ContentError::from_status(status.as_u16(), &shown));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ContentSource for PrismicClient {
    async fn query_posts(&self, query: &PostQuery) -> Result<PostPage, ContentError> {
        let mut params = vec![
            ("q", to_query(&[Predicate::document_type(&query.document_type)])),
            ("pageSize", query.page_size.to_string()),
        ];
        if !query.fetch.is_empty() {
            params.push(("fetch", query.fetch.join(",")));
        }
        if let Some(order_by) = &query.order_by {
            params.push(("orderings", format!("[{}]", order_by)));
        }

        let page = self.search(&params).await?.into_page();
        tracing::debug!(
            "Fetched page {}/{} with {} posts",
            page.page,
            page.total_pages,
            page.results.len()
        );
        Ok(page)
    }

    async fn fetch_page(&self, next: &ContinuationRef) -> Result<PostPage, ContentError> {
        let foreign = || ContentError::ForeignContinuation {
            expected: self.endpoint.origin().ascii_serialization(),
            found: next.public().as_str().to_string(),
        };

        let url = Url::parse(next.as_str()).map_err(|_| foreign())?;
        if url.origin() != self.endpoint.origin() || !url.path().starts_with(self.endpoint.path())
        {
            return Err(foreign());
        }

        let mut url = without_param(&url, ACCESS_TOKEN_PARAM);
        self.authorize(&mut url);

        let response: SearchResponse = self.get_json(url).await?;
        Ok(response.into_page())
    }

    async fn get_post(&self, uid: &str) -> Result<Post, ContentError> {
        let params = [
            (
                "q",
                to_query(&[
                    Predicate::document_type(&self.document_type),
                    Predicate::uid(&self.document_type, uid),
                ]),
            ),
            ("pageSize", "1".to_string()),
        ];

        let response = self.search(&params).await?;
        response
            .results
            .into_iter()
            .next()
            .map(|doc| doc.into_post())
            .ok_or_else(|| ContentError::NotFound(uid.to_string()))
    }
}
