//! Live Payload CMS over its REST API.

use super::{PostQuery, PostSource, SourceError};
use crate::cms::{CategoriesEnvelope, PostsEnvelope, RawPost};
use crate::config::CmsConfig;
use crate::media::MediaResolver;
use crate::transform::to_post;
use crate::types::{Post, PostPage};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Page size used when syncing the whole collection.
pub const SYNC_PAGE_LIMIT: u32 = 100;

/// Relationship depth that populates categories and hero images.
pub const SYNC_DEPTH: u32 = 2;

pub struct RemoteSource {
    http: reqwest::Client,
    api_url: String,
    website_id: String,
    media: MediaResolver,
}

impl RemoteSource {
    pub fn new(
        http: reqwest::Client,
        api_url: impl Into<String>,
        website_id: impl Into<String>,
        media: MediaResolver,
    ) -> Self {
        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            website_id: website_id.into(),
            media,
        }
    }

    /// Build from config with an HTTP client carrying the configured timeout.
    pub fn from_config(config: &CmsConfig) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self::new(
            http,
            &config.api_url,
            &config.website_id,
            MediaResolver::new(config.media_base()),
        ))
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn media(&self) -> &MediaResolver {
        &self.media
    }

    /// Filters every posts request carries: tenant and published status.
    fn scope(&self) -> Vec<(&'static str, String)> {
        vec![
            ("where[externalSource][equals]", self.website_id.clone()),
            ("where[_status][equals]", "published".to_string()),
        ]
    }

    fn list_params(&self, query: &PostQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", query.page.to_string()),
            ("limit", query.limit.to_string()),
        ];
        params.extend(self.scope());
        params.push(("sort", "-publishedAt".to_string()));
        if let Some(category) = &query.category {
            params.push(("where[categories.title][equals]", category.clone()));
        }
        params
    }

    fn slug_params(&self, slug: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![("where[slug][equals]", slug.to_string())];
        params.extend(self.scope());
        params
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> Result<T, SourceError> {
        let url = format!("{}/{path}", self.api_url);
        debug!(%url, "CMS request");
        let response = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// One page of the posts collection with relationships populated, as
    /// untouched JSON documents. Used by the snapshot sync.
    pub async fn fetch_raw_page(
        &self,
        page: u32,
        limit: u32,
    ) -> Result<PostsEnvelope<serde_json::Value>, SourceError> {
        let mut params = self.list_params(&PostQuery::page(page, limit));
        params.push(("depth", SYNC_DEPTH.to_string()));
        self.get_json("posts", &params).await
    }
}

#[async_trait]
impl PostSource for RemoteSource {
    fn name(&self) -> &'static str {
        "cms"
    }

    async fn fetch_posts(&self, query: &PostQuery) -> Result<PostPage, SourceError> {
        let envelope: PostsEnvelope<RawPost> =
            self.get_json("posts", &self.list_params(query)).await?;
        Ok(PostPage {
            posts: envelope
                .docs
                .iter()
                .map(|raw| to_post(raw, &self.media))
                .collect(),
            total: envelope.total_docs,
            has_more: envelope.has_next_page,
        })
    }

    async fn fetch_post(&self, slug: &str) -> Result<Option<Post>, SourceError> {
        let envelope: PostsEnvelope<RawPost> =
            self.get_json("posts", &self.slug_params(slug)).await?;
        Ok(envelope.docs.first().map(|raw| to_post(raw, &self.media)))
    }

    async fn fetch_categories(&self) -> Result<Vec<String>, SourceError> {
        let envelope: CategoriesEnvelope = self
            .get_json("categories", &[("limit", "100".to_string())])
            .await?;
        Ok(envelope.docs.into_iter().map(|c| c.title).collect())
    }
}
