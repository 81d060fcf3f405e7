//! Post sources: one per fallback tier.
//!
//! | Tier | Source | Provenance | Cached |
//! |---|---|---|---|
//! | 1 | [`RemoteSource`]: live CMS REST API | `cms` | yes |
//! | 2 | [`SnapshotSource`]: build-time JSON snapshot | `cache` | yes |
//! | 3 | [`StaticSource`]: posts bundled in the binary | `static` | no |
//!
//! Every tier implements [`PostSource`], and the
//! [`ContentClient`](crate::client::ContentClient) tries them in order. The
//! fallback policy is the order of a `Vec`, so a test can run any subset of
//! the chain, or swap a tier for a fake.
//!
//! A source answers each request with a result or a [`SourceError`]. Errors
//! never leave the client: they are logged and the next tier is asked.

pub mod bundled;
pub mod local;
pub mod remote;

pub use bundled::StaticSource;
pub use local::SnapshotSource;
pub use remote::RemoteSource;

use crate::snapshot::SnapshotError;
use crate::types::{Post, PostPage, sort_newest_first};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("CMS returned status {0}")]
    Status(u16),
    #[error("malformed CMS response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot unavailable: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("snapshot has no posts")]
    EmptySnapshot,
    #[error("{0} does not list categories")]
    Unsupported(&'static str),
}

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

/// Parameters of a post listing request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostQuery {
    pub page: u32,
    pub limit: u32,
    pub category: Option<String>,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            category: None,
        }
    }
}

impl PostQuery {
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Cache key covering every parameter. A category is prefixed with
    /// `cat:` so no category name collides with the unfiltered `all`.
    pub fn cache_key(&self) -> String {
        match &self.category {
            Some(category) => format!("posts-{}-{}-cat:{category}", self.page, self.limit),
            None => format!("posts-{}-{}-all", self.page, self.limit),
        }
    }
}

pub fn post_cache_key(slug: &str) -> String {
    format!("post-{slug}")
}

pub const CATEGORIES_CACHE_KEY: &str = "categories";

/// One tier of the fallback chain.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Whether results from this source go into the client cache.
    fn cacheable(&self) -> bool {
        true
    }

    async fn fetch_posts(&self, query: &PostQuery) -> Result<PostPage, SourceError>;

    /// `Ok(None)` means the source answered and has no such post.
    async fn fetch_post(&self, slug: &str) -> Result<Option<Post>, SourceError>;

    async fn fetch_categories(&self) -> Result<Vec<String>, SourceError> {
        Err(SourceError::Unsupported(self.name()))
    }
}

/// Local filtering for tiers that hold the whole collection: keep posts
/// tagged with the query's category (case-insensitive), newest first.
pub(crate) fn select(mut posts: Vec<Post>, query: &PostQuery) -> PostPage {
    if let Some(category) = &query.category {
        posts.retain(|p| p.has_tag(category));
    }
    sort_newest_first(&mut posts);
    PostPage::complete(posts)
}
