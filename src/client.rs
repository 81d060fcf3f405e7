//! Fetch, cache and fall back.
//!
//! [`ContentClient`] is the one entry point callers use. Each request:
//!
//! 1. looks up the cache under a key covering every request parameter,
//! 2. on a miss, asks each [`PostSource`] in order until one answers,
//! 3. caches the answer if that source is cacheable, and returns it.
//!
//! A failing source is logged and skipped. When every source fails, the
//! bundled [`StaticStore`] answers, so the public methods return plain values
//! and never an error.
//!
//! ```text
//!            ┌────────── hit ──────────┐
//! request ─▶ cache ─ miss ─▶ cms ─✗─▶ snapshot ─✗─▶ static
//!                             │          │             │
//!                             └─ cache ◀─┘             └─▶ caller (uncached)
//! ```

use crate::bundled::StaticStore;
use crate::cache::{CacheStats, Clock, SystemClock, TtlCache};
use crate::config::ContentConfig;
use crate::feed::{self, FeedOptions, RELATED_LIMIT, TagCount};
use crate::media::MediaResolver;
use crate::merge;
use crate::snapshot::SnapshotLocation;
use crate::source::{
    CATEGORIES_CACHE_KEY, PostQuery, PostSource, RemoteSource, SnapshotSource, SourceError,
    StaticSource, post_cache_key, select,
};
use crate::types::{Author, Post, PostPage};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Listing size used to find related posts.
const RELATED_POOL: u32 = 10;
/// Listing size used to count tags.
const TAG_POOL: u32 = 100;

/// Lifetimes of the three client caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub posts: Duration,
    pub categories: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            posts: crate::cache::POSTS_TTL,
            categories: crate::cache::CATEGORIES_TTL,
        }
    }
}

/// A post and the posts related to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostWithRelated {
    pub post: Post,
    pub related: Vec<Post>,
}

pub struct ContentClient {
    sources: Vec<Box<dyn PostSource>>,
    store: Arc<StaticStore>,
    pages: TtlCache<PostPage>,
    posts: TtlCache<Post>,
    categories: TtlCache<Vec<String>>,
}

impl ContentClient {
    /// A client over an explicit source chain.
    pub fn new(
        sources: Vec<Box<dyn PostSource>>,
        store: Arc<StaticStore>,
        clock: Arc<dyn Clock>,
        ttls: CacheTtls,
    ) -> Self {
        Self {
            sources,
            store,
            pages: TtlCache::new(ttls.posts, clock.clone()),
            posts: TtlCache::new(ttls.posts, clock.clone()),
            categories: TtlCache::new(ttls.categories, clock),
        }
    }

    /// The chain the configuration asks for: cms → snapshot → static when the
    /// CMS is enabled, static alone otherwise.
    pub fn from_config(config: &ContentConfig) -> Result<Self, SourceError> {
        let store = Arc::new(StaticStore::bundled());
        let mut sources: Vec<Box<dyn PostSource>> = Vec::new();

        if config.cms.enabled {
            let http = reqwest::Client::builder()
                .timeout(config.cms.timeout())
                .build()?;
            let media = MediaResolver::new(config.cms.media_base());
            sources.push(Box::new(RemoteSource::new(
                http.clone(),
                &config.cms.api_url,
                &config.cms.website_id,
                media.clone(),
            )));
            sources.push(Box::new(SnapshotSource::new(
                SnapshotLocation::parse(&config.snapshot.location),
                http,
                media,
            )));
        }
        sources.push(Box::new(StaticSource::new(store.clone())));

        let ttls = CacheTtls {
            posts: config.cache.posts_ttl(),
            categories: config.cache.categories_ttl(),
        };
        Ok(Self::new(sources, store, Arc::new(SystemClock), ttls))
    }

    /// Names of the sources in fallback order.
    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub fn store(&self) -> &StaticStore {
        &self.store
    }

    /// Combined lookup counters of the three caches.
    pub fn cache_stats(&self) -> CacheStats {
        self.pages.stats() + self.posts.stats() + self.categories.stats()
    }

    pub async fn fetch_posts(&self, query: &PostQuery) -> PostPage {
        let key = query.cache_key();
        if let Some(page) = self.pages.get(&key) {
            debug!(%key, "cache hit");
            return page;
        }

        for source in &self.sources {
            match source.fetch_posts(query).await {
                Ok(page) => {
                    debug!(source = source.name(), posts = page.posts.len(), "posts resolved");
                    if source.cacheable() {
                        self.pages.insert(key, page.clone());
                    }
                    return page;
                }
                Err(err) => {
                    warn!(source = source.name(), error = %err, "post listing failed, trying next source");
                }
            }
        }

        warn!("every source failed, serving bundled posts");
        select(self.store.posts().to_vec(), query)
    }

    /// `None` when no tier has a post with this slug.
    pub async fn fetch_post_by_slug(&self, slug: &str) -> Option<Post> {
        let key = post_cache_key(slug);
        if let Some(post) = self.posts.get(&key) {
            debug!(%key, "cache hit");
            return Some(post);
        }

        for source in &self.sources {
            match source.fetch_post(slug).await {
                Ok(Some(post)) => {
                    if source.cacheable() {
                        self.posts.insert(key, post.clone());
                    }
                    return Some(post);
                }
                Ok(None) => debug!(source = source.name(), slug, "post not found, trying next source"),
                Err(err) => {
                    warn!(source = source.name(), slug, error = %err, "post lookup failed, trying next source");
                }
            }
        }

        self.store.find(slug).cloned()
    }

    pub async fn fetch_categories(&self) -> Vec<String> {
        if let Some(categories) = self.categories.get(CATEGORIES_CACHE_KEY) {
            debug!(key = CATEGORIES_CACHE_KEY, "cache hit");
            return categories;
        }

        for source in &self.sources {
            match source.fetch_categories().await {
                Ok(categories) => {
                    if source.cacheable() {
                        self.categories
                            .insert(CATEGORIES_CACHE_KEY, categories.clone());
                    }
                    return categories;
                }
                Err(err @ SourceError::Unsupported(_)) => debug!("{err}"),
                Err(err) => {
                    warn!(source = source.name(), error = %err, "category listing failed, trying next source");
                }
            }
        }

        self.store.categories()
    }

    /// Bundled posts overlaid with `posts`, newest first.
    pub fn merge_with_static(&self, posts: Vec<Post>) -> Vec<Post> {
        merge::merge_with_static(&self.store, posts)
    }

    /// Byline for a post's author.
    pub fn author(&self, name: Option<&str>) -> Author {
        self.store.author(name)
    }

    /// One page of the blog listing with search, filter and sort applied.
    ///
    /// The first page is merged with the bundled posts when
    /// `merge_with_static` is set; the total then counts at least every
    /// bundled post.
    pub async fn feed(&self, page: u32, options: &FeedOptions) -> PostPage {
        let query = PostQuery {
            page,
            limit: options.limit,
            category: options.category.clone(),
        };
        let result = self.fetch_posts(&query).await;

        let posts = if options.merge_with_static && page == 1 {
            self.merge_with_static(result.posts)
        } else {
            result.posts
        };

        let total = if options.merge_with_static {
            result.total.max(self.store.len())
        } else {
            result.total
        };

        PostPage {
            posts: feed::apply(posts, options),
            total,
            has_more: result.has_more,
        }
    }

    /// A post and up to three posts sharing a tag with it.
    pub async fn post_with_related(&self, slug: &str) -> Option<PostWithRelated> {
        let post = self.fetch_post_by_slug(slug).await?;
        let pool = self.fetch_posts(&PostQuery::page(1, RELATED_POOL)).await;
        let pool = self.merge_with_static(pool.posts);
        let related = feed::related_posts(&post, &pool, RELATED_LIMIT);
        Some(PostWithRelated { post, related })
    }

    /// The featured post, or the newest post if none is flagged.
    pub async fn featured(&self) -> Option<Post> {
        let latest = self.fetch_posts(&PostQuery::page(1, 1)).await;
        let merged = self.merge_with_static(latest.posts);
        feed::featured_post(&merged).cloned()
    }

    /// How many posts use each tag, most used first.
    pub async fn tag_counts(&self) -> Vec<TagCount> {
        let page = self.fetch_posts(&PostQuery::page(1, TAG_POOL)).await;
        feed::tag_counts(&self.merge_with_static(page.posts))
    }
}
