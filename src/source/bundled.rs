//! Bundled posts as a source. Never fails.

use super::{PostQuery, PostSource, SourceError, select};
use crate::bundled::StaticStore;
use crate::types::{Post, PostPage};
use async_trait::async_trait;
use std::sync::Arc;

pub struct StaticSource {
    store: Arc<StaticStore>,
}

impl StaticSource {
    pub fn new(store: Arc<StaticStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PostSource for StaticSource {
    fn name(&self) -> &'static str {
        "static"
    }

    fn cacheable(&self) -> bool {
        false
    }

    async fn fetch_posts(&self, query: &PostQuery) -> Result<PostPage, SourceError> {
        Ok(select(self.store.posts().to_vec(), query))
    }

    async fn fetch_post(&self, slug: &str) -> Result<Option<Post>, SourceError> {
        Ok(self.store.find(slug).cloned())
    }

    async fn fetch_categories(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.store.categories())
    }
}
