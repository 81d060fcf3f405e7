//! The build-time snapshot as a source.

use super::{PostQuery, PostSource, SourceError, select};
use crate::cms::RawPost;
use crate::media::MediaResolver;
use crate::snapshot::{Snapshot, SnapshotLocation};
use crate::transform::to_post;
use crate::types::{Post, PostPage, Provenance};
use async_trait::async_trait;

/// Reads the snapshot on every request; the client cache keeps repeat
/// requests off the disk.
pub struct SnapshotSource {
    location: SnapshotLocation,
    http: reqwest::Client,
    media: MediaResolver,
}

impl SnapshotSource {
    pub fn new(location: SnapshotLocation, http: reqwest::Client, media: MediaResolver) -> Self {
        Self {
            location,
            http,
            media,
        }
    }

    /// Every snapshot post, transformed and tagged `cache`.
    async fn load_posts(&self) -> Result<Vec<Post>, SourceError> {
        let snapshot: Snapshot<RawPost> = self.location.load(&self.http).await?;
        if snapshot.is_empty() {
            return Err(SourceError::EmptySnapshot);
        }
        Ok(snapshot
            .posts
            .iter()
            .map(|raw| to_post(raw, &self.media).with_provenance(Provenance::Cache))
            .collect())
    }
}

#[async_trait]
impl PostSource for SnapshotSource {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    async fn fetch_posts(&self, query: &PostQuery) -> Result<PostPage, SourceError> {
        Ok(select(self.load_posts().await?, query))
    }

    async fn fetch_post(&self, slug: &str) -> Result<Option<Post>, SourceError> {
        Ok(self
            .load_posts()
            .await?
            .into_iter()
            .find(|p| p.slug == slug))
    }
}
