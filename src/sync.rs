//! Build-time snapshot sync.
//!
//! Pages through the whole published posts collection and writes it to the
//! snapshot file the runtime falls back to. Documents are stored as the CMS
//! returned them.
//!
//! A sync never leaves the site without a snapshot:
//!
//! - a page that fails stops paging; the posts collected so far are written,
//! - if nothing at all could be fetched, an existing snapshot is left alone,
//! - and if there is none, an empty one is written so the runtime falls
//!   straight through to the bundled posts.

use crate::snapshot::{Snapshot, SnapshotError};
use crate::source::RemoteSource;
use crate::source::remote::SYNC_PAGE_LIMIT;
use chrono::{SecondsFormat, Utc};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What a sync did to the snapshot file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Fresh posts were written.
    Written,
    /// Nothing fetched; the existing snapshot was kept.
    KeptExisting,
    /// Nothing fetched and no snapshot existed; an empty one was written.
    WroteEmpty,
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Written => write!(f, "written"),
            Self::KeptExisting => write!(f, "kept existing snapshot"),
            Self::WroteEmpty => write!(f, "wrote empty snapshot"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub path: PathBuf,
    pub posts: usize,
    /// Pages fetched successfully.
    pub pages: u32,
    /// Error that stopped paging early, if any.
    pub error: Option<String>,
    pub last_updated: Option<String>,
    pub outcome: SyncOutcome,
}

/// Fetch every page until the CMS reports no next page, or a page fails.
async fn collect_posts(
    remote: &RemoteSource,
) -> (Vec<serde_json::Value>, u32, Option<String>) {
    let mut posts = Vec::new();
    let mut page = 1;
    loop {
        match remote.fetch_raw_page(page, SYNC_PAGE_LIMIT).await {
            Ok(envelope) => {
                info!(page, found = envelope.docs.len(), "fetched page");
                posts.extend(envelope.docs);
                if !envelope.has_next_page {
                    return (posts, page, None);
                }
                page += 1;
            }
            Err(err) => {
                warn!(page, error = %err, "page failed, stopping");
                return (posts, page - 1, Some(err.to_string()));
            }
        }
    }
}

pub async fn sync_snapshot(remote: &RemoteSource, path: &Path) -> Result<SyncReport, SnapshotError> {
    info!(api = remote.api_url(), path = %path.display(), "syncing snapshot");
    let (posts, pages, error) = collect_posts(remote).await;

    let report = |posts: usize, last_updated: Option<String>, outcome| SyncReport {
        path: path.to_path_buf(),
        posts,
        pages,
        error: error.clone(),
        last_updated,
        outcome,
    };

    // A failed first page is a failed sync; an empty collection is not.
    if pages == 0 {
        if tokio::fs::try_exists(path).await? {
            warn!("nothing fetched, keeping existing snapshot");
            return Ok(report(0, None, SyncOutcome::KeptExisting));
        }
        Snapshot::<serde_json::Value>::empty().save(path).await?;
        warn!("nothing fetched, wrote empty snapshot");
        return Ok(report(0, None, SyncOutcome::WroteEmpty));
    }

    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let count = posts.len();
    Snapshot::new(posts, Some(now.clone())).save(path).await?;
    info!(posts = count, "snapshot written");
    Ok(report(count, Some(now), SyncOutcome::Written))
}
