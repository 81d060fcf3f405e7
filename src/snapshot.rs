//! Build-time snapshot of the CMS posts collection.
//!
//! The snapshot is the middle fallback tier: a JSON file written by
//! [`sync`](crate::sync) at build time and read at runtime when the live CMS
//! cannot be reached.
//!
//! ```json
//! {
//!   "posts": [ ...raw CMS post documents... ],
//!   "lastUpdated": "2025-03-01T12:00:00Z",
//!   "source": "cms",
//!   "version": 1
//! }
//! ```
//!
//! Posts are stored exactly as the CMS returned them, so the runtime runs
//! the same transform on snapshot posts as on live ones. [`Snapshot`] is
//! generic over the post type: the runtime reads `Snapshot<RawPost>`, the
//! sync writes `Snapshot<serde_json::Value>` without interpreting documents.
//!
//! The runtime never writes this file.

use crate::cms::RawPost;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Version of the snapshot format. Files with any other version are rejected.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Where the site serves the snapshot from, relative to the project root.
pub const DEFAULT_SNAPSHOT_PATH: &str = "public/data/cmsPosts.json";

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("snapshot request returned status {0}")]
    Status(u16),
    #[error("snapshot version {found} is not supported (expected {})", SNAPSHOT_VERSION)]
    Version { found: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<P = RawPost> {
    pub posts: Vec<P>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default = "default_source")]
    pub source: String,
    pub version: u32,
}

fn default_source() -> String {
    "cms".to_string()
}

impl<P> Snapshot<P> {
    pub fn new(posts: Vec<P>, last_updated: Option<String>) -> Self {
        Self {
            posts,
            last_updated,
            source: default_source(),
            version: SNAPSHOT_VERSION,
        }
    }

    /// Written when a sync finds nothing and no snapshot exists yet.
    pub fn empty() -> Self {
        Self::new(Vec::new(), None)
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

impl<P: DeserializeOwned> Snapshot<P> {
    /// Parse and version-check snapshot JSON.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::Version {
                found: snapshot.version,
            });
        }
        Ok(snapshot)
    }
}

impl<P: Serialize> Snapshot<P> {
    /// Write pretty-printed JSON, creating parent directories.
    pub async fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

/// A snapshot file on disk or a URL it is served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotLocation {
    File(PathBuf),
    Url(String),
}

impl SnapshotLocation {
    /// `http://` and `https://` values are URLs, everything else is a path.
    pub fn parse(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            Self::Url(value.to_string())
        } else {
            Self::File(PathBuf::from(value))
        }
    }

    pub async fn load<P: DeserializeOwned>(
        &self,
        http: &reqwest::Client,
    ) -> Result<Snapshot<P>, SnapshotError> {
        let json = match self {
            Self::File(path) => tokio::fs::read_to_string(path).await?,
            Self::Url(url) => {
                let response = http.get(url).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(SnapshotError::Status(status.as_u16()));
                }
                response.text().await?
            }
        };
        Snapshot::from_json(&json)
    }
}

impl fmt::Display for SnapshotLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}
