//! Canonical types shared by every tier of the content pipeline.
//!
//! Whatever a post came from (live CMS, snapshot file, bundled data), callers
//! only ever see [`Post`]. Field names serialize in camelCase so the JSON
//! matches what the site's front end already consumes.

use crate::richtext::Section;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a post was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Live CMS response.
    Cms,
    /// Bundled with the binary.
    Static,
    /// Build-time snapshot of the CMS.
    Cache,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cms => write!(f, "cms"),
            Self::Static => write!(f, "static"),
            Self::Cache => write!(f, "cache"),
        }
    }
}

/// A blog post in the shape every caller consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Identity key for merging and lookups.
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    /// Plain-text body (markdown for bundled posts).
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_content: Option<String>,
    /// Always absolute, or the default placeholder.
    pub cover_image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_alt: Option<String>,
    /// ISO date or datetime string.
    pub date: String,
    pub read_time: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cms_id: Option<u64>,
    #[serde(rename = "source")]
    pub provenance: Provenance,
}

impl Post {
    /// Parsed publish date. Accepts RFC 3339 (`2025-01-15T09:30:00.000Z`) or a
    /// plain `YYYY-MM-DD` date, taken as midnight UTC.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        parse_date(&self.date)
    }

    pub fn is_featured(&self) -> bool {
        self.featured.unwrap_or(false)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }
}

pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Sort newest first. Stable, so posts with equal dates keep their order;
/// unparseable dates sink to the end.
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.published_at().cmp(&a.published_at()));
}

/// One page of posts from a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub total: usize,
    pub has_more: bool,
}

impl PostPage {
    /// A complete, unpaginated result.
    pub fn complete(posts: Vec<Post>) -> Self {
        Self {
            total: posts.len(),
            posts,
            has_more: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub role: String,
    pub image: String,
    pub bio: String,
    #[serde(default)]
    pub social: SocialLinks,
}
