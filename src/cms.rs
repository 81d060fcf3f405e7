//! Wire types for the Payload CMS REST API.
//!
//! These mirror the `posts` and `categories` collections as the API returns
//! them. Parsing is lenient where Payload is inconsistent: relationship fields
//! come back as ids instead of objects when the request depth is too shallow,
//! so a field that fails to decode is dropped to its default rather than
//! failing the whole post.

use crate::richtext::Document;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMedia {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawCategory {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawMeta {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A post record from the CMS.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPost {
    pub id: u64,
    pub title: String,
    pub slug: String,
    #[serde(default, deserialize_with = "lenient")]
    pub content: Option<Document>,
    #[serde(default, deserialize_with = "lenient")]
    pub hero_image: Option<RawMedia>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub categories: Vec<RawCategory>,
    #[serde(default, deserialize_with = "lenient")]
    pub meta: Option<RawMeta>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, rename = "_status", deserialize_with = "lenient")]
    pub status: Option<PostStatus>,
    #[serde(default)]
    pub external_source: Option<String>,
}

/// Pagination envelope returned by collection queries. A doc that does not
/// decode is skipped with a warning; the rest of the page is kept.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "P: DeserializeOwned"))]
pub struct PostsEnvelope<P = RawPost> {
    #[serde(deserialize_with = "lenient_docs")]
    pub docs: Vec<P>,
    #[serde(default)]
    pub total_docs: usize,
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub page: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoriesEnvelope {
    #[serde(deserialize_with = "lenient_list")]
    pub docs: Vec<RawCategory>,
}

/// Decode a field, falling back to its default when it has the wrong shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Like [`lenient_list`] for the `docs` of a posts page, but a non-array is
/// still an error and every skipped doc is logged.
fn lenient_docs<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let serde_json::Value::Array(items) = serde_json::Value::deserialize(deserializer)? else {
        return Err(D::Error::custom("docs is not an array"));
    };
    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!(index, error = %e, "skipping undecodable CMS doc");
                None
            }
        })
        .collect())
}

/// Decode a list element by element, keeping the elements that decode.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}
