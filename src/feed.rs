//! Listing helpers layered over the client: search, category filter, sort
//! order, related posts, featured post and tag counts.
//!
//! Everything here is a pure function over `&[Post]`; the client methods
//! that fetch and then call these live in [`client`](crate::client).

use crate::types::{Post, sort_newest_first};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// How many related posts a post page shows.
pub const RELATED_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Newest first.
    #[default]
    Date,
    /// Alphabetical, case-insensitive.
    Title,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "date" => Ok(Self::Date),
            "title" => Ok(Self::Title),
            other => Err(format!("unknown sort order '{other}' (expected date or title)")),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date => write!(f, "date"),
            Self::Title => write!(f, "title"),
        }
    }
}

/// Options of a feed listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedOptions {
    pub limit: u32,
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: SortOrder,
    /// Overlay client posts onto the bundled ones on the first page.
    pub merge_with_static: bool,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            limit: crate::source::DEFAULT_LIMIT,
            category: None,
            search: None,
            sort: SortOrder::Date,
            merge_with_static: true,
        }
    }
}

fn matches_search(post: &Post, term: &str) -> bool {
    post.title.to_lowercase().contains(term)
        || post.excerpt.to_lowercase().contains(term)
        || post.tags.iter().any(|t| t.to_lowercase().contains(term))
}

fn by_title(a: &Post, b: &Post) -> Ordering {
    a.title
        .to_lowercase()
        .cmp(&b.title.to_lowercase())
        .then_with(|| a.title.cmp(&b.title))
}

/// Apply search, category filter and sort order to a list of posts.
///
/// Search is a case-insensitive substring match on title, excerpt or any
/// tag. The category filter is a case-insensitive exact tag match. Empty
/// search terms and categories are ignored.
pub fn apply(mut posts: Vec<Post>, options: &FeedOptions) -> Vec<Post> {
    if let Some(term) = options.search.as_deref().filter(|t| !t.is_empty()) {
        let term = term.to_lowercase();
        posts.retain(|p| matches_search(p, &term));
    }
    if let Some(category) = options.category.as_deref().filter(|c| !c.is_empty()) {
        posts.retain(|p| p.has_tag(category));
    }
    match options.sort {
        SortOrder::Date => sort_newest_first(&mut posts),
        SortOrder::Title => posts.sort_by(by_title),
    }
    posts
}

/// Up to `limit` posts other than `post` sharing at least one of its tags,
/// in pool order.
pub fn related_posts(post: &Post, pool: &[Post], limit: usize) -> Vec<Post> {
    pool.iter()
        .filter(|p| p.slug != post.slug)
        .filter(|p| p.tags.iter().any(|t| post.tags.contains(t)))
        .take(limit)
        .cloned()
        .collect()
}

/// The first post flagged featured, else the first post.
pub fn featured_post(posts: &[Post]) -> Option<&Post> {
    posts.iter().find(|p| p.is_featured()).or_else(|| posts.first())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Posts per tag, most used first. Ties keep first-seen order.
pub fn tag_counts(posts: &[Post]) -> Vec<TagCount> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for tag in posts.iter().flat_map(|p| &p.tags) {
        *counts.entry(tag.as_str()).or_default() += 1;
    }
    let mut out: Vec<TagCount> = counts
        .into_iter()
        .map(|(tag, count)| TagCount {
            tag: tag.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}
