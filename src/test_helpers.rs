//! Shared test utilities for the folio-cms test suite.
//!
//! Provides post builders, CMS fixture loaders, and lookup helpers that work
//! with the canonical [`Post`] type.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let envelope = load_envelope("posts_page1.json");
//! let posts: Vec<Post> = envelope.docs.iter().map(|r| to_post(r, &media())).collect();
//!
//! let post = find_post(&posts, "shipping-models");
//! assert_eq!(post_slugs(&posts), ["shipping-models", "edge-inference"]);
//! ```

use std::path::Path;

use crate::cms::PostsEnvelope;
use crate::media::MediaResolver;
use crate::types::{Post, Provenance};

// =========================================================================
// Builders
// =========================================================================

/// A minimal post with the given slug, date and provenance.
pub fn post(slug: &str, date: &str, provenance: Provenance) -> Post {
    Post {
        slug: slug.to_string(),
        title: slug.replace('-', " "),
        excerpt: format!("About {slug}..."),
        content: String::new(),
        html_content: None,
        cover_image: crate::media::DEFAULT_COVER.to_string(),
        cover_image_alt: None,
        date: date.to_string(),
        read_time: "1 min read".to_string(),
        tags: Vec::new(),
        featured: None,
        sections: Vec::new(),
        cms_id: None,
        provenance,
    }
}

/// Like [`post`], with tags.
pub fn tagged(slug: &str, date: &str, tags: &[&str]) -> Post {
    Post {
        tags: tags.iter().map(|t| t.to_string()).collect(),
        ..post(slug, date, Provenance::Cms)
    }
}

/// Resolver against the origin the fixtures use.
pub fn media() -> MediaResolver {
    MediaResolver::new("https://cms.example.com")
}

// =========================================================================
// Fixture loading
// =========================================================================

/// Read `fixtures/cms/{name}` as a string.
pub fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures/cms")
        .join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("fixture {} unreadable: {e}", path.display()))
}

/// Parse a posts envelope fixture.
pub fn load_envelope(name: &str) -> PostsEnvelope {
    serde_json::from_str(&load_fixture(name))
        .unwrap_or_else(|e| panic!("fixture {name} is not a posts envelope: {e}"))
}

// =========================================================================
// Lookups (panic with a clear message on miss)
// =========================================================================

/// Find a post by slug. Panics if not found.
pub fn find_post<'a>(posts: &'a [Post], slug: &str) -> &'a Post {
    posts.iter().find(|p| p.slug == slug).unwrap_or_else(|| {
        let slugs = post_slugs(posts);
        panic!("post '{slug}' not found. Available: {slugs:?}")
    })
}

/// All slugs in order.
pub fn post_slugs(posts: &[Post]) -> Vec<&str> {
    posts.iter().map(|p| p.slug.as_str()).collect()
}
