//! Posts bundled into the binary.
//!
//! The last fallback tier. `static/content.json` is embedded at compile time,
//! so this tier is always available: whatever happens to the CMS and the
//! snapshot file, the site has something to show.
//!
//! Bundled post bodies are markdown; they are rendered to HTML with
//! pulldown-cmark when the store is built.

use crate::types::{Author, Post, Provenance};
use pulldown_cmark::{Options, Parser, html as md_html};
use serde::Deserialize;
use std::collections::HashMap;

const CONTENT_JSON: &str = include_str!("../static/content.json");

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BundledContent {
    author: Author,
    #[serde(default)]
    avatars: HashMap<String, String>,
    default_avatar: String,
    posts: Vec<BundledPost>,
}

/// A post as written in `content.json`: like [`Post`] without the
/// CMS-only fields, with a markdown body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BundledPost {
    slug: String,
    title: String,
    excerpt: String,
    content: String,
    cover_image: String,
    #[serde(default)]
    cover_image_alt: Option<String>,
    date: String,
    read_time: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    featured: Option<bool>,
    #[serde(default)]
    sections: Vec<crate::richtext::Section>,
}

impl From<BundledPost> for Post {
    fn from(p: BundledPost) -> Self {
        let html = markdown_to_html(&p.content);
        Post {
            slug: p.slug,
            title: p.title,
            excerpt: p.excerpt,
            content: p.content,
            html_content: Some(html),
            cover_image: p.cover_image,
            cover_image_alt: p.cover_image_alt,
            date: p.date,
            read_time: p.read_time,
            tags: p.tags,
            featured: p.featured,
            sections: p.sections,
            cms_id: None,
            provenance: Provenance::Static,
        }
    }
}

pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH);
    let mut html = String::new();
    md_html::push_html(&mut html, parser);
    html
}

/// The bundled dataset: posts, the site author and known avatars.
#[derive(Debug, Clone)]
pub struct StaticStore {
    posts: Vec<Post>,
    author: Author,
    avatars: HashMap<String, String>,
    default_avatar: String,
}

impl StaticStore {
    /// The dataset compiled into the binary.
    pub fn bundled() -> Self {
        let content: BundledContent =
            serde_json::from_str(CONTENT_JSON).expect("bundled content.json must parse");
        Self {
            posts: content.posts.into_iter().map(Post::from).collect(),
            author: content.author,
            avatars: content.avatars,
            default_avatar: content.default_avatar,
        }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn find(&self, slug: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.slug == slug)
    }

    /// Unique tags across all posts, in order of first appearance.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for tag in self.posts.iter().flat_map(|p| &p.tags) {
            if !seen.contains(tag) {
                seen.push(tag.clone());
            }
        }
        seen
    }

    /// Author card for a post byline. The CMS has no avatars, so the image
    /// comes from the known-avatars table, falling back to the default.
    pub fn author(&self, name: Option<&str>) -> Author {
        let name = name.filter(|n| !n.is_empty());
        let image = name
            .and_then(|n| self.avatars.get(n))
            .unwrap_or(&self.default_avatar)
            .clone();
        Author {
            name: name.map_or_else(|| self.author.name.clone(), str::to_string),
            role: self.author.role.clone(),
            image,
            bio: self.author.bio.clone(),
            social: self.author.social.clone(),
        }
    }
}
