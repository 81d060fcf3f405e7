//! Raw CMS post → canonical [`Post`].

use crate::cms::RawPost;
use crate::media::MediaResolver;
use crate::richtext::{self, Document};
use crate::types::{Post, Provenance};

/// Characters of body text used for a derived excerpt.
const EXCERPT_CHARS: usize = 200;

/// Excerpt from the meta description, or the first 200 characters of the
/// body text with newlines flattened, followed by `...`.
pub fn excerpt(meta_description: Option<&str>, text: &str) -> String {
    if let Some(desc) = meta_description.filter(|d| !d.is_empty()) {
        return desc.to_string();
    }
    let head: String = text.chars().take(EXCERPT_CHARS).collect();
    format!("{}...", head.replace('\n', " ").trim())
}

pub fn to_post(raw: &RawPost, media: &MediaResolver) -> Post {
    let empty = Document::default();
    let content = raw.content.as_ref().unwrap_or(&empty);

    let text = richtext::to_text(content);
    let meta_description = raw.meta.as_ref().and_then(|m| m.description.as_deref());
    let hero = raw.hero_image.as_ref();

    Post {
        slug: raw.slug.clone(),
        title: raw.title.clone(),
        excerpt: excerpt(meta_description, &text),
        html_content: Some(richtext::to_html(content, media)),
        cover_image: media.resolve(hero.and_then(|h| h.url.as_deref())),
        cover_image_alt: Some(
            hero.and_then(|h| h.alt.clone())
                .filter(|alt| !alt.is_empty())
                .unwrap_or_else(|| raw.title.clone()),
        ),
        date: raw
            .published_at
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| raw.created_at.clone()),
        read_time: richtext::read_time_label(richtext::word_count(&text)),
        tags: raw.categories.iter().map(|c| c.title.clone()).collect(),
        featured: Some(false),
        sections: richtext::extract_sections(content),
        cms_id: Some(raw.id),
        content: text,
        provenance: Provenance::Cms,
    }
}
