//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every post is shown by its semantic identity, position and title, with
//! slug, date, provenance and tags as indented context lines. The provenance
//! line makes it obvious which fallback tier answered.
//!
//! # Output Format
//!
//! ## Posts
//!
//! ```text
//! 001 Why Agentic AI Is the New Performance Engine
//!     Slug: why-agentic-ai-performance-engine
//!     Date: 2025-01-15 · 6 min read · static · featured
//!     Tags: AI, Agentic AI
//! 002 Shipping Models to Production
//!     Slug: shipping-models
//!     Date: 2025-03-02T09:00:00.000Z · 1 min read · cms
//!
//! Showing 2 of 7 posts (more available)
//! ```
//!
//! ## Post
//!
//! ```text
//! Shipping Models to Production
//!     Slug: shipping-models
//!     Date: 2025-03-02T09:00:00.000Z · 1 min read · cms
//!     Author: Site Author
//!     Cover: https://cms.example.com/media/hero.jpg
//!     Sections:
//!         the-deployment-gap  The Deployment Gap
//!     Related:
//!         edge-inference  Edge Inference on a Budget
//!
//! Most models never leave the notebook...
//! ```
//!
//! ## Sync
//!
//! ```text
//! Synced 3 posts (2 pages) → public/data/cmsPosts.json
//!     Last updated: 2025-03-02T09:00:00.000Z
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::client::PostWithRelated;
use crate::feed::TagCount;
use crate::sync::{SyncOutcome, SyncReport};
use crate::types::{Author, Post, PostPage};

/// Excerpt characters shown under a post.
const EXCERPT_WIDTH: usize = 160;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head.trim_end())
    }
}

/// `Date: ... · read time · provenance[ · featured]`
fn meta_line(post: &Post) -> String {
    let mut line = format!(
        "{}Date: {} · {} · {}",
        indent(1),
        post.date,
        post.read_time,
        post.provenance
    );
    if post.is_featured() {
        line.push_str(" · featured");
    }
    line
}

fn post_context(post: &Post) -> Vec<String> {
    let mut lines = vec![
        format!("{}Slug: {}", indent(1), post.slug),
        meta_line(post),
    ];
    if !post.tags.is_empty() {
        lines.push(format!("{}Tags: {}", indent(1), post.tags.join(", ")));
    }
    lines
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Posts
// ============================================================================

pub fn format_posts_output(page: &PostPage) -> Vec<String> {
    if page.posts.is_empty() {
        return vec!["No posts".to_string()];
    }

    let mut lines = Vec::new();
    for (i, post) in page.posts.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), post.title));
        lines.extend(post_context(post));
    }

    lines.push(String::new());
    let more = if page.has_more {
        " (more available)"
    } else {
        ""
    };
    lines.push(format!(
        "Showing {} of {}{more}",
        page.posts.len(),
        plural(page.total, "post")
    ));
    lines
}

pub fn print_posts_output(page: &PostPage) {
    for line in format_posts_output(page) {
        println!("{}", line);
    }
}

// ============================================================================
// Single post
// ============================================================================

pub fn format_post_output(found: &PostWithRelated, author: &Author) -> Vec<String> {
    let post = &found.post;
    let mut lines = vec![post.title.clone()];
    lines.extend(post_context(post));
    lines.push(format!("{}Author: {}", indent(1), author.name));
    lines.push(format!("{}Cover: {}", indent(1), post.cover_image));

    if !post.sections.is_empty() {
        lines.push(format!("{}Sections:", indent(1)));
        for section in &post.sections {
            lines.push(format!("{}{}  {}", indent(2), section.id, section.title));
        }
    }

    if !found.related.is_empty() {
        lines.push(format!("{}Related:", indent(1)));
        for related in &found.related {
            lines.push(format!("{}{}  {}", indent(2), related.slug, related.title));
        }
    }

    if !post.excerpt.is_empty() {
        lines.push(String::new());
        lines.push(truncate(&post.excerpt, EXCERPT_WIDTH));
    }
    lines
}

pub fn print_post_output(found: &PostWithRelated, author: &Author) {
    for line in format_post_output(found, author) {
        println!("{}", line);
    }
}

// ============================================================================
// Categories and tags
// ============================================================================

pub fn format_categories(categories: &[String]) -> Vec<String> {
    if categories.is_empty() {
        return vec!["No categories".to_string()];
    }
    categories
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} {}", format_index(i + 1), c))
        .collect()
}

pub fn print_categories(categories: &[String]) {
    for line in format_categories(categories) {
        println!("{}", line);
    }
}

/// Tags with counts, counts right-aligned in one column.
pub fn format_tag_counts(tags: &[TagCount]) -> Vec<String> {
    if tags.is_empty() {
        return vec!["No tags".to_string()];
    }
    let width = tags.iter().map(|t| t.count.to_string().len()).max().unwrap_or(1);
    tags.iter()
        .map(|t| format!("{:>width$} {}", t.count, t.tag))
        .collect()
}

pub fn print_tag_counts(tags: &[TagCount]) {
    for line in format_tag_counts(tags) {
        println!("{}", line);
    }
}

// ============================================================================
// Sync
// ============================================================================

pub fn format_sync_report(report: &SyncReport) -> Vec<String> {
    let path = report.path.display();
    let mut lines = match report.outcome {
        SyncOutcome::Written => vec![format!(
            "Synced {} ({}) → {}",
            plural(report.posts, "post"),
            plural(report.pages as usize, "page"),
            path
        )],
        SyncOutcome::KeptExisting => vec![format!("Nothing fetched, kept {}", path)],
        SyncOutcome::WroteEmpty => vec![format!("Nothing fetched, wrote empty {}", path)],
    };
    if let Some(updated) = &report.last_updated {
        lines.push(format!("{}Last updated: {}", indent(1), updated));
    }
    if let Some(error) = &report.error {
        lines.push(format!("{}Stopped early: {}", indent(1), error));
    }
    lines
}

pub fn print_sync_report(report: &SyncReport) {
    for line in format_sync_report(report) {
        println!("{}", line);
    }
}
