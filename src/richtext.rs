//! Lexical rich-text decoding.
//!
//! The CMS stores post bodies as a Lexical editor tree: a root holding block
//! nodes (paragraphs, headings, lists, quotes) whose children are inline nodes
//! (text runs, links, line breaks) or media (uploads, images). This module
//! turns that tree into the four things the site needs:
//!
//! | Function | Output |
//! |---|---|
//! | [`to_html`] | HTML body for the article page |
//! | [`to_text`] | Plain text, used for excerpts and word counts |
//! | [`extract_sections`] | Table of contents from `h2`/`h3` headings |
//! | [`estimate_read_time`] | `"N min read"` label at 200 words per minute |
//!
//! ## Tolerant decoding
//!
//! [`Node`] is a closed enum, but the wire format is not. Deserialization goes
//! through a JSON value first and any node that fails to decode (unknown
//! `type`, missing required field, wrong field type) becomes [`Node::Unknown`],
//! which renders as nothing. A single bad node never takes the whole document
//! down with it.
//!
//! ## Text formatting
//!
//! Text nodes carry a format bitmask. Text is HTML-escaped once, then wrapped
//! in tags in a fixed order, each wrapping the previous:
//!
//! ```text
//! bit 0 (1)  → <strong>
//! bit 1 (2)  → <em>
//! bit 2 (4)  → <del>
//! bit 3 (8)  → <u>
//! bit 4 (16) → <code>
//! ```
//!
//! So `format = 3` on `"hi"` renders `<em><strong>hi</strong></em>`.

use crate::media::MediaResolver;
use maud::{Markup, PreEscaped, html};
use serde::{Deserialize, Deserializer};

pub const FORMAT_BOLD: u32 = 1;
pub const FORMAT_ITALIC: u32 = 1 << 1;
pub const FORMAT_STRIKETHROUGH: u32 = 1 << 2;
pub const FORMAT_UNDERLINE: u32 = 1 << 3;
pub const FORMAT_CODE: u32 = 1 << 4;

/// Wrapping order for the format bitmask. Earlier entries end up innermost.
const FORMAT_TAGS: [(u32, &str); 5] = [
    (FORMAT_BOLD, "strong"),
    (FORMAT_ITALIC, "em"),
    (FORMAT_STRIKETHROUGH, "del"),
    (FORMAT_UNDERLINE, "u"),
    (FORMAT_CODE, "code"),
];

const WORDS_PER_MINUTE: usize = 200;

/// A complete rich-text body: `{ "root": { "children": [...] } }`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub root: Root,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Root {
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Self {
            root: Root { children },
        }
    }

    pub fn blocks(&self) -> &[Node] {
        &self.root.children
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingTag {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    #[default]
    Bullet,
    Number,
    Check,
}

/// One node of the rich-text tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text {
        text: String,
        format: u32,
    },
    LineBreak,
    Paragraph {
        children: Vec<Node>,
    },
    Heading {
        tag: HeadingTag,
        children: Vec<Node>,
    },
    Quote {
        children: Vec<Node>,
    },
    List {
        list_type: ListType,
        children: Vec<Node>,
    },
    ListItem {
        children: Vec<Node>,
    },
    Link {
        url: String,
        new_tab: bool,
        children: Vec<Node>,
    },
    /// Reference to a CMS media document.
    Upload {
        id: Option<String>,
        url: Option<String>,
        alt: Option<String>,
    },
    /// Inline image with its own source.
    Image {
        src: String,
        alt: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
    },
    Unknown,
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text {
            text: text.into(),
            format: 0,
        }
    }

    pub fn formatted(text: impl Into<String>, format: u32) -> Self {
        Node::Text {
            text: text.into(),
            format,
        }
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Node::Paragraph { children }
    }

    pub fn heading(tag: HeadingTag, children: Vec<Node>) -> Self {
        Node::Heading { tag, children }
    }
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WireNode {
    Text {
        #[serde(default)]
        text: String,
        #[serde(default, deserialize_with = "bitmask")]
        format: u32,
    },
    LineBreak,
    Paragraph {
        #[serde(default)]
        children: Vec<Node>,
    },
    Heading {
        tag: HeadingTag,
        #[serde(default)]
        children: Vec<Node>,
    },
    Quote {
        #[serde(default)]
        children: Vec<Node>,
    },
    List {
        #[serde(default, rename = "listType")]
        list_type: ListType,
        #[serde(default)]
        children: Vec<Node>,
    },
    ListItem {
        #[serde(default)]
        children: Vec<Node>,
    },
    Link {
        #[serde(default)]
        fields: LinkFields,
        #[serde(default)]
        children: Vec<Node>,
    },
    Upload {
        #[serde(default)]
        value: Option<UploadValue>,
    },
    Image {
        #[serde(default)]
        src: String,
        #[serde(default, rename = "altText")]
        alt_text: Option<String>,
        #[serde(default)]
        width: Option<u32>,
        #[serde(default)]
        height: Option<u32>,
    },
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkFields {
    #[serde(default)]
    url: String,
    #[serde(default)]
    new_tab: bool,
}

#[derive(Deserialize)]
struct UploadValue {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    alt: Option<String>,
}

/// Lexical emits the format bitmask as a number on text nodes; anything else
/// (older exports use strings) counts as unformatted.
fn bitmask<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0))
}

impl From<WireNode> for Node {
    fn from(wire: WireNode) -> Self {
        match wire {
            WireNode::Text { text, format } => Node::Text { text, format },
            WireNode::LineBreak => Node::LineBreak,
            WireNode::Paragraph { children } => Node::Paragraph { children },
            WireNode::Heading { tag, children } => Node::Heading { tag, children },
            WireNode::Quote { children } => Node::Quote { children },
            WireNode::List {
                list_type,
                children,
            } => Node::List {
                list_type,
                children,
            },
            WireNode::ListItem { children } => Node::ListItem { children },
            WireNode::Link { fields, children } => Node::Link {
                url: fields.url,
                new_tab: fields.new_tab,
                children,
            },
            WireNode::Upload { value } => match value {
                Some(v) => Node::Upload {
                    id: v.id.map(|id| match id {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    }),
                    url: v.url,
                    alt: v.alt,
                },
                None => Node::Upload {
                    id: None,
                    url: None,
                    alt: None,
                },
            },
            WireNode::Image {
                src,
                alt_text,
                width,
                height,
            } => Node::Image {
                src,
                alt: alt_text,
                width,
                height,
            },
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(serde_json::from_value::<WireNode>(value)
            .map(Node::from)
            .unwrap_or(Node::Unknown))
    }
}

// ============================================================================
// HTML
// ============================================================================

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

fn format_text(text: &str, format: u32) -> String {
    let mut out = escape_html(text);
    for (bit, tag) in FORMAT_TAGS {
        if format & bit != 0 {
            out = format!("<{tag}>{out}</{tag}>");
        }
    }
    out
}

fn render_children(children: &[Node], media: &MediaResolver) -> String {
    children
        .iter()
        .map(|child| render_node(child, media).into_string())
        .collect()
}

fn render_node(node: &Node, media: &MediaResolver) -> Markup {
    match node {
        Node::Text { text, format } => PreEscaped(format_text(text, *format)),
        Node::LineBreak => html! { br; },
        Node::Paragraph { children } => {
            let inner = render_children(children, media);
            if inner.is_empty() {
                return PreEscaped(String::new());
            }
            html! { p { (PreEscaped(inner)) } }
        }
        Node::Heading { tag, children } => {
            let inner = PreEscaped(render_children(children, media));
            match tag {
                HeadingTag::H1 => html! { h1 { (inner) } },
                HeadingTag::H2 => html! { h2 { (inner) } },
                HeadingTag::H3 => html! { h3 { (inner) } },
                HeadingTag::H4 => html! { h4 { (inner) } },
                HeadingTag::H5 => html! { h5 { (inner) } },
                HeadingTag::H6 => html! { h6 { (inner) } },
            }
        }
        Node::Quote { children } => {
            html! { blockquote { (PreEscaped(render_children(children, media))) } }
        }
        Node::List {
            list_type,
            children,
        } => {
            let items = PreEscaped(render_children(children, media));
            match list_type {
                ListType::Number => html! { ol { (items) } },
                ListType::Bullet | ListType::Check => html! { ul { (items) } },
            }
        }
        Node::ListItem { children } => {
            html! { li { (PreEscaped(render_children(children, media))) } }
        }
        Node::Link {
            url,
            new_tab,
            children,
        } => {
            let target = new_tab.then_some("_blank");
            let rel = new_tab.then_some("noopener noreferrer");
            html! {
                a href=(url) target=[target] rel=[rel] {
                    (PreEscaped(render_children(children, media)))
                }
            }
        }
        Node::Upload { url, alt, .. } => {
            let src = media.resolve(url.as_deref());
            let alt = alt.as_deref().unwrap_or("");
            html! {
                figure {
                    img src=(src) alt=(alt) loading="lazy";
                    figcaption { (alt) }
                }
            }
        }
        Node::Image {
            src,
            alt,
            width,
            height,
        } => {
            // inline images carry their own URL (often a data: URI)
            html! {
                img src=(src) alt=(alt.as_deref().unwrap_or("")) width=[*width] height=[*height] loading="lazy";
            }
        }
        Node::Unknown => PreEscaped(String::new()),
    }
}

/// Render a document as HTML. Top-level blocks are separated by newlines.
pub fn to_html(doc: &Document, media: &MediaResolver) -> String {
    doc.blocks()
        .iter()
        .map(|node| render_node(node, media).into_string())
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Plain text
// ============================================================================

fn node_text(node: &Node, out: &mut String) {
    match node {
        Node::Text { text, .. } => out.push_str(text),
        Node::LineBreak => out.push('\n'),
        Node::Paragraph { children } | Node::Heading { children, .. } | Node::Quote { children } => {
            children.iter().for_each(|c| node_text(c, out));
            out.push_str("\n\n");
        }
        Node::List { children, .. } | Node::Link { children, .. } => {
            children.iter().for_each(|c| node_text(c, out));
        }
        Node::ListItem { children } => {
            out.push_str("- ");
            children.iter().for_each(|c| node_text(c, out));
            out.push('\n');
        }
        Node::Upload { .. } | Node::Image { .. } | Node::Unknown => {}
    }
}

/// Flatten a document to plain text: blocks end in a blank line, list items
/// get a `- ` marker, formatting and media are dropped.
pub fn to_text(doc: &Document) -> String {
    let mut out = String::new();
    for node in doc.blocks() {
        node_text(node, &mut out);
    }
    out.trim().to_string()
}

// ============================================================================
// Sections and read time
// ============================================================================

/// A table-of-contents entry derived from a heading.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
}

/// Anchor id for a heading title: lowercase ASCII alphanumerics, every other
/// run of characters collapsed to a single `-`, no leading/trailing dashes.
pub fn anchor_id(title: &str) -> String {
    let mut id = String::with_capacity(title.len());
    for c in title.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            id.push(c);
        } else if !id.ends_with('-') {
            id.push('-');
        }
    }
    id.trim_matches('-').to_string()
}

/// Collect top-level `h2` and `h3` headings.
///
/// Two headings with the same text get the same id.
pub fn extract_sections(doc: &Document) -> Vec<Section> {
    doc.blocks()
        .iter()
        .filter_map(|node| match node {
            Node::Heading {
                tag: HeadingTag::H2 | HeadingTag::H3,
                children,
            } => {
                let title: String = children
                    .iter()
                    .filter_map(|c| match c {
                        Node::Text { text, .. } => Some(text.as_str()),
                        _ => None,
                    })
                    .collect();
                Some(Section {
                    id: anchor_id(&title),
                    title,
                })
            }
            _ => None,
        })
        .collect()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Format a read-time label for a word count: ceiling minutes, minimum one.
pub fn read_time_label(words: usize) -> String {
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    format!("{minutes} min read")
}

pub fn estimate_read_time(doc: &Document) -> String {
    read_time_label(word_count(&to_text(doc)))
}
