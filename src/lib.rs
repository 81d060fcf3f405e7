//! # Folio CMS
//!
//! Content resolution for a portfolio site's blog. Posts are written in a
//! headless CMS (Payload REST API, Lexical rich text) and resolved through a
//! chain of fallbacks, so the site always has posts to show even when the CMS
//! is down or was never configured.
//!
//! # Architecture: Three-Tier Fallback
//!
//! ```text
//! 1. CMS        live REST API           →  provenance "cms"     (cached)
//! 2. Snapshot   public/data/*.json      →  provenance "cache"   (cached)
//! 3. Static     bundled content.json    →  provenance "static"  (never fails)
//! ```
//!
//! Every tier produces the same canonical [`types::Post`]. Raw CMS documents go
//! through one transform ([`transform::to_post`]) whether they came from the
//! live API or the snapshot, so the two tiers can never drift apart.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`client`] | Entry point: cache lookup, ordered source chain, feed helpers |
//! | [`source`] | One `PostSource` per tier: remote CMS, snapshot, bundled |
//! | [`richtext`] | Lexical rich-text tree → HTML, plain text, sections, read time |
//! | [`media`] | Relative CMS media paths → absolute URLs |
//! | [`cms`] | Serde types for the CMS REST envelopes and post records |
//! | [`transform`] | Raw CMS post → canonical post |
//! | [`cache`] | TTL cache with an injectable clock, plus hit/miss stats |
//! | [`snapshot`] | Snapshot file format, load (runtime) and save (sync) |
//! | [`sync`] | Build-time sync: page through the CMS, write the snapshot |
//! | [`bundled`] | Posts, author and avatars compiled into the binary |
//! | [`merge`] | Slug-keyed merge of CMS and bundled posts, newest first |
//! | [`feed`] | Search, category filter, sort, related posts, tag counts |
//! | [`config`] | `config.toml` loading, validation, merging, env overrides |
//! | [`types`] | Canonical `Post`, `PostPage`, `Author`, `Provenance` |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Errors Stop at the Client
//!
//! Sources return `Result<_, SourceError>`; the client logs each failure with
//! `tracing` and asks the next tier. Callers get a `PostPage`, an
//! `Option<Post>` or a `Vec<String>`, never an error: a blog listing with
//! bundled posts beats an error page.
//!
//! ## Closed Rich-Text Enum
//!
//! Lexical nodes deserialize into one [`richtext::Node`] enum. A node of an
//! unknown type, or a known type with a malformed payload, becomes
//! `Node::Unknown` and renders as nothing. One bad node never costs the
//! whole post.
//!
//! ## Maud for Markup
//!
//! Rich text is rendered with [Maud](https://maud.lambda.xyz/). Attribute
//! values (link targets, image URLs, alt text) are escaped by the macro, and
//! text runs are escaped exactly once before formatting tags wrap them.
//!
//! ## Explicit Cache, Injected Clock
//!
//! The cache is a plain value owned by the client, not a global. Time comes
//! from a [`cache::Clock`], so expiry is tested by advancing a
//! [`cache::ManualClock`] rather than sleeping.

pub mod bundled;
pub mod cache;
pub mod client;
pub mod cms;
pub mod config;
pub mod feed;
pub mod media;
pub mod merge;
pub mod output;
pub mod richtext;
pub mod snapshot;
pub mod source;
pub mod sync;
pub mod transform;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
