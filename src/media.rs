//! Media URL resolution.
//!
//! The CMS returns media paths relative to its own origin (`/media/x.jpg`),
//! which break once the HTML is served from the portfolio domain. Every media
//! reference goes through [`MediaResolver::resolve`] before it reaches a post.

/// Placeholder used for posts without a hero image or media without a URL.
pub const DEFAULT_COVER: &str = "/images/default-cover.jpg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaResolver {
    base: String,
}

impl MediaResolver {
    /// `base` is the CMS origin, e.g. `https://cms.example.com`. A trailing
    /// slash is dropped.
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Absolute URL for a media path.
    ///
    /// - missing or empty → [`DEFAULT_COVER`]
    /// - already starts with `http` → unchanged
    /// - otherwise → `{base}/{path}` with exactly one separating slash
    pub fn resolve(&self, path: Option<&str>) -> String {
        match path {
            None | Some("") => DEFAULT_COVER.to_string(),
            Some(p) if p.starts_with("http") => p.to_string(),
            Some(p) if p.starts_with('/') => format!("{}{}", self.base, p),
            Some(p) => format!("{}/{}", self.base, p),
        }
    }
}
