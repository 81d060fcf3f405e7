//! Content configuration.
//!
//! Handles loading, validating, and merging `config.toml`, then applying
//! environment overrides. Resolution order, lowest to highest:
//!
//! 1. stock defaults ([`ContentConfig::default`])
//! 2. `config.toml` in the working directory (or the `--config` path)
//! 3. `FOLIO_*` environment variables
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [cms]
//! enabled = false                          # Try the live CMS at all
//! api_url = "http://localhost:3000/api"    # Payload REST API root
//! # media_base = "http://localhost:3000"   # Defaults to api_url minus "/api"
//! website_id = "portfolio"                 # externalSource tenant filter
//! timeout_secs = 10                        # Per-request timeout
//!
//! [snapshot]
//! location = "public/data/cmsPosts.json"   # File path or http(s) URL
//!
//! [cache]
//! posts_ttl_secs = 300
//! categories_ttl_secs = 3600
//! ```
//!
//! ## Environment
//!
//! | Variable | Overrides |
//! |---|---|
//! | `FOLIO_CMS_API_URL` | `cms.api_url` |
//! | `FOLIO_WEBSITE_ID` | `cms.website_id` |
//! | `FOLIO_USE_CMS` | `cms.enabled` (`true`/`1` enable, anything else disables) |
//! | `FOLIO_SNAPSHOT` | `snapshot.location` |
//!
//! Unknown keys are rejected to catch typos early.

use crate::snapshot::DEFAULT_SNAPSHOT_PATH;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

pub const CONFIG_FILE: &str = "config.toml";

/// Configuration loaded from `config.toml` and the environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentConfig {
    /// Live CMS connection.
    pub cms: CmsConfig,
    /// Where the build-time snapshot lives.
    pub snapshot: SnapshotConfig,
    /// Cache lifetimes.
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CmsConfig {
    pub enabled: bool,
    pub api_url: String,
    /// Origin that relative media paths are resolved against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_base: Option<String>,
    pub website_id: String,
    pub timeout_secs: u64,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: "http://localhost:3000/api".to_string(),
            media_base: None,
            website_id: "portfolio".to_string(),
            timeout_secs: 10,
        }
    }
}

impl CmsConfig {
    /// `media_base` if set, else `api_url` without a trailing `/api`.
    pub fn media_base(&self) -> &str {
        if let Some(base) = self.media_base.as_deref().filter(|b| !b.is_empty()) {
            return base;
        }
        let api = self.api_url.trim_end_matches('/');
        api.strip_suffix("/api").unwrap_or(api)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnapshotConfig {
    pub location: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            location: DEFAULT_SNAPSHOT_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub posts_ttl_secs: u64,
    pub categories_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            posts_ttl_secs: crate::cache::POSTS_TTL.as_secs(),
            categories_ttl_secs: crate::cache::CATEGORIES_TTL.as_secs(),
        }
    }
}

impl CacheConfig {
    pub fn posts_ttl(&self) -> Duration {
        Duration::from_secs(self.posts_ttl_secs)
    }

    pub fn categories_ttl(&self) -> Duration {
        Duration::from_secs(self.categories_ttl_secs)
    }
}

impl ContentConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let api = &self.cms.api_url;
        if !(api.starts_with("http://") || api.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "cms.api_url must be an http(s) URL, got {api:?}"
            )));
        }
        if self.cms.website_id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "cms.website_id must not be empty".into(),
            ));
        }
        if self.cms.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "cms.timeout_secs must be at least 1".into(),
            ));
        }
        if self.snapshot.location.trim().is_empty() {
            return Err(ConfigError::Validation(
                "snapshot.location must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Apply `FOLIO_*` overrides read through `lookup`.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("FOLIO_CMS_API_URL") {
            self.cms.api_url = url;
        }
        if let Some(id) = lookup("FOLIO_WEBSITE_ID") {
            self.cms.website_id = id;
        }
        if let Some(flag) = lookup("FOLIO_USE_CMS") {
            self.cms.enabled = matches!(flag.trim(), "true" | "1");
        }
        if let Some(location) = lookup("FOLIO_SNAPSHOT") {
            self.snapshot.location = location;
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ContentConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value. `Ok(None)` if it does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults and deserialize.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<ContentConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    Ok(merged.try_into()?)
}

/// Load `path` over stock defaults, apply the environment, then validate.
pub fn load_config(path: &Path) -> Result<ContentConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

pub fn load_config_with_env<F>(path: &Path, lookup: F) -> Result<ContentConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = resolve_config(load_raw_config(path)?)?;
    config.apply_env_from(lookup);
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Folio CMS Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Environment variables override this file:
#   FOLIO_CMS_API_URL -> cms.api_url
#   FOLIO_WEBSITE_ID  -> cms.website_id
#   FOLIO_USE_CMS     -> cms.enabled ("true" or "1" to enable)
#   FOLIO_SNAPSHOT    -> snapshot.location
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Live CMS
# ---------------------------------------------------------------------------
[cms]
# Query the live CMS. When false, only the bundled posts are served.
enabled = false

# Root of the Payload REST API.
api_url = "http://localhost:3000/api"

# Origin relative media URLs are resolved against.
# Defaults to api_url with a trailing "/api" removed.
# media_base = "http://localhost:3000"

# Only posts whose externalSource equals this value are listed.
website_id = "portfolio"

# Seconds before a CMS request is abandoned and the next tier is tried.
timeout_secs = 10

# ---------------------------------------------------------------------------
# Snapshot
# ---------------------------------------------------------------------------
[snapshot]
# Snapshot written by `folio-cms sync` and read when the CMS is unreachable.
# A file path, or an http(s) URL the site serves it from.
location = "public/data/cmsPosts.json"

# ---------------------------------------------------------------------------
# Cache
# ---------------------------------------------------------------------------
[cache]
# Lifetime of cached post pages and single posts.
posts_ttl_secs = 300

# Lifetime of the cached category list.
categories_ttl_secs = 3600
"##
}
