//! In-memory TTL cache for resolved content.
//!
//! Fetching from the CMS costs a network round trip and a full rich-text
//! transform per post, while the content changes a few times a week. The
//! client keeps resolved results here for a short window and serves repeat
//! requests without touching the network.
//!
//! # Expiry
//!
//! An entry captured at `T` is served for any lookup at `T + Δ` with
//! `Δ < ttl` and is a miss from `Δ >= ttl` on. Expired entries are removed
//! lazily by the lookup that finds them; nothing sweeps the map in the
//! background.
//!
//! | Cache | TTL |
//! |---|---|
//! | post pages, single posts | 5 minutes |
//! | category list | 1 hour |
//!
//! # Clock
//!
//! Time comes from an injected [`Clock`] so tests can move time forward
//! with [`ManualClock`] instead of sleeping.
//!
//! # Concurrency
//!
//! The map sits behind a `Mutex` that is only held for the lookup or insert
//! itself. Two requests that miss the same key concurrently both go to the
//! network; the later insert replaces the earlier one whole.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

pub const POSTS_TTL: Duration = Duration::from_secs(5 * 60);
pub const CATEGORIES_TTL: Duration = Duration::from_secs(60 * 60);

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    elapsed: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut elapsed = self.elapsed.lock().unwrap_or_else(PoisonError::into_inner);
        *elapsed += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + *self.elapsed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A cached value and the instant it was captured.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub captured_at: Instant,
}

/// Key → entry map with a single TTL for every entry.
pub struct TtlCache<T> {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
    stats: Mutex<CacheStats>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
            stats: Mutex::new(CacheStats::default()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a live entry. An expired entry is evicted and counts as a miss.
    pub fn get(&self, key: &str) -> Option<T> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);

        let Some(entry) = entries.get(key) else {
            stats.miss();
            return None;
        };
        if now.saturating_duration_since(entry.captured_at) >= self.ttl {
            entries.remove(key);
            stats.expire();
            return None;
        }
        stats.hit();
        Some(entry.value.clone())
    }

    /// Store a value, replacing any previous entry for the key.
    pub fn insert(&self, key: impl Into<String>, value: T) {
        let entry = CacheEntry {
            value,
            captured_at: self.clock.now(),
        };
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), entry);
    }

    /// Number of stored entries, expired ones included until a lookup evicts them.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        *self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Lookup counters for one cache.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
    pub expired: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn expire(&mut self) {
        self.expired += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses + self.expired
    }
}

impl std::ops::Add for CacheStats {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            hits: self.hits + other.hits,
            misses: self.misses + other.misses,
            expired: self.expired + other.expired,
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.expired > 0 {
            write!(
                f,
                "{} hits, {} misses, {} expired ({} lookups)",
                self.hits,
                self.misses,
                self.expired,
                self.total()
            )
        } else if self.hits > 0 {
            write!(
                f,
                "{} hits, {} misses ({} lookups)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} misses", self.misses)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(ttl: Duration) -> (Arc<ManualClock>, TtlCache<String>) {
        let clock = Arc::new(ManualClock::new());
        let cache = TtlCache::new(ttl, clock.clone() as Arc<dyn Clock>);
        (clock, cache)
    }

    // =========================================================================
    // Expiry boundary
    // =========================================================================

    #[test]
    fn fresh_entry_is_returned() {
        let (_, c) = cache(POSTS_TTL);
        c.insert("k", "v".to_string());
        assert_eq!(c.get("k"), Some("v".to_string()));
    }

    #[test]
    fn entry_served_just_before_ttl() {
        let (clock, c) = cache(POSTS_TTL);
        c.insert("k", "v".to_string());
        clock.advance(POSTS_TTL - Duration::from_millis(1));
        assert_eq!(c.get("k"), Some("v".to_string()));
    }

    #[test]
    fn entry_misses_at_exactly_ttl() {
        let (clock, c) = cache(POSTS_TTL);
        c.insert("k", "v".to_string());
        clock.advance(POSTS_TTL);
        assert_eq!(c.get("k"), None);
    }

    #[test]
    fn expired_entry_is_evicted_on_lookup() {
        let (clock, c) = cache(Duration::from_secs(10));
        c.insert("k", "v".to_string());
        clock.advance(Duration::from_secs(11));
        // still stored until someone looks
        assert_eq!(c.len(), 1);
        assert_eq!(c.get("k"), None);
        assert_eq!(c.len(), 0);
    }

    #[test]
    fn reinsert_resets_capture_time() {
        let (clock, c) = cache(Duration::from_secs(10));
        c.insert("k", "old".to_string());
        clock.advance(Duration::from_secs(8));
        c.insert("k", "new".to_string());
        clock.advance(Duration::from_secs(8));
        assert_eq!(c.get("k"), Some("new".to_string()));
    }

    #[test]
    fn keys_are_independent() {
        let (_, c) = cache(POSTS_TTL);
        c.insert("a", "1".to_string());
        assert_eq!(c.get("b"), None);
        assert_eq!(c.get("a"), Some("1".to_string()));
    }

    #[test]
    fn separate_caches_do_not_share_state() {
        let (_, a) = cache(POSTS_TTL);
        let (_, b) = cache(POSTS_TTL);
        a.insert("k", "v".to_string());
        assert!(b.is_empty());
    }

    // =========================================================================
    // CacheStats
    // =========================================================================

    #[test]
    fn stats_count_hits_misses_and_expiry() {
        let (clock, c) = cache(Duration::from_secs(5));
        c.get("k");
        c.insert("k", "v".to_string());
        c.get("k");
        clock.advance(Duration::from_secs(5));
        c.get("k");
        assert_eq!(
            c.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                expired: 1
            }
        );
    }

    #[test]
    fn cache_stats_display_with_hits() {
        let s = CacheStats {
            hits: 5,
            misses: 2,
            expired: 0,
        };
        assert_eq!(format!("{}", s), "5 hits, 2 misses (7 lookups)");
    }

    #[test]
    fn cache_stats_display_with_expired() {
        let s = CacheStats {
            hits: 3,
            misses: 1,
            expired: 2,
        };
        assert_eq!(format!("{}", s), "3 hits, 1 misses, 2 expired (6 lookups)");
    }

    #[test]
    fn cache_stats_display_no_hits() {
        let s = CacheStats {
            hits: 0,
            misses: 3,
            expired: 0,
        };
        assert_eq!(format!("{}", s), "3 misses");
    }

    #[test]
    fn cache_stats_add() {
        let a = CacheStats {
            hits: 1,
            misses: 2,
            expired: 3,
        };
        assert_eq!((a + a).total(), 12);
    }
}
