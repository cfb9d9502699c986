//! Bounded memoization cache for query summaries.
//!
//! Applications issue a small set of distinct statements many times, so the
//! summary for each raw query string is computed once and reused. The cache
//! is bounded, evicting least recently used entries, so applications that
//! build many distinct query strings cannot grow it without limit.
//!
//! ## Thread Safety
//!
//! A single `parking_lot::Mutex` guards the map. It is never held while a
//! summary is computed. When two threads miss on the same key at once, both
//! compute, the first to store wins, and the loser returns the stored value,
//! so every caller observes one value per key.
//!
//! ```rust
//! use sql_summary::SummaryCache;
//!
//! let cache = SummaryCache::new(100).unwrap();
//! assert_eq!(cache.fetch(Some("k"), || "v".to_string()), "v");
//! assert_eq!(cache.fetch(Some("k"), || "other".to_string()), "v");
//! ```

use crate::error::{SummaryError, SummaryResult};
use lru::LruCache;
use parking_lot::Mutex;
use std::borrow::Borrow;
use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use tracing::debug;

/// Default number of cached summaries.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Owned key. `None` is a valid key, distinct from `Some("")`.
#[derive(Debug, Clone)]
struct CacheKey(Option<String>);

/// Key as seen by lookups, so a hit never copies the query text.
trait KeyView {
    fn view(&self) -> Option<&str>;
}

impl KeyView for CacheKey {
    fn view(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl KeyView for Option<&str> {
    fn view(&self) -> Option<&str> {
        *self
    }
}

impl<'a> Borrow<dyn KeyView + 'a> for CacheKey {
    fn borrow(&self) -> &(dyn KeyView + 'a) {
        self
    }
}

// Owned and borrowed keys must hash and compare identically.
impl Hash for dyn KeyView + '_ {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.view().hash(state);
    }
}

impl PartialEq for dyn KeyView + '_ {
    fn eq(&self, other: &Self) -> bool {
        self.view() == other.view()
    }
}

impl Eq for dyn KeyView + '_ {}

impl Hash for CacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.view().hash(state);
    }
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        self.view() == other.view()
    }
}

impl Eq for CacheKey {}

/// Statistics about cache performance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that required computing a value
    pub misses: u64,
    /// Entries dropped to stay within capacity
    pub evictions: u64,
    /// Current number of entries
    pub entries: usize,
    /// Maximum number of entries
    pub capacity: usize,
}

impl CacheStats {
    /// Calculate cache hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct Inner {
    entries: LruCache<CacheKey, String>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

/// Thread-safe, bounded key → summary store.
///
/// Owned by the caller (typically one per process) and shared by reference
/// or `Arc` across threads.
pub struct SummaryCache {
    inner: Mutex<Inner>,
    capacity: NonZeroUsize,
}

impl SummaryCache {
    /// Create a cache holding at most `capacity` entries.
    ///
    /// A zero capacity is a configuration error.
    pub fn new(capacity: usize) -> SummaryResult<Self> {
        let capacity =
            NonZeroUsize::new(capacity).ok_or(SummaryError::InvalidCapacity(capacity))?;
        Ok(Self::with_capacity(capacity))
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::new(capacity),
                hits: 0,
                misses: 0,
                evictions: 0,
            }),
            capacity,
        }
    }

    /// Return the value for `key`, computing and storing it on a miss.
    pub fn fetch<F>(&self, key: Option<&str>, compute: F) -> String
    where
        F: FnOnce() -> String,
    {
        match self.try_fetch(key, || Ok::<_, Infallible>(compute())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Like [`fetch`](Self::fetch) with a fallible computation.
    ///
    /// Errors are returned to the caller and nothing is stored.
    pub fn try_fetch<F, E>(&self, key: Option<&str>, compute: F) -> Result<String, E>
    where
        F: FnOnce() -> Result<String, E>,
    {
        let view: &dyn KeyView = &key;

        {
            let mut inner = self.inner.lock();
            if let Some(value) = inner.entries.get(view).cloned() {
                inner.hits += 1;
                return Ok(value);
            }
            inner.misses += 1;
        }

        debug!(key_len = key.map_or(0, str::len), "Summary cache miss");
        let value = compute()?;

        let mut inner = self.inner.lock();
        // Another thread stored this key while we computed; converge on its value.
        if let Some(existing) = inner.entries.get(view).cloned() {
            return Ok(existing);
        }
        let owned = CacheKey(key.map(str::to_owned));
        if inner.entries.push(owned, value.clone()).is_some() {
            inner.evictions += 1;
            debug!(capacity = self.capacity.get(), "Evicted least recently used summary");
        }
        Ok(value)
    }

    /// Stored value for `key` without computing anything.
    pub fn get(&self, key: Option<&str>) -> Option<String> {
        let view: &dyn KeyView = &key;
        self.inner.lock().entries.get(view).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Drop every entry. Statistics are kept.
    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.evictions,
            entries: inner.entries.len(),
            capacity: self.capacity.get(),
        }
    }
}

impl Default for SummaryCache {
    fn default() -> Self {
        Self::with_capacity(NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }
}

impl fmt::Debug for SummaryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryCache")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tracing_test::traced_test;

    #[test]
    fn test_hit_does_not_recompute() {
        let cache = SummaryCache::new(10).unwrap();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            "SELECT users".to_string()
        };

        assert_eq!(cache.fetch(Some("q"), compute), "SELECT users");
        assert_eq!(cache.fetch(Some("q"), || panic!("must not recompute")), "SELECT users");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = SummaryCache::new(0).unwrap_err();
        assert!(matches!(err, SummaryError::InvalidCapacity(0)));
    }

    #[test]
    fn test_default_capacity() {
        assert_eq!(SummaryCache::default().capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn test_none_key_is_distinct_from_empty() {
        let cache = SummaryCache::new(10).unwrap();
        assert_eq!(cache.fetch(None, || "v".to_string()), "v");
        assert_eq!(cache.fetch(None, || "other".to_string()), "v");
        assert_eq!(cache.fetch(Some(""), || "empty".to_string()), "empty");
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = SummaryCache::new(10).unwrap();
        let result: Result<String, &str> = cache.try_fetch(Some("q"), || Err("boom"));
        assert_eq!(result, Err("boom"));
        assert!(cache.get(Some("q")).is_none());

        let result: Result<String, &str> = cache.try_fetch(Some("q"), || Ok("ok".to_string()));
        assert_eq!(result.as_deref(), Ok("ok"));
    }

    #[test]
    fn test_eviction_keeps_cache_bounded() {
        let cache = SummaryCache::new(2).unwrap();
        for key in ["a", "b", "c"] {
            cache.fetch(Some(key), || key.to_uppercase());
        }
        assert_eq!(cache.len(), 2);

        let first = cache.fetch(Some("a"), || "A".to_string());
        assert_eq!(first, "A");
        assert_eq!(cache.fetch(Some("d"), || "D".to_string()), "D");
        assert!(cache.len() <= 2);
        assert!(cache.stats().evictions >= 1);
    }

    #[test]
    fn test_borrowed_and_owned_keys_agree() {
        fn hash_of<T: Hash + ?Sized>(value: &T) -> u64 {
            let mut hasher = std::collections::hash_map::DefaultHasher::new();
            value.hash(&mut hasher);
            hasher.finish()
        }

        for key in [None, Some(""), Some("SELECT * FROM users")] {
            let owned = CacheKey(key.map(str::to_owned));
            let view: &dyn KeyView = &key;
            assert_eq!(hash_of(&owned), hash_of(view));
            let borrowed: &dyn KeyView = owned.borrow();
            assert!(borrowed == view);
        }
    }

    #[test]
    fn test_long_key_hits_without_recompute() {
        let cache = SummaryCache::new(4).unwrap();
        let key = format!("SELECT * FROM t WHERE x IN ({})", "1,".repeat(5_000));
        cache.fetch(Some(key.as_str()), || "SELECT t".to_string());
        for _ in 0..100 {
            assert_eq!(cache.fetch(Some(key.as_str()), || panic!("recomputed")), "SELECT t");
        }
        assert_eq!(cache.stats().hits, 100);
    }

    #[test]
    #[traced_test]
    fn test_eviction_is_logged() {
        let cache = SummaryCache::new(1).unwrap();
        cache.fetch(Some("a"), || "A".to_string());
        cache.fetch(Some("b"), || "B".to_string());
        assert!(logs_contain("Evicted least recently used summary"));
    }

    #[test]
    fn test_stats() {
        let cache = SummaryCache::new(10).unwrap();
        cache.fetch(Some("a"), || "1".to_string());
        cache.fetch(Some("a"), || "1".to_string());
        cache.fetch(Some("a"), || "1".to_string());
        cache.fetch(Some("b"), || "2".to_string());

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.capacity, 10);
        assert!((stats.hit_ratio() - 0.5).abs() < f64::EPSILON);
        assert_eq!(CacheStats::default().hit_ratio(), 0.0);
    }

    #[test]
    fn test_clear() {
        let cache = SummaryCache::new(10).unwrap();
        cache.fetch(Some("a"), || "1".to_string());
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.fetch(Some("a"), || "2".to_string()), "2");
    }
}
