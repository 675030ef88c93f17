//! Resolution cache
//!
//! Memoizes [`ParseResult`]s by normalized input. Every entry is tagged with
//! the tree version it was parsed against; a lookup with any other version
//! is a miss and drops the entry, so a hit always equals a fresh parse of
//! the current tree.

use crate::tree::ParseResult;
use lectern_core::CacheConfig;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::trace;

#[derive(Debug)]
struct CacheEntry {
    version: u64,
    result: Arc<ParseResult>,
    weight: usize,
}

#[derive(Debug)]
struct CacheInner {
    entries: LruCache<String, CacheEntry>,
    weight: usize,
    stats: CacheStats,
}

impl CacheInner {
    fn evict_over(&mut self, max_weight: usize) {
        while self.weight > max_weight {
            let Some((_, entry)) = self.entries.pop_lru() else {
                break;
            };
            self.weight -= entry.weight;
            self.stats.evictions += 1;
        }
    }
}

/// Counters since creation (or the last [`ResolutionCache::clear`])
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that missed, including stale versions
    pub misses: u64,
    /// Entries dropped to respect the bounds
    pub evictions: u64,
    /// Entries currently held
    pub entries: usize,
    /// Summed weight currently held
    pub weight: usize,
}

impl CacheStats {
    /// Hits over lookups, 0 when nothing was looked up
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU cache of parse results bounded by entry count and total weight
#[derive(Debug)]
pub struct ResolutionCache {
    inner: Mutex<CacheInner>,
    max_weight: usize,
}

impl ResolutionCache {
    /// Cache with the given bounds; zero bounds are raised to one
    #[must_use]
    pub fn new(capacity: usize, max_weight: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(CacheInner {
                entries: LruCache::new(capacity),
                weight: 0,
                stats: CacheStats::default(),
            }),
            max_weight: max_weight.max(1),
        }
    }

    /// Cache sized from configuration
    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.capacity, config.max_weight)
    }

    /// Result for `signature` if it was parsed against `version`
    pub fn get(&self, signature: &str, version: u64) -> Option<Arc<ParseResult>> {
        let mut inner = self.inner.lock();
        let cached = inner
            .entries
            .get(signature)
            .map(|entry| (entry.version, Arc::clone(&entry.result)));

        match cached {
            Some((cached_version, result)) if cached_version == version => {
                inner.stats.hits += 1;
                Some(result)
            }
            Some((cached_version, _)) => {
                if let Some(stale) = inner.entries.pop(signature) {
                    inner.weight -= stale.weight;
                }
                inner.stats.misses += 1;
                trace!(signature, stale = cached_version, current = version, "Dropped stale parse");
                None
            }
            None => {
                inner.stats.misses += 1;
                None
            }
        }
    }

    /// Store a result parsed against `version`.
    ///
    /// Results heavier than the whole weight budget are not stored.
    pub fn put(&self, signature: &str, version: u64, result: Arc<ParseResult>) {
        let weight = signature.len() + result.weight();
        if weight > self.max_weight {
            trace!(signature, weight, "Parse too heavy to cache");
            return;
        }

        let mut inner = self.inner.lock();
        let entry = CacheEntry {
            version,
            result,
            weight,
        };
        if let Some((key, displaced)) = inner.entries.push(signature.to_string(), entry) {
            inner.weight -= displaced.weight;
            if key != signature {
                inner.stats.evictions += 1;
            }
        }
        inner.weight += weight;
        inner.evict_over(self.max_weight);
    }

    /// Drop everything and reset the counters
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.weight = 0;
        inner.stats = CacheStats::default();
    }

    /// Current counters
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            entries: inner.entries.len(),
            weight: inner.weight,
            ..inner.stats
        }
    }

    /// Number of entries held
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Whether nothing is held
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UsageKind;
    use crate::tree::ParseOutcome;

    fn result(input: &str) -> Arc<ParseResult> {
        Arc::new(ParseResult {
            input: input.to_string(),
            outcome: ParseOutcome::Partial {
                cursor: 0,
                kind: UsageKind::UnknownCommand,
                expected: Vec::new(),
                failure: None,
            },
            requirements: Vec::new(),
        })
    }

    #[test]
    fn test_hit_requires_matching_version() {
        let cache = ResolutionCache::new(8, 10_000);
        cache.put("tp 5", 1, result("tp 5"));

        assert!(cache.get("tp 5", 1).is_some());
        assert!(cache.get("tp 5", 2).is_none());
        // the stale entry is gone even for its own version
        assert!(cache.get("tp 5", 1).is_none());

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (1, 2));
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.weight, 0);
    }

    #[test]
    fn test_capacity_evicts_least_recent() {
        let cache = ResolutionCache::new(2, 10_000);
        cache.put("a", 1, result("a"));
        cache.put("b", 1, result("b"));
        assert!(cache.get("a", 1).is_some());
        cache.put("c", 1, result("c"));

        assert!(cache.get("b", 1).is_none());
        assert!(cache.get("a", 1).is_some());
        assert!(cache.get("c", 1).is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_weight_bound() {
        let one = 1 + result("a").weight();
        let cache = ResolutionCache::new(100, one * 2);
        cache.put("a", 1, result("a"));
        cache.put("b", 1, result("b"));
        cache.put("c", 1, result("c"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a", 1).is_none());
        assert!(cache.stats().weight <= one * 2);
    }

    #[test]
    fn test_replacing_keeps_weight_consistent() {
        let cache = ResolutionCache::new(4, 10_000);
        cache.put("a", 1, result("a"));
        cache.put("a", 2, result("a"));
        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.weight, 1 + result("a").weight());
        assert_eq!(stats.evictions, 0);
    }

    #[test]
    fn test_oversized_results_are_skipped() {
        let cache = ResolutionCache::new(4, 1);
        cache.put("a", 1, result("a"));
        assert!(cache.is_empty());
    }
}
