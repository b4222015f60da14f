use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

use crate::filter::Filter;

/// Default number of cached lookups
pub const DEFAULT_CACHE_SIZE: usize = 1024;

/// Filter with an LRU cache of recent textual lookups.
///
/// Worth it when the same addresses are checked over and over (e.g. per
/// request on a long-lived connection); the trie walk itself is already cheap.
///
/// Every lookup takes one `Mutex`, so concurrent callers are serialized.
/// A plain [`Filter`] lets any number of readers query in parallel.
pub struct CachedFilter {
    filter: Filter,
    cache: Mutex<LruCache<String, bool>>,
}

impl CachedFilter {
    /// Wrap a filter. A `cache_size` of 0 is treated as 1.
    pub fn new(filter: Filter, cache_size: usize) -> Self {
        let cache_size = NonZeroUsize::new(cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            filter,
            cache: Mutex::new(LruCache::new(cache_size)),
        }
    }

    pub fn contains(&self, address: &str) -> bool {
        let mut cache = self.cache.lock();

        if let Some(&cached) = cache.get(address) {
            return cached;
        }

        // The lookup is a bounded bit walk, so computing under the lock is fine.
        let result = self.filter.contains(address);
        cache.put(address.to_string(), result);
        result
    }

    /// The underlying filter, for uncached or typed lookups.
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Number of cached lookups.
    pub fn cached_len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }
}

impl std::fmt::Debug for CachedFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedFilter")
            .field("filter", &self.filter)
            .field("cached_len", &self.cached_len())
            .finish()
    }
}
