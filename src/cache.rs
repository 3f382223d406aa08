use std::{
    fmt,
    num::NonZeroUsize,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use parking_lot::Mutex;

use crate::entity::{AsciiString, Node, Profile, Signature, Value};

/// A caller-supplied put-through cache for one entity kind.
///
/// The loader performs both sides itself: it queries `get` before decoding
/// and calls `put` after a miss. Policy — size, eviction, sharding — is
/// entirely the implementation's concern. Implementations must tolerate
/// concurrent calls.
pub trait EntityCache<E>: Send + Sync {
    fn get(&self, key: i32) -> Option<Arc<E>>;
    fn put(&self, key: i32, value: Arc<E>);
}

/// Counter snapshot of a built-in LRU cache.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Opaque monotonic tally of eviction events, usable to detect a
    /// working set thrashing against the cache capacity.
    pub switches: u64,
}

/// Bounded least-recently-used entity cache.
///
/// A pure data structure: it holds no fetch hook, the loader decodes on a
/// miss and inserts the result. Internally thread-safe; the counters are
/// diagnostic only and relaxed.
pub(crate) struct LruCache<E> {
    entries: Mutex<lru::LruCache<i32, Arc<E>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    switches: AtomicU64,
}

impl<E> LruCache<E> {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(lru::LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            switches: AtomicU64::new(0),
        }
    }

    /// Looks a key up, refreshing its recency on a hit.
    pub fn get(&self, key: i32) -> Option<Arc<E>> {
        let hit = self.entries.lock().get(&key).map(Arc::clone);

        match &hit {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };

        hit
    }

    /// Inserts a decoded entity, evicting the least-recently-used entry
    /// when the cache is at capacity.
    pub fn put(&self, key: i32, value: Arc<E>) {
        let evicted = self.entries.lock().push(key, value);

        if let Some((evicted_key, _)) = evicted
            && evicted_key != key
        {
            self.switches.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            switches: self.switches.load(Ordering::Relaxed),
        }
    }
}

impl<E> fmt::Debug for LruCache<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("len", &self.entries.lock().len())
            .field("stats", &self.stats())
            .finish()
    }
}

/// Cache selection for one entity kind, applied when the dataset is built.
pub enum CacheConfig<E> {
    /// No cache: every load decodes from the source.
    None,
    /// Built-in LRU cache with the given capacity. A zero capacity fails
    /// dataset construction with
    /// [`InvalidCacheKind`](crate::error::DatasetError::InvalidCacheKind).
    Lru(usize),
    /// Caller-supplied put-through cache.
    Custom(Arc<dyn EntityCache<E>>),
}

impl<E> Clone for CacheConfig<E> {
    fn clone(&self) -> Self {
        match self {
            Self::None => Self::None,
            Self::Lru(capacity) => Self::Lru(*capacity),
            Self::Custom(cache) => Self::Custom(Arc::clone(cache)),
        }
    }
}

impl<E> Default for CacheConfig<E> {
    fn default() -> Self {
        Self::None
    }
}

impl<E> fmt::Debug for CacheConfig<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Lru(capacity) => f.debug_tuple("Lru").field(capacity).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Per-entity-kind cache selection for a dataset build.
#[derive(Clone, Debug, Default)]
pub struct Caches {
    pub strings: CacheConfig<AsciiString>,
    pub values: CacheConfig<Value>,
    pub profiles: CacheConfig<Profile>,
    pub signatures: CacheConfig<Signature>,
    pub nodes: CacheConfig<Node>,
}

impl Caches {
    pub const DEFAULT_STRING_CACHE_SIZE: usize = 5000;
    pub const DEFAULT_VALUE_CACHE_SIZE: usize = 5000;
    pub const DEFAULT_PROFILE_CACHE_SIZE: usize = 600;
    pub const DEFAULT_SIGNATURE_CACHE_SIZE: usize = 500;
    pub const DEFAULT_NODE_CACHE_SIZE: usize = 15000;

    /// No caching anywhere; every load decodes from the source.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// LRU caches of the default capacities for every cacheable kind.
    #[must_use]
    pub fn default_lru() -> Self {
        Self {
            strings: CacheConfig::Lru(Self::DEFAULT_STRING_CACHE_SIZE),
            values: CacheConfig::Lru(Self::DEFAULT_VALUE_CACHE_SIZE),
            profiles: CacheConfig::Lru(Self::DEFAULT_PROFILE_CACHE_SIZE),
            signatures: CacheConfig::Lru(Self::DEFAULT_SIGNATURE_CACHE_SIZE),
            nodes: CacheConfig::Lru(Self::DEFAULT_NODE_CACHE_SIZE),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{num::NonZeroUsize, sync::Arc};

    use super::LruCache;

    fn cache(capacity: usize) -> LruCache<i32> {
        LruCache::new(NonZeroUsize::new(capacity).unwrap())
    }

    #[test]
    fn eviction_is_least_recently_used() {
        let cache = cache(2);
        cache.put(1, Arc::new(10));
        cache.put(2, Arc::new(20));

        // Touch 1 so that 2 becomes the eviction candidate.
        assert_eq!(cache.get(1).as_deref(), Some(&10));
        cache.put(3, Arc::new(30));

        assert_eq!(cache.get(2), None);
        assert_eq!(cache.get(1).as_deref(), Some(&10));
        assert_eq!(cache.get(3).as_deref(), Some(&30));
    }

    #[test]
    fn counters_track_hits_misses_and_evictions() {
        let cache = cache(1);
        cache.put(1, Arc::new(10));

        assert!(cache.get(1).is_some());
        assert!(cache.get(2).is_none());
        cache.put(2, Arc::new(20));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.switches, 1);
    }

    #[test]
    fn replacing_a_key_is_not_an_eviction() {
        let cache = cache(2);
        cache.put(1, Arc::new(10));
        cache.put(1, Arc::new(11));

        assert_eq!(cache.stats().switches, 0);
        assert_eq!(cache.get(1).as_deref(), Some(&11));
    }
}
