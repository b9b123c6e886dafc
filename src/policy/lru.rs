//! # Least Recently Used (LRU) Cache
//!
//! A bounded map that evicts the entry **least recently accessed**. Every hit
//! promotes its entry to the most-recently-used position, so entries survive
//! by being read, not just by being young.
//!
//! Two types live here:
//!
//! - [`LruCache`]: the single-threaded core.
//! - [`ConcurrentLruCache`]: a cloneable, thread-safe handle wrapping the core
//!   in `parking_lot::RwLock` (feature `concurrency`, on by default).
//!
//! ## Architecture
//!
//! ```text
//!   index: FxHashMap<K, CellId>        queue: CellList<(K, V)>
//!   ┌──────┬───────┐
//!   │ "a"  │ id_0  │                   head ──► (b) ◄──► (a) ◄──► (c) ◄── tail
//!   │ "b"  │ id_1  │                           ▲                  ▲
//!   │ "c"  │ id_2  │                       next victim     most recent
//!   └──────┴───────┘
//!
//!   get("b") hit: unlink (b), relink at tail        ── O(1)
//!   insert at capacity: pop head, link new at tail  ── O(1)
//! ```
//!
//! A hit is one atomic read-modify-relink: look up the cell id, move the cell
//! to the tail, return the value. In [`ConcurrentLruCache`] that whole
//! sequence runs under a single write lock, so a hit can never interleave
//! with another thread's eviction and resurrect a dead entry.
//!
//! ## Behavior
//!
//! | Operation            | Order effect                                      |
//! |----------------------|---------------------------------------------------|
//! | `get` hit            | Promote to most-recently-used                     |
//! | `peek`               | None                                              |
//! | `insert` (new key)   | Evict head if full, then link at tail             |
//! | `insert` (existing)  | Replace value and promote                         |
//! | `touch`              | Promote without reading                           |
//!
//! ## Example
//!
//! ```
//! use mapkit::policy::lru::LruCache;
//!
//! let mut cache = LruCache::new(2);
//! cache.insert("a", 1);
//! cache.insert("b", 2);
//! cache.get(&"a");          // "a" is now most recent
//! cache.insert("c", 3);     // evicts "b"
//! assert!(cache.contains(&"a"));
//! assert!(!cache.contains(&"b"));
//! ```

use std::hash::Hash;
use std::mem;

use rustc_hash::FxHashMap;

use crate::ds::cell_list::{CellId, CellList};
use crate::error::ConfigError;
#[cfg(any(test, debug_assertions))]
use crate::error::InvariantError;
use crate::metrics::CacheStats;
use crate::traits::{CoreCache, MutableCache, RecencyCache};

/// Bounded cache evicting in recency order. See the [module docs](self).
#[derive(Debug, Clone)]
pub struct LruCache<K, V> {
    index: FxHashMap<K, CellId>,
    queue: CellList<(K, V)>,
    capacity: usize,
    stats: CacheStats,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// Returns a [`ConfigError`] if `capacity` is zero.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("capacity must be > 0"));
        }
        let mut index = FxHashMap::default();
        index.reserve(capacity);
        Ok(Self {
            index,
            queue: CellList::with_capacity(capacity),
            capacity,
            stats: CacheStats::new(),
        })
    }

    /// Creates a cache holding at most `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. Use [`try_new`](Self::try_new) to handle
    /// that case without panicking.
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(cache) => cache,
            Err(err) => panic!("{err}"),
        }
    }

    /// Inserts a pair, returning the previous value for `key`.
    ///
    /// Both branches leave `key` as the most recently used entry. A new key
    /// at capacity evicts the least recently used entry first.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&id) = self.index.get(&key) {
            self.queue.move_to_back(id);
            if let Some(entry) = self.queue.get_mut(id) {
                return Some(mem::replace(&mut entry.1, value));
            }
        }

        if self.queue.len() == self.capacity {
            self.evict_lru();
        }
        let id = self.queue.push_back((key.clone(), value));
        self.index.insert(key, id);
        None
    }

    /// Looks up a value; a hit promotes the entry to most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        match self.index.get(key) {
            Some(&id) => {
                self.stats.record_hit();
                self.queue.move_to_back(id);
                self.queue.get(id).map(|(_, v)| v)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Looks up a value without promoting it or recording statistics.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let &id = self.index.get(key)?;
        self.queue.get(id).map(|(_, v)| v)
    }

    /// Returns the resident value, or computes, inserts and returns one.
    ///
    /// Either way `key` ends up most recently used. A repaired miss counts as
    /// both a miss and a soft miss; `make` runs at most once.
    pub fn get_or_insert_with<F>(&mut self, key: K, make: F) -> &V
    where
        F: FnOnce() -> V,
    {
        let id = match self.index.get(&key) {
            Some(&id) => {
                self.stats.record_hit();
                self.queue.move_to_back(id);
                id
            }
            None => {
                self.stats.record_miss();
                self.stats.record_soft_miss();
                if self.queue.len() == self.capacity {
                    self.evict_lru();
                }
                let id = self.queue.push_back((key.clone(), make()));
                self.index.insert(key, id);
                id
            }
        };
        match self.queue.get(id) {
            Some((_, v)) => v,
            // The id was either just validated against the index or just
            // allocated.
            None => unreachable!("indexed cell is always live"),
        }
    }

    /// Removes a key in O(1).
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.index.remove(key)?;
        self.queue.remove(id).map(|(_, v)| v)
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let (key, value) = self.queue.pop_front()?;
        self.index.remove(&key);
        Some((key, value))
    }

    /// Returns the least recently used entry without promoting it.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.queue.front().map(|(k, v)| (k, v))
    }

    /// Promotes a key to most recently used without reading its value.
    pub fn touch(&mut self, key: &K) -> bool {
        match self.index.get(key) {
            Some(&id) => self.queue.move_to_back(id),
            None => false,
        }
    }

    /// Position of `key` in eviction order; 0 is the next victim.
    pub fn recency_rank(&self, key: &K) -> Option<usize> {
        if !self.index.contains_key(key) {
            return None;
        }
        self.queue.iter().position(|(k, _)| k == key)
    }

    /// Returns `true` if `key` is resident.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` if nothing is resident.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Maximum number of resident entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Removes every entry. Statistics are kept.
    pub fn clear(&mut self) {
        self.index.clear();
        self.queue.clear();
    }

    /// Snapshot of the hit/miss/eviction counters.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    fn evict_lru(&mut self) {
        if let Some((key, _)) = self.queue.pop_front() {
            self.index.remove(&key);
            self.stats.record_eviction();
        }
    }

    /// Validates index/queue consistency and the capacity bound.
    #[cfg(any(test, debug_assertions))]
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.queue.debug_validate_invariants();

        if self.queue.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "len {} exceeds capacity {}",
                self.queue.len(),
                self.capacity
            )));
        }
        if self.index.len() != self.queue.len() {
            return Err(InvariantError::new("index and queue length mismatch"));
        }
        for (key, &id) in &self.index {
            match self.queue.get(id) {
                Some((cell_key, _)) if cell_key == key => {}
                Some(_) => return Err(InvariantError::new("indexed id belongs to another key")),
                None => return Err(InvariantError::new("indexed id names a dead cell")),
            }
        }
        Ok(())
    }
}

impl<K, V> CoreCache<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        LruCache::insert(self, key, value)
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        LruCache::get(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        LruCache::contains(self, key)
    }

    fn len(&self) -> usize {
        LruCache::len(self)
    }

    fn capacity(&self) -> usize {
        LruCache::capacity(self)
    }

    fn clear(&mut self) {
        LruCache::clear(self)
    }
}

impl<K, V> MutableCache<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn remove(&mut self, key: &K) -> Option<V> {
        LruCache::remove(self, key)
    }
}

impl<K, V> RecencyCache<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn pop_lru(&mut self) -> Option<(K, V)> {
        LruCache::pop_lru(self)
    }

    fn peek_lru(&self) -> Option<(&K, &V)> {
        LruCache::peek_lru(self)
    }

    fn touch(&mut self, key: &K) -> bool {
        LruCache::touch(self, key)
    }

    fn recency_rank(&self, key: &K) -> Option<usize> {
        LruCache::recency_rank(self, key)
    }
}

// ---------------------------------------------------------------------------
// ConcurrentLruCache
// ---------------------------------------------------------------------------

#[cfg(feature = "concurrency")]
mod concurrent {
    use std::sync::Arc;

    use parking_lot::RwLock;

    use super::*;

    /// Thread-safe, cloneable LRU cache handle.
    ///
    /// Values are stored as `Arc<V>` so lookups can hand out ownership
    /// without holding the lock while the caller uses the value. Any
    /// operation that changes recency order (including a `get` hit) takes
    /// the write lock for the whole read-modify-relink sequence; read-only
    /// operations (`peek`, `len`, `contains`, `stats`) share the read lock.
    ///
    /// # Example
    ///
    /// ```
    /// use mapkit::policy::lru::ConcurrentLruCache;
    ///
    /// let cache = ConcurrentLruCache::new(64);
    /// cache.insert("config", 1);
    /// let handle = cache.clone(); // same underlying cache
    /// assert_eq!(handle.get(&"config").as_deref(), Some(&1));
    /// ```
    pub struct ConcurrentLruCache<K, V> {
        inner: Arc<RwLock<LruCache<K, Arc<V>>>>,
    }

    impl<K, V> Clone for ConcurrentLruCache<K, V> {
        fn clone(&self) -> Self {
            Self {
                inner: Arc::clone(&self.inner),
            }
        }
    }

    impl<K, V> ConcurrentLruCache<K, V>
    where
        K: Eq + Hash + Clone,
    {
        /// Creates a cache holding at most `capacity` entries.
        ///
        /// Returns a [`ConfigError`] if `capacity` is zero.
        pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
            Ok(Self {
                inner: Arc::new(RwLock::new(LruCache::try_new(capacity)?)),
            })
        }

        /// Creates a cache holding at most `capacity` entries.
        ///
        /// # Panics
        ///
        /// Panics if `capacity` is zero.
        pub fn new(capacity: usize) -> Self {
            match Self::try_new(capacity) {
                Ok(cache) => cache,
                Err(err) => panic!("{err}"),
            }
        }

        /// Inserts a pair, returning the previous value for `key`.
        pub fn insert(&self, key: K, value: V) -> Option<Arc<V>> {
            self.inner.write().insert(key, Arc::new(value))
        }

        /// Inserts an already-shared value.
        pub fn insert_arc(&self, key: K, value: Arc<V>) -> Option<Arc<V>> {
            self.inner.write().insert(key, value)
        }

        /// Looks up a value; a hit promotes the entry under the write lock.
        pub fn get(&self, key: &K) -> Option<Arc<V>> {
            self.inner.write().get(key).cloned()
        }

        /// Looks up a value without promoting it or recording statistics.
        pub fn peek(&self, key: &K) -> Option<Arc<V>> {
            self.inner.read().peek(key).cloned()
        }

        /// Returns the resident value, or computes, inserts and returns one.
        ///
        /// The whole lookup-or-insert runs under one write lock, so `make`
        /// runs at most once per miss even under contention; other threads
        /// block rather than compute in parallel.
        pub fn get_or_insert_with<F>(&self, key: K, make: F) -> Arc<V>
        where
            F: FnOnce() -> V,
        {
            self.inner
                .write()
                .get_or_insert_with(key, || Arc::new(make()))
                .clone()
        }

        /// Removes a key, returning its value if it was resident.
        pub fn remove(&self, key: &K) -> Option<Arc<V>> {
            self.inner.write().remove(key)
        }

        /// Removes and returns the least recently used entry.
        pub fn pop_lru(&self) -> Option<(K, Arc<V>)> {
            self.inner.write().pop_lru()
        }

        /// Returns the least recently used entry without promoting it.
        pub fn peek_lru(&self) -> Option<(K, Arc<V>)> {
            let guard = self.inner.read();
            guard.peek_lru().map(|(k, v)| (k.clone(), v.clone()))
        }

        /// Promotes a key to most recently used without reading its value.
        pub fn touch(&self, key: &K) -> bool {
            self.inner.write().touch(key)
        }

        /// Returns `true` if `key` is resident.
        pub fn contains(&self, key: &K) -> bool {
            self.inner.read().contains(key)
        }

        /// Number of resident entries.
        pub fn len(&self) -> usize {
            self.inner.read().len()
        }

        /// Returns `true` if nothing is resident.
        pub fn is_empty(&self) -> bool {
            self.inner.read().is_empty()
        }

        /// Maximum number of resident entries.
        pub fn capacity(&self) -> usize {
            self.inner.read().capacity()
        }

        /// Removes every entry. Statistics are kept.
        pub fn clear(&self) {
            self.inner.write().clear()
        }

        /// Snapshot of the hit/miss/eviction counters.
        pub fn stats(&self) -> CacheStats {
            self.inner.read().stats()
        }

        /// Validates the inner cache under the read lock.
        #[cfg(any(test, debug_assertions))]
        pub fn check_invariants(&self) -> Result<(), InvariantError> {
            self.inner.read().check_invariants()
        }
    }
}

#[cfg(feature = "concurrency")]
pub use concurrent::ConcurrentLruCache;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
