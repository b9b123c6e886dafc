//! # Least Recently Inserted (LRI) Cache
//!
//! A bounded map that evicts the **oldest inserted** entry when full. Reads
//! never change eviction order, and re-inserting an existing key replaces its
//! value in place without moving it, so every entry's lifetime is decided the
//! moment it first enters the cache.
//!
//! ## Architecture
//!
//! ```text
//!   index: FxHashMap<K, CellId>        queue: CellList<(K, V)>
//!   ┌──────┬───────┐
//!   │ "a"  │ id_0  │                   head ──► (a) ◄──► (b) ◄──► (c) ◄── tail
//!   │ "b"  │ id_1  │                           ▲                  ▲
//!   │ "c"  │ id_2  │                       next victim         newest
//!   └──────┴───────┘
//! ```
//!
//! ## Behavior
//!
//! | Operation            | Order effect                                      |
//! |----------------------|---------------------------------------------------|
//! | `insert` (new key)   | Evict head if full, then link at tail             |
//! | `insert` (existing)  | Replace value in place; position unchanged        |
//! | `get` / `peek`       | None                                              |
//! | `remove`             | Unlink that cell only; others keep their order    |
//!
//! ## Performance
//!
//! - `insert` / `get` / `remove` / `pop_oldest`: O(1)
//! - `age_rank`: O(n) queue walk (diagnostics only)
//!
//! ## Example
//!
//! ```
//! use mapkit::policy::lri::LriCache;
//!
//! let mut cache = LriCache::new(2);
//! cache.insert("a", 1);
//! cache.insert("b", 2);
//! cache.get(&"a");          // does not protect "a"
//! cache.insert("c", 3);     // evicts "a", the oldest insert
//! assert!(!cache.contains(&"a"));
//! ```

use std::hash::Hash;
use std::mem;

use rustc_hash::FxHashMap;

use crate::ds::cell_list::{CellId, CellList};
use crate::error::ConfigError;
#[cfg(any(test, debug_assertions))]
use crate::error::InvariantError;
use crate::metrics::CacheStats;
use crate::traits::{CoreCache, InsertionOrderCache, MutableCache};

/// Bounded cache evicting in insertion order. See the [module docs](self).
#[derive(Debug, Clone)]
pub struct LriCache<K, V> {
    index: FxHashMap<K, CellId>,
    queue: CellList<(K, V)>,
    capacity: usize,
    stats: CacheStats,
}

impl<K, V> LriCache<K, V>
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
    /// An existing key is updated in place and keeps its eviction position.
    /// A new key evicts the oldest entry first if the cache is full.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&id) = self.index.get(&key) {
            if let Some(entry) = self.queue.get_mut(id) {
                return Some(mem::replace(&mut entry.1, value));
            }
        }

        if self.queue.len() == self.capacity {
            self.evict_oldest();
        }
        let id = self.queue.push_back((key.clone(), value));
        self.index.insert(key, id);
        None
    }

    /// Looks up a value, recording a hit or miss. Order is never touched.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        match self.index.get(key) {
            Some(&id) => {
                self.stats.record_hit();
                self.queue.get(id).map(|(_, v)| v)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Looks up a value without recording statistics.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let &id = self.index.get(key)?;
        self.queue.get(id).map(|(_, v)| v)
    }

    /// Returns the resident value, or computes, inserts and returns one.
    ///
    /// A repaired miss counts as both a miss and a soft miss; `make` runs at
    /// most once.
    pub fn get_or_insert_with<F>(&mut self, key: K, make: F) -> &V
    where
        F: FnOnce() -> V,
    {
        let id = match self.index.get(&key) {
            Some(&id) => {
                self.stats.record_hit();
                id
            }
            None => {
                self.stats.record_miss();
                self.stats.record_soft_miss();
                if self.queue.len() == self.capacity {
                    self.evict_oldest();
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

    /// Removes a key in O(1); surviving entries keep their relative order.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.index.remove(key)?;
        self.queue.remove(id).map(|(_, v)| v)
    }

    /// Removes and returns the oldest entry.
    pub fn pop_oldest(&mut self) -> Option<(K, V)> {
        let (key, value) = self.queue.pop_front()?;
        self.index.remove(&key);
        Some((key, value))
    }

    /// Returns the oldest entry without removing it.
    pub fn peek_oldest(&self) -> Option<(&K, &V)> {
        self.queue.front().map(|(k, v)| (k, v))
    }

    /// Position of `key` in eviction order; 0 is the next victim.
    pub fn age_rank(&self, key: &K) -> Option<usize> {
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

    fn evict_oldest(&mut self) {
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

impl<K, V> CoreCache<K, V> for LriCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        LriCache::insert(self, key, value)
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        LriCache::get(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        LriCache::contains(self, key)
    }

    fn len(&self) -> usize {
        LriCache::len(self)
    }

    fn capacity(&self) -> usize {
        LriCache::capacity(self)
    }

    fn clear(&mut self) {
        LriCache::clear(self)
    }
}

impl<K, V> MutableCache<K, V> for LriCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn remove(&mut self, key: &K) -> Option<V> {
        LriCache::remove(self, key)
    }
}

impl<K, V> InsertionOrderCache<K, V> for LriCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn pop_oldest(&mut self) -> Option<(K, V)> {
        LriCache::pop_oldest(self)
    }

    fn peek_oldest(&self) -> Option<(&K, &V)> {
        LriCache::peek_oldest(self)
    }

    fn age_rank(&self, key: &K) -> Option<usize> {
        LriCache::age_rank(self, key)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod correctness {
    use super::*;

    mod basic_behavior {
        use super::*;

        #[test]
        fn insert_and_get() {
            let mut cache = LriCache::new(4);
            assert_eq!(cache.insert("a", 1), None);
            assert_eq!(cache.insert("b", 2), None);
            assert_eq!(cache.get(&"a"), Some(&1));
            assert_eq!(cache.get(&"missing"), None);
            assert_eq!(cache.len(), 2);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn insert_existing_returns_old_value() {
            let mut cache = LriCache::new(4);
            cache.insert("a", 1);
            assert_eq!(cache.insert("a", 2), Some(1));
            assert_eq!(cache.peek(&"a"), Some(&2));
            assert_eq!(cache.len(), 1);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn clear_empties_but_keeps_stats() {
            let mut cache = LriCache::new(4);
            cache.insert("a", 1);
            cache.get(&"a");
            cache.clear();
            assert!(cache.is_empty());
            assert_eq!(cache.stats().hit_count, 1);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn zero_capacity_is_rejected() {
            let err = LriCache::<u64, u64>::try_new(0).unwrap_err();
            assert!(err.to_string().contains("capacity"));
        }

        #[test]
        #[should_panic(expected = "capacity")]
        fn zero_capacity_panics_in_new() {
            let _ = LriCache::<u64, u64>::new(0);
        }
    }

    mod eviction {
        use super::*;

        #[test]
        fn evicts_oldest_insert_first() {
            let mut cache = LriCache::new(2);
            cache.insert("a", 1);
            cache.insert("b", 2);
            cache.insert("c", 3);

            assert!(!cache.contains(&"a"));
            assert!(cache.contains(&"b"));
            assert!(cache.contains(&"c"));
            assert_eq!(cache.len(), 2);
            assert_eq!(cache.stats().eviction_count, 1);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn get_does_not_protect_from_eviction() {
            let mut cache = LriCache::new(2);
            cache.insert("a", 1);
            cache.insert("b", 2);
            cache.get(&"a");
            cache.insert("c", 3);
            assert!(!cache.contains(&"a"));
            cache.check_invariants().unwrap();
        }

        #[test]
        fn in_place_update_keeps_eviction_position() {
            let mut cache = LriCache::new(2);
            cache.insert("a", 1);
            cache.insert("b", 2);
            cache.insert("a", 10); // still the oldest insert
            cache.insert("c", 3);

            assert!(!cache.contains(&"a"));
            assert!(cache.contains(&"b"));
            assert!(cache.contains(&"c"));
            cache.check_invariants().unwrap();
        }

        #[test]
        fn capacity_bound_holds_under_churn() {
            let mut cache = LriCache::new(8);
            for i in 0..100u64 {
                cache.insert(i, i);
                assert!(cache.len() <= 8);
            }
            assert_eq!(cache.stats().eviction_count, 92);
            cache.check_invariants().unwrap();
        }
    }

    mod ordering {
        use super::*;

        #[test]
        fn pop_oldest_drains_in_insertion_order() {
            let mut cache = LriCache::new(4);
            cache.insert("a", 1);
            cache.insert("b", 2);
            cache.insert("c", 3);

            assert_eq!(cache.pop_oldest(), Some(("a", 1)));
            assert_eq!(cache.pop_oldest(), Some(("b", 2)));
            assert_eq!(cache.pop_oldest(), Some(("c", 3)));
            assert_eq!(cache.pop_oldest(), None);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn peek_oldest_and_age_rank() {
            let mut cache = LriCache::new(4);
            cache.insert("a", 1);
            cache.insert("b", 2);

            assert_eq!(cache.peek_oldest(), Some((&"a", &1)));
            assert_eq!(cache.age_rank(&"a"), Some(0));
            assert_eq!(cache.age_rank(&"b"), Some(1));
            assert_eq!(cache.age_rank(&"z"), None);
        }

        #[test]
        fn remove_preserves_remaining_order() {
            let mut cache = LriCache::new(4);
            cache.insert("a", 1);
            cache.insert("b", 2);
            cache.insert("c", 3);

            assert_eq!(cache.remove(&"b"), Some(2));
            assert_eq!(cache.remove(&"b"), None);
            assert_eq!(cache.pop_oldest(), Some(("a", 1)));
            assert_eq!(cache.pop_oldest(), Some(("c", 3)));
            cache.check_invariants().unwrap();
        }
    }

    mod stats_and_soft_miss {
        use super::*;

        #[test]
        fn hit_and_miss_counters() {
            let mut cache = LriCache::new(4);
            cache.insert("a", 1);
            cache.get(&"a");
            cache.get(&"a");
            cache.get(&"z");

            let stats = cache.stats();
            assert_eq!(stats.hit_count, 2);
            assert_eq!(stats.miss_count, 1);
            assert!((stats.hit_rate() - 2.0 / 3.0).abs() < 1e-9);
        }

        #[test]
        fn peek_records_nothing() {
            let mut cache = LriCache::new(4);
            cache.insert("a", 1);
            cache.peek(&"a");
            cache.peek(&"z");
            assert_eq!(cache.stats().lookups(), 0);
        }

        #[test]
        fn get_or_insert_with_computes_once_per_miss() {
            let mut cache = LriCache::new(4);
            let mut calls = 0;

            let v = *cache.get_or_insert_with("a", || {
                calls += 1;
                42
            });
            assert_eq!(v, 42);
            let v = *cache.get_or_insert_with("a", || {
                calls += 1;
                99
            });
            assert_eq!(v, 42);
            assert_eq!(calls, 1);

            let stats = cache.stats();
            assert_eq!(stats.hit_count, 1);
            assert_eq!(stats.miss_count, 1);
            assert_eq!(stats.soft_miss_count, 1);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn get_or_insert_with_evicts_when_full() {
            let mut cache = LriCache::new(1);
            cache.insert("a", 1);
            cache.get_or_insert_with("b", || 2);
            assert!(!cache.contains(&"a"));
            assert_eq!(cache.len(), 1);
            cache.check_invariants().unwrap();
        }
    }
}
