//! Unified cache builder for both eviction policies.
//!
//! Lets callers choose the policy at runtime while coding against one
//! concrete [`Cache`] type.
//!
//! ## Example
//!
//! ```
//! use mapkit::builder::{CacheBuilder, EvictionPolicy};
//!
//! let mut cache = CacheBuilder::new(100).build::<u64, String>(EvictionPolicy::Recency);
//! cache.insert(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some(&"hello".to_string()));
//! ```

use std::hash::Hash;

use crate::error::ConfigError;
use crate::metrics::CacheStats;
use crate::policy::lri::LriCache;
use crate::policy::lru::LruCache;

/// Available eviction policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionPolicy {
    /// Evict the least recently *inserted* entry (FIFO); reads do not
    /// protect entries.
    InsertionOrder,
    /// Evict the least recently *used* entry (LRU); hits promote.
    Recency,
}

/// Policy-erased cache front door built by [`CacheBuilder`].
#[derive(Debug)]
pub struct Cache<K, V>
where
    K: Eq + Hash + Clone,
{
    inner: CacheInner<K, V>,
}

#[derive(Debug)]
enum CacheInner<K, V>
where
    K: Eq + Hash + Clone,
{
    InsertionOrder(LriCache<K, V>),
    Recency(LruCache<K, V>),
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// The policy this cache was built with.
    pub fn policy(&self) -> EvictionPolicy {
        match &self.inner {
            CacheInner::InsertionOrder(_) => EvictionPolicy::InsertionOrder,
            CacheInner::Recency(_) => EvictionPolicy::Recency,
        }
    }

    /// Inserts a pair, returning the previous value for the key.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match &mut self.inner {
            CacheInner::InsertionOrder(lri) => lri.insert(key, value),
            CacheInner::Recency(lru) => lru.insert(key, value),
        }
    }

    /// Looks up a value with the policy's access side effects.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        match &mut self.inner {
            CacheInner::InsertionOrder(lri) => lri.get(key),
            CacheInner::Recency(lru) => lru.get(key),
        }
    }

    /// Looks up a value with no side effects on order or statistics.
    pub fn peek(&self, key: &K) -> Option<&V> {
        match &self.inner {
            CacheInner::InsertionOrder(lri) => lri.peek(key),
            CacheInner::Recency(lru) => lru.peek(key),
        }
    }

    /// Returns the resident value, or computes, inserts and returns one.
    pub fn get_or_insert_with<F>(&mut self, key: K, make: F) -> &V
    where
        F: FnOnce() -> V,
    {
        match &mut self.inner {
            CacheInner::InsertionOrder(lri) => lri.get_or_insert_with(key, make),
            CacheInner::Recency(lru) => lru.get_or_insert_with(key, make),
        }
    }

    /// Removes a key, returning its value if it was resident.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        match &mut self.inner {
            CacheInner::InsertionOrder(lri) => lri.remove(key),
            CacheInner::Recency(lru) => lru.remove(key),
        }
    }

    /// Returns `true` if the key is resident.
    pub fn contains(&self, key: &K) -> bool {
        match &self.inner {
            CacheInner::InsertionOrder(lri) => lri.contains(key),
            CacheInner::Recency(lru) => lru.contains(key),
        }
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        match &self.inner {
            CacheInner::InsertionOrder(lri) => lri.len(),
            CacheInner::Recency(lru) => lru.len(),
        }
    }

    /// Returns `true` if nothing is resident.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of resident entries.
    pub fn capacity(&self) -> usize {
        match &self.inner {
            CacheInner::InsertionOrder(lri) => lri.capacity(),
            CacheInner::Recency(lru) => lru.capacity(),
        }
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        match &mut self.inner {
            CacheInner::InsertionOrder(lri) => lri.clear(),
            CacheInner::Recency(lru) => lru.clear(),
        }
    }

    /// Snapshot of the hit/miss/eviction counters.
    pub fn stats(&self) -> CacheStats {
        match &self.inner {
            CacheInner::InsertionOrder(lri) => lri.stats(),
            CacheInner::Recency(lru) => lru.stats(),
        }
    }
}

/// Builder for creating cache instances.
pub struct CacheBuilder {
    capacity: usize,
}

impl CacheBuilder {
    /// Creates a builder for caches of the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Builds a cache with the chosen policy.
    ///
    /// Returns a [`ConfigError`] if the configured capacity is zero.
    pub fn try_build<K, V>(self, policy: EvictionPolicy) -> Result<Cache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
    {
        let inner = match policy {
            EvictionPolicy::InsertionOrder => {
                CacheInner::InsertionOrder(LriCache::try_new(self.capacity)?)
            }
            EvictionPolicy::Recency => CacheInner::Recency(LruCache::try_new(self.capacity)?),
        };
        Ok(Cache { inner })
    }

    /// Builds a cache with the chosen policy.
    ///
    /// # Panics
    ///
    /// Panics if the configured capacity is zero. Use
    /// [`try_build`](Self::try_build) to handle that case without panicking.
    pub fn build<K, V>(self, policy: EvictionPolicy) -> Cache<K, V>
    where
        K: Eq + Hash + Clone,
    {
        match self.try_build(policy) {
            Ok(cache) => cache,
            Err(err) => panic!("{err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_policies_basic_ops() {
        for policy in [EvictionPolicy::InsertionOrder, EvictionPolicy::Recency] {
            let mut cache = CacheBuilder::new(10).build::<u64, String>(policy);
            assert_eq!(cache.policy(), policy);

            assert_eq!(cache.insert(1, "one".to_string()), None);
            assert_eq!(cache.insert(2, "two".to_string()), None);

            assert_eq!(cache.get(&1), Some(&"one".to_string()));
            assert_eq!(cache.get(&3), None);

            assert!(cache.contains(&1));
            assert!(!cache.contains(&99));
            assert_eq!(cache.len(), 2);
            assert_eq!(cache.capacity(), 10);

            assert_eq!(cache.insert(1, "ONE".to_string()), Some("one".to_string()));
            assert_eq!(cache.peek(&1), Some(&"ONE".to_string()));
            assert_eq!(cache.remove(&2), Some("two".to_string()));

            assert_eq!(cache.stats().hit_count, 1);
            assert_eq!(cache.stats().miss_count, 1);

            cache.clear();
            assert!(cache.is_empty());
        }
    }

    #[test]
    fn policies_diverge_on_access_pattern() {
        for (policy, survivor) in [
            (EvictionPolicy::InsertionOrder, 2u64),
            (EvictionPolicy::Recency, 1u64),
        ] {
            let mut cache = CacheBuilder::new(2).build::<u64, u64>(policy);
            cache.insert(1, 10);
            cache.insert(2, 20);
            cache.get(&1); // protects key 1 only under Recency
            cache.insert(3, 30);

            assert!(cache.contains(&survivor), "policy {policy:?}");
            assert_eq!(cache.len(), 2);
        }
    }

    #[test]
    fn try_build_rejects_zero_capacity() {
        let err = CacheBuilder::new(0)
            .try_build::<u64, u64>(EvictionPolicy::Recency)
            .unwrap_err();
        assert!(err.to_string().contains("capacity"));
    }

    #[test]
    fn get_or_insert_with_dispatches() {
        let mut cache = CacheBuilder::new(4).build::<u64, u64>(EvictionPolicy::InsertionOrder);
        assert_eq!(*cache.get_or_insert_with(7, || 70), 70);
        assert_eq!(*cache.get_or_insert_with(7, || 0), 70);
        assert_eq!(cache.stats().soft_miss_count, 1);
    }
}
