//! # Cache Trait Hierarchy
//!
//! This module defines the trait hierarchy shared by the bounded cache
//! policies, so callers can be written against an interface rather than a
//! concrete cache type.
//!
//! ## Architecture
//!
//! ```text
//!                 ┌─────────────────────────────────────────┐
//!                 │            CoreCache<K, V>              │
//!                 │                                         │
//!                 │  insert(&mut, K, V) → Option<V>         │
//!                 │  get(&mut, &K) → Option<&V>             │
//!                 │  contains(&, &K) → bool                 │
//!                 │  len(&) → usize                         │
//!                 │  is_empty(&) → bool                     │
//!                 │  capacity(&) → usize                    │
//!                 │  clear(&mut)                            │
//!                 └──────────────────┬──────────────────────┘
//!                                    │
//!                                    ▼
//!                 ┌─────────────────────────────────────────┐
//!                 │           MutableCache<K, V>            │
//!                 │                                         │
//!                 │  remove(&mut, &K) → Option<V>           │
//!                 └──────────────────┬──────────────────────┘
//!                ┌───────────────────┴───────────────────┐
//!                ▼                                       ▼
//!   ┌────────────────────────────┐         ┌────────────────────────────┐
//!   │ InsertionOrderCache<K, V>  │         │    RecencyCache<K, V>      │
//!   │                            │         │                            │
//!   │  pop_oldest() → (K, V)     │         │  pop_lru() → (K, V)        │
//!   │  peek_oldest() → (&K, &V)  │         │  peek_lru() → (&K, &V)     │
//!   │  age_rank(&K) → usize      │         │  touch(&K) → bool          │
//!   │                            │         │  recency_rank(&K) → usize  │
//!   └────────────────────────────┘         └────────────────────────────┘
//! ```
//!
//! ## Trait Summary
//!
//! | Trait                 | Extends        | Purpose                           |
//! |-----------------------|----------------|-----------------------------------|
//! | `CoreCache`           | -              | Universal cache operations        |
//! | `MutableCache`        | `CoreCache`    | Adds arbitrary key removal        |
//! | `InsertionOrderCache` | `MutableCache` | Age-ordered eviction (FIFO)       |
//! | `RecencyCache`        | `MutableCache` | Recency-ordered eviction (LRU)    |
//!
//! Both policies sit on the same arena-backed linked list, which unlinks any
//! cell in O(1), so arbitrary removal is cheap for the insertion-order policy
//! too; removal never reorders the surviving cells.
//!
//! ## Policy Comparison
//!
//! | Policy | Eviction basis  | `get` side effect       | Repeat `insert`           |
//! |--------|-----------------|-------------------------|---------------------------|
//! | LRI    | Insertion order | None                    | In-place, position pinned |
//! | LRU    | Last access     | Promotes to most-recent | Updates and promotes      |

use std::hash::Hash;

/// Universal operations every bounded cache supports.
pub trait CoreCache<K, V>
where
    K: Eq + Hash,
{
    /// Inserts a key-value pair, returning the previous value for the key.
    ///
    /// When the cache is at capacity and `key` is new, the policy's victim is
    /// evicted first, so the cache never exceeds its capacity.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Looks up a value. Takes `&mut self` because policies may update
    /// internal ordering and statistics on access.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Returns `true` if the key is resident, without touching order.
    fn contains(&self, key: &K) -> bool;

    /// Number of resident entries.
    fn len(&self) -> usize;

    /// Returns `true` if no entries are resident.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of resident entries.
    fn capacity(&self) -> usize;

    /// Removes every entry.
    fn clear(&mut self);
}

/// Caches that support removing an arbitrary key.
pub trait MutableCache<K, V>: CoreCache<K, V>
where
    K: Eq + Hash,
{
    /// Removes a key, returning its value if it was resident.
    fn remove(&mut self, key: &K) -> Option<V>;
}

/// Insertion-order (FIFO) caches: the eviction victim is the least recently
/// *inserted* entry, and reads never change the order.
pub trait InsertionOrderCache<K, V>: MutableCache<K, V>
where
    K: Eq + Hash,
{
    /// Removes and returns the oldest entry.
    fn pop_oldest(&mut self) -> Option<(K, V)>;

    /// Returns the oldest entry without removing it.
    fn peek_oldest(&self) -> Option<(&K, &V)>;

    /// Position of `key` in eviction order: 0 is the next victim. O(n).
    fn age_rank(&self, key: &K) -> Option<usize>;
}

/// Recency (LRU) caches: the eviction victim is the least recently *used*
/// entry, and hits promote.
pub trait RecencyCache<K, V>: MutableCache<K, V>
where
    K: Eq + Hash,
{
    /// Removes and returns the least recently used entry.
    fn pop_lru(&mut self) -> Option<(K, V)>;

    /// Returns the least recently used entry without promoting it.
    fn peek_lru(&self) -> Option<(&K, &V)>;

    /// Marks a key as most recently used without reading its value.
    /// Returns `false` if the key is not resident.
    fn touch(&mut self, key: &K) -> bool;

    /// Position of `key` in eviction order: 0 is the next victim. O(n).
    fn recency_rank(&self, key: &K) -> Option<usize>;
}
