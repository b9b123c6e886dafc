//! Insertion-ordered multi-valued mapping.
//!
//! [`OrderedMultiMap`] keeps every `(key, value)` pair ever added, in one
//! global insertion order, while still answering single-key lookups in O(1).
//! It is the "ordered dict that remembers duplicates" shape: useful for HTTP
//! headers, query strings, config layering, and anywhere else the order and
//! multiplicity of pairs carry meaning.
//!
//! ## Architecture
//!
//! Two structures share ownership of the pairs:
//!
//! ```text
//!   index: FxHashMap<K, Vec<CellId>>     order: CellList<(K, V)>
//!   ┌──────┬──────────────────┐          head ─► (a, 1) ◄──► (b, 2)
//!   │ "a"  │ [id_0, id_2]     │                     ▲            ▲
//!   │ "b"  │ [id_1]           │                     │            │
//!   └──────┴──────────────────┘          ◄──► (a, 3) ◄── tail    │
//!            per-key ids, oldest first
//! ```
//!
//! - `order` is an arena-backed doubly linked list holding every live pair in
//!   global insertion order (see [`CellList`]).
//! - `index` maps each key to the ids of its cells, oldest first. A key is
//!   present in the index iff it has at least one live cell.
//!
//! Because the per-key id vectors and the global list are both append-at-end,
//! a key's newest cell is simultaneously the last id in its vector, and the
//! relative order of any key's cells always matches their order in the list.
//!
//! ## Semantics
//!
//! | Operation        | Behavior                                                 |
//! |------------------|----------------------------------------------------------|
//! | `add(k, v)`      | Append a new cell; never disturbs existing cells         |
//! | `get(&k)`        | **First** (oldest) live value for `k`                    |
//! | `set(k, v)`      | Remove all of `k`'s cells, then append one (last wins)   |
//! | `pop(&k)`        | Remove all of `k`'s cells, return the oldest value       |
//! | `pop_last(&k)`   | Remove only `k`'s newest cell                            |
//! | `pop_newest()`   | Remove the globally newest cell, any key                 |
//! | `iter()`         | All cells, global insertion order, double-ended          |
//! | `iter_unique()`  | First cell per key, in first-seen order                  |
//! | `update(pairs)`  | Per batch: overwrite on a key's first touch, add after   |
//!
//! Absent keys never panic: lookups return `None` and removals report nothing
//! removed.
//!
//! ## Performance
//!
//! - `add` / `get` / `pop_last` / `pop_newest`: O(1)
//! - `set` / `pop` / `pop_all` / `remove`: O(cells for that key)
//! - `len()` counts cells, `key_count()` counts distinct keys, both O(1)
//!
//! ## Examples
//!
//! ```
//! use mapkit::OrderedMultiMap;
//!
//! let mut omd = OrderedMultiMap::new();
//! omd.add("a", 1);
//! omd.add("b", 2);
//! omd.add("a", 3);
//!
//! assert_eq!(omd.get(&"a"), Some(&1)); // oldest value wins on read
//! assert_eq!(omd.len(), 3);
//!
//! omd.set("a", 9); // collapse "a" to a single newest pair
//! let pairs: Vec<_> = omd.iter().map(|(k, v)| (*k, *v)).collect();
//! assert_eq!(pairs, [("b", 2), ("a", 9)]);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash};

use rustc_hash::{FxHashMap, FxHashSet};

use crate::ds::cell_list::{self, CellId, CellList};
#[cfg(any(test, debug_assertions))]
use crate::error::InvariantError;

/// Insertion-ordered mapping that keeps every pair added for a key.
///
/// See the [module docs](self) for the data layout and the read/write
/// semantics table.
#[derive(Clone)]
pub struct OrderedMultiMap<K, V> {
    index: FxHashMap<K, Vec<CellId>>,
    order: CellList<(K, V)>,
}

impl<K, V> OrderedMultiMap<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty map.
    pub fn new() -> Self {
        Self {
            index: FxHashMap::default(),
            order: CellList::new(),
        }
    }

    /// Creates an empty map with room for `capacity` cells.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut index = FxHashMap::default();
        index.reserve(capacity);
        Self {
            index,
            order: CellList::with_capacity(capacity),
        }
    }

    /// Returns the number of live cells (pairs), counting duplicates.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns the number of distinct keys.
    pub fn key_count(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if the map holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns `true` if `key` has at least one live cell.
    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Appends a new `(key, value)` cell.
    ///
    /// Existing cells for `key` are untouched; the new cell becomes both the
    /// globally newest pair and the newest value for `key`.
    pub fn add(&mut self, key: K, value: V) {
        let id = self.order.push_back((key.clone(), value));
        self.index.entry(key).or_default().push(id);
    }

    /// Appends one cell per value, in iteration order.
    ///
    /// An empty iterator is a no-op and does not register `key`.
    pub fn add_all<I>(&mut self, key: K, values: I)
    where
        I: IntoIterator<Item = V>,
    {
        for value in values {
            self.add(key.clone(), value);
        }
    }

    /// Returns the **first** (oldest) live value for `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        let ids = self.index.get(key)?;
        let &id = ids.first()?;
        self.order.get(id).map(|(_, v)| v)
    }

    /// Returns the newest live value for `key`.
    pub fn get_last(&self, key: &K) -> Option<&V> {
        let ids = self.index.get(key)?;
        let &id = ids.last()?;
        self.order.get(id).map(|(_, v)| v)
    }

    /// Returns copies of all values for `key`, oldest first.
    ///
    /// An absent key yields an empty vector.
    pub fn get_all(&self, key: &K) -> Vec<V>
    where
        V: Clone,
    {
        match self.index.get(key) {
            Some(ids) => ids
                .iter()
                .filter_map(|&id| self.order.get(id))
                .map(|(_, v)| v.clone())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Returns the first live value for `key`, adding `default` as a new
    /// cell first if the key is absent.
    ///
    /// Existing keys are read-only here: `default` is dropped and no cell
    /// moves.
    pub fn get_or_add(&mut self, key: K, default: V) -> &V {
        let id = match self.index.get(&key).and_then(|ids| ids.first()).copied() {
            Some(id) => id,
            None => {
                let id = self.order.push_back((key.clone(), default));
                self.index.entry(key).or_default().push(id);
                id
            }
        };
        match self.order.get(id) {
            Some((_, v)) => v,
            // The id was either just validated against the index or just
            // allocated.
            None => unreachable!("indexed cell is always live"),
        }
    }

    /// Replaces all of `key`'s cells with a single new one at the end.
    ///
    /// This is the last-wins write: after `set`, `key` has exactly one value
    /// and its position is the global tail.
    pub fn set(&mut self, key: K, value: V) {
        self.take_key_cells(&key);
        self.add(key, value);
    }

    /// Replaces all of `key`'s cells with one cell per value, appended in
    /// iteration order.
    ///
    /// An empty iterator removes `key` entirely.
    pub fn set_all<I>(&mut self, key: K, values: I)
    where
        I: IntoIterator<Item = V>,
    {
        self.take_key_cells(&key);
        self.add_all(key, values);
    }

    /// Removes all of `key`'s cells and returns the **oldest** value.
    pub fn pop(&mut self, key: &K) -> Option<V> {
        self.take_key_cells(key)?.into_iter().next()
    }

    /// Removes all of `key`'s cells and returns the values, oldest first.
    pub fn pop_all(&mut self, key: &K) -> Option<Vec<V>> {
        self.take_key_cells(key)
    }

    /// Removes only `key`'s newest cell and returns its value.
    ///
    /// Older cells for `key` stay in place.
    pub fn pop_last(&mut self, key: &K) -> Option<V> {
        let ids = self.index.get_mut(key)?;
        let id = ids.pop()?;
        if ids.is_empty() {
            self.index.remove(key);
        }
        self.order.remove(id).map(|(_, v)| v)
    }

    /// Removes the globally newest cell, whatever its key.
    pub fn pop_newest(&mut self) -> Option<(K, V)> {
        let id = self.order.back_id()?;
        let (key, value) = self.order.remove(id)?;
        // The global tail is also the newest cell for its own key, so it is
        // the last id in that key's vector.
        if let Some(ids) = self.index.get_mut(&key) {
            ids.pop();
            if ids.is_empty() {
                self.index.remove(&key);
            }
        }
        Some((key, value))
    }

    /// Removes all of `key`'s cells; returns whether anything was removed.
    pub fn remove(&mut self, key: &K) -> bool {
        self.take_key_cells(key).is_some()
    }

    /// Removes every pair.
    pub fn clear(&mut self) {
        self.index.clear();
        self.order.clear();
    }

    /// Iterates over all cells in global insertion order.
    ///
    /// The iterator is double-ended; `rev()` yields the exact reverse.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.order.iter(),
        }
    }

    /// Iterates over the first cell of each key, in first-seen order.
    pub fn iter_unique(&self) -> UniqueIter<'_, K, V> {
        UniqueIter {
            inner: self.order.iter(),
            seen: FxHashSet::default(),
        }
    }

    /// Iterates over the key of every cell, duplicates included.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> {
        self.iter().map(|(k, _)| k)
    }

    /// Iterates over distinct keys in first-seen order.
    pub fn keys_unique(&self) -> impl Iterator<Item = &K> {
        self.iter_unique().map(|(k, _)| k)
    }

    /// Iterates over the value of every cell in global order.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    /// Iterates over the first value of each key, in first-seen order.
    pub fn values_unique(&self) -> impl Iterator<Item = &V> {
        self.iter_unique().map(|(_, v)| v)
    }

    /// Merges `pairs` with overwrite-then-accumulate semantics.
    ///
    /// The first time a key appears in this batch its existing cells are
    /// replaced (as [`set`](Self::set)); every later appearance in the same
    /// batch appends (as [`add`](Self::add)). Feeding a map's own pairs back
    /// through `update` therefore reproduces it.
    pub fn update<I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut touched: FxHashSet<K> = FxHashSet::default();
        for (key, value) in pairs {
            if touched.insert(key.clone()) {
                self.set(key, value);
            } else {
                self.add(key, value);
            }
        }
    }

    /// Returns a new map with keys and values swapped, preserving global
    /// order.
    ///
    /// Duplicate values in `self` become duplicate keys in the result, so no
    /// pairs are lost and `inverted().inverted()` round-trips.
    pub fn inverted(&self) -> OrderedMultiMap<V, K>
    where
        V: Eq + Hash + Clone,
        K: Clone,
    {
        let mut out = OrderedMultiMap::with_capacity(self.len());
        for (k, v) in self.iter() {
            out.add(v.clone(), k.clone());
        }
        out
    }

    /// Returns a map from each key to its number of cells, in first-seen
    /// order.
    pub fn counts(&self) -> OrderedMultiMap<K, usize> {
        let mut out = OrderedMultiMap::with_capacity(self.key_count());
        for key in self.keys_unique() {
            let count = self.index.get(key).map(|ids| ids.len()).unwrap_or(0);
            out.add(key.clone(), count);
        }
        out
    }

    /// Flattens to a plain map using the **first** value per key.
    pub fn to_map(&self) -> FxHashMap<K, V>
    where
        V: Clone,
    {
        let mut out = FxHashMap::default();
        out.reserve(self.key_count());
        for (k, v) in self.iter_unique() {
            out.insert(k.clone(), v.clone());
        }
        out
    }

    /// Flattens to a plain map from each key to all of its values, oldest
    /// first.
    pub fn to_multi_map(&self) -> FxHashMap<K, Vec<V>>
    where
        V: Clone,
    {
        let mut out = FxHashMap::default();
        out.reserve(self.key_count());
        for key in self.keys_unique() {
            out.insert(key.clone(), self.get_all(key));
        }
        out
    }

    /// Unlinks every cell for `key` and returns the values, oldest first.
    /// `None` if the key was absent.
    fn take_key_cells(&mut self, key: &K) -> Option<Vec<V>> {
        let ids = self.index.remove(key)?;
        let values = ids
            .into_iter()
            .filter_map(|id| self.order.remove(id))
            .map(|(_, v)| v)
            .collect();
        Some(values)
    }

    /// Validates index/list consistency.
    ///
    /// Checks that every indexed id names a live cell carrying the same key,
    /// that each key's ids appear in increasing list position (oldest first),
    /// that no index entry is empty, and that the cell counts agree.
    #[cfg(any(test, debug_assertions))]
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.order.debug_validate_invariants();

        let mut positions: FxHashMap<CellId, usize> = FxHashMap::default();
        for (pos, (id, _)) in self.order.iter_entries().enumerate() {
            positions.insert(id, pos);
        }

        let mut indexed = 0usize;
        for (key, ids) in &self.index {
            if ids.is_empty() {
                return Err(InvariantError::new("index entry with no cells"));
            }
            let mut last_pos: Option<usize> = None;
            for &id in ids {
                let (cell_key, _) = self
                    .order
                    .get(id)
                    .ok_or_else(|| InvariantError::new("indexed id names a dead cell"))?;
                if cell_key != key {
                    return Err(InvariantError::new("indexed id belongs to another key"));
                }
                let pos = positions
                    .get(&id)
                    .copied()
                    .ok_or_else(|| InvariantError::new("indexed id not reachable in list"))?;
                if let Some(last) = last_pos {
                    if pos <= last {
                        return Err(InvariantError::new(
                            "per-key ids out of global insertion order",
                        ));
                    }
                }
                last_pos = Some(pos);
                indexed += 1;
            }
        }

        if indexed != self.order.len() {
            return Err(InvariantError::new(format!(
                "index covers {} cells but list holds {}",
                indexed,
                self.order.len()
            )));
        }

        Ok(())
    }
}

impl<K, V> Default for OrderedMultiMap<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for OrderedMultiMap<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OrderedMultiMap(")?;
        f.debug_list().entries(self.iter()).finish()?;
        f.write_str(")")
    }
}

impl<K, V> PartialEq for OrderedMultiMap<K, V>
where
    K: Eq + Hash + Clone,
    V: PartialEq,
{
    /// Two maps are equal iff their full pair sequences match, order and
    /// duplicates included.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|((ka, va), (kb, vb))| ka == kb && va == vb)
    }
}

impl<K, V, S> PartialEq<HashMap<K, V, S>> for OrderedMultiMap<K, V>
where
    K: Eq + Hash + Clone,
    V: PartialEq,
    S: BuildHasher,
{
    /// Compares the canonical first-value-per-key view against a flat map.
    fn eq(&self, other: &HashMap<K, V, S>) -> bool {
        self.key_count() == other.len()
            && self
                .iter_unique()
                .all(|(k, v)| other.get(k).map_or(false, |ov| ov == v))
    }
}

impl<K, V> FromIterator<(K, V)> for OrderedMultiMap<K, V>
where
    K: Eq + Hash + Clone,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut omd = Self::new();
        omd.extend(iter);
        omd
    }
}

impl<K, V> Extend<(K, V)> for OrderedMultiMap<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Appends every pair; the non-destructive merge.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.add(key, value);
        }
    }
}

impl<K, V, S> From<HashMap<K, V, S>> for OrderedMultiMap<K, V>
where
    K: Eq + Hash + Clone,
{
    fn from(map: HashMap<K, V, S>) -> Self {
        map.into_iter().collect()
    }
}

impl<'a, K, V> IntoIterator for &'a OrderedMultiMap<K, V>
where
    K: Eq + Hash + Clone,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> IntoIterator for OrderedMultiMap<K, V>
where
    K: Eq + Hash + Clone,
{
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { order: self.order }
    }
}

/// Double-ended iterator over `(&K, &V)` pairs in global insertion order.
pub struct Iter<'a, K, V> {
    inner: cell_list::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, v)| (k, v))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Iterator over the first `(&K, &V)` pair per key, in first-seen order.
pub struct UniqueIter<'a, K, V> {
    inner: cell_list::Iter<'a, (K, V)>,
    seen: FxHashSet<&'a K>,
}

impl<'a, K, V> Iterator for UniqueIter<'a, K, V>
where
    K: Eq + Hash,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        for (k, v) in self.inner.by_ref() {
            if self.seen.insert(k) {
                return Some((k, v));
            }
        }
        None
    }
}

/// Owning iterator over `(K, V)` pairs in global insertion order.
pub struct IntoIter<K, V> {
    order: CellList<(K, V)>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.order.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.order.len(), Some(self.order.len()))
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.order.pop_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
