//! Arena-backed doubly linked list of cells.
//!
//! Cells live in a growable slot arena (`Vec<Option<Cell<T>>>` plus a free
//! list) and are linked by `CellId` rather than by pointer, giving stable
//! handles and O(1) unlink/relink without any unsafe code.
//!
//! ## Architecture
//!
//! ```text
//!   arena (slots)
//!   ┌────────┬─────────────────────────────────────────────┐
//!   │ CellId │ Cell { value, prev, next }                  │
//!   ├────────┼─────────────────────────────────────────────┤
//!   │ id_0   │ { value: A, prev: None, next: Some(id_1) }  │
//!   │ id_1   │ { value: B, prev: Some(id_0), next: id_2 }  │
//!   │ id_2   │ { value: C, prev: Some(id_1), next: None }  │
//!   └────────┴─────────────────────────────────────────────┘
//!
//!   head ─► [id_0] ◄──► [id_1] ◄──► [id_2] ◄── tail
//! ```
//!
//! This is the single low-level structure shared by the ordered multi-map
//! (global insertion order) and the bounded caches (eviction queue). Freed
//! slots are recycled through the free list, so long-lived containers do not
//! grow without bound under churn.
//!
//! ## Performance
//! - `push_front` / `push_back`: O(1)
//! - `pop_front` / `pop_back` / `remove(id)`: O(1)
//! - `move_to_back(id)`: O(1)
//! - `iter`: O(n), walkable from either end
//!
//! `debug_validate_invariants()` is available in debug/test builds.

/// Stable handle for a cell in a [`CellList`].
///
/// A `CellId` stays valid until the cell it names is removed. After removal
/// the slot may be recycled for a new cell, so holding an id across a removal
/// of that same cell is a logic error the owning container must prevent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellId(usize);

impl CellId {
    /// Returns the raw slot index backing this id.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Cell<T> {
    value: T,
    prev: Option<CellId>,
    next: Option<CellId>,
}

/// Doubly linked list whose cells are stored in an internal slot arena and
/// addressed by [`CellId`].
#[derive(Debug, Clone)]
pub struct CellList<T> {
    slots: Vec<Option<Cell<T>>>,
    free: Vec<usize>,
    len: usize,
    head: Option<CellId>,
    tail: Option<CellId>,
}

impl<T> CellList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
            head: None,
            tail: None,
        }
    }

    /// Creates an empty list with reserved cell capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
            head: None,
            tail: None,
        }
    }

    /// Returns the number of live cells.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list holds no cells.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if `id` names a live cell in this list.
    pub fn contains(&self, id: CellId) -> bool {
        self.slots
            .get(id.0)
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    /// Returns the value at the head of the list.
    pub fn front(&self) -> Option<&T> {
        self.head.and_then(|id| self.get(id))
    }

    /// Returns the id of the head cell.
    pub fn front_id(&self) -> Option<CellId> {
        self.head
    }

    /// Returns the value at the tail of the list.
    pub fn back(&self) -> Option<&T> {
        self.tail.and_then(|id| self.get(id))
    }

    /// Returns the id of the tail cell.
    pub fn back_id(&self) -> Option<CellId> {
        self.tail
    }

    /// Returns the value for a cell id, if present.
    pub fn get(&self, id: CellId) -> Option<&T> {
        self.slots
            .get(id.0)
            .and_then(|slot| slot.as_ref())
            .map(|cell| &cell.value)
    }

    /// Returns a mutable reference to a cell value, if present.
    pub fn get_mut(&mut self, id: CellId) -> Option<&mut T> {
        self.slots
            .get_mut(id.0)
            .and_then(|slot| slot.as_mut())
            .map(|cell| &mut cell.value)
    }

    /// Inserts a new cell at the head and returns its id.
    pub fn push_front(&mut self, value: T) -> CellId {
        let id = self.alloc(Cell {
            value,
            prev: None,
            next: self.head,
        });
        if let Some(head) = self.head {
            if let Some(cell) = self.cell_mut(head) {
                cell.prev = Some(id);
            }
        } else {
            self.tail = Some(id);
        }
        self.head = Some(id);
        id
    }

    /// Inserts a new cell at the tail and returns its id.
    pub fn push_back(&mut self, value: T) -> CellId {
        let id = self.alloc(Cell {
            value,
            prev: self.tail,
            next: None,
        });
        if let Some(tail) = self.tail {
            if let Some(cell) = self.cell_mut(tail) {
                cell.next = Some(id);
            }
        } else {
            self.head = Some(id);
        }
        self.tail = Some(id);
        id
    }

    /// Removes and returns the head value.
    pub fn pop_front(&mut self) -> Option<T> {
        let id = self.head?;
        self.remove(id)
    }

    /// Removes and returns the tail value.
    pub fn pop_back(&mut self) -> Option<T> {
        let id = self.tail?;
        self.remove(id)
    }

    /// Unlinks cell `id` from the list, frees its slot, and returns its value.
    pub fn remove(&mut self, id: CellId) -> Option<T> {
        self.detach(id)?;
        let slot = self.slots.get_mut(id.0)?;
        let cell = slot.take()?;
        self.free.push(id.0);
        self.len -= 1;
        Some(cell.value)
    }

    /// Moves an existing cell to the tail; returns `false` if `id` is not present.
    pub fn move_to_back(&mut self, id: CellId) -> bool {
        if !self.contains(id) {
            return false;
        }
        if Some(id) == self.tail {
            return true;
        }
        self.detach(id);
        self.attach_back(id);
        true
    }

    /// Clears the list and frees all cells.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.len = 0;
        self.head = None;
        self.tail = None;
    }

    /// Returns an iterator over values from head to tail.
    ///
    /// The iterator is double-ended; `rev()` walks tail to head.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }

    /// Returns an iterator over `(CellId, &T)` from head to tail.
    pub fn iter_entries(&self) -> EntryIter<'_, T> {
        EntryIter {
            list: self,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }

    fn alloc(&mut self, cell: Cell<T>) -> CellId {
        let idx = if let Some(idx) = self.free.pop() {
            self.slots[idx] = Some(cell);
            idx
        } else {
            self.slots.push(Some(cell));
            self.slots.len() - 1
        };
        self.len += 1;
        CellId(idx)
    }

    fn cell(&self, id: CellId) -> Option<&Cell<T>> {
        self.slots.get(id.0).and_then(|slot| slot.as_ref())
    }

    fn cell_mut(&mut self, id: CellId) -> Option<&mut Cell<T>> {
        self.slots.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    fn detach(&mut self, id: CellId) -> Option<()> {
        let (prev, next) = {
            let cell = self.cell(id)?;
            (cell.prev, cell.next)
        };

        if let Some(prev_id) = prev {
            if let Some(prev_cell) = self.cell_mut(prev_id) {
                prev_cell.next = next;
            }
        } else {
            self.head = next;
        }

        if let Some(next_id) = next {
            if let Some(next_cell) = self.cell_mut(next_id) {
                next_cell.prev = prev;
            }
        } else {
            self.tail = prev;
        }

        if let Some(cell) = self.cell_mut(id) {
            cell.prev = None;
            cell.next = None;
        }

        Some(())
    }

    fn attach_back(&mut self, id: CellId) -> Option<()> {
        let old_tail = self.tail;
        if let Some(cell) = self.cell_mut(id) {
            cell.next = None;
            cell.prev = old_tail;
        } else {
            return None;
        }
        if let Some(old_tail) = old_tail {
            if let Some(tail_cell) = self.cell_mut(old_tail) {
                tail_cell.next = Some(id);
            }
        } else {
            self.head = Some(id);
        }
        self.tail = Some(id);
        Some(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if self.head.is_none() || self.tail.is_none() {
            assert!(self.head.is_none());
            assert!(self.tail.is_none());
            assert_eq!(self.len, 0);
            return;
        }

        let mut seen = std::collections::HashSet::new();
        let mut count = 0usize;
        let mut current = self.head;
        let mut prev = None;

        while let Some(id) = current {
            assert!(seen.insert(id), "cycle detected at {:?}", id);
            let cell = self.cell(id).expect("linked cell missing from arena");
            assert_eq!(cell.prev, prev);
            if cell.next.is_none() {
                assert_eq!(self.tail, Some(id));
            }

            prev = Some(id);
            current = cell.next;
            count += 1;
            assert!(count <= self.len);
        }

        assert_eq!(count, self.len);
    }
}

impl<T> Default for CellList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Double-ended iterator over cell values.
pub struct Iter<'a, T> {
    list: &'a CellList<T>,
    front: Option<CellId>,
    back: Option<CellId>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.front?;
        let cell = self.list.cell(id)?;
        self.front = cell.next;
        self.remaining -= 1;
        Some(&cell.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.back?;
        let cell = self.list.cell(id)?;
        self.back = cell.prev;
        self.remaining -= 1;
        Some(&cell.value)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// Double-ended iterator over `(CellId, &T)` pairs.
pub struct EntryIter<'a, T> {
    list: &'a CellList<T>,
    front: Option<CellId>,
    back: Option<CellId>,
    remaining: usize,
}

impl<'a, T> Iterator for EntryIter<'a, T> {
    type Item = (CellId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.front?;
        let cell = self.list.cell(id)?;
        self.front = cell.next;
        self.remaining -= 1;
        Some((id, &cell.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for EntryIter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.back?;
        let cell = self.list.cell(id)?;
        self.back = cell.prev;
        self.remaining -= 1;
        Some((id, &cell.value))
    }
}

impl<T> ExactSizeIterator for EntryIter<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_back_preserves_order() {
        let mut list = CellList::new();
        list.push_back("a");
        list.push_back("b");
        list.push_back("c");

        let values: Vec<_> = list.iter().copied().collect();
        assert_eq!(values, ["a", "b", "c"]);
        assert_eq!(list.front(), Some(&"a"));
        assert_eq!(list.back(), Some(&"c"));
        list.debug_validate_invariants();
    }

    #[test]
    fn push_front_reverses_insertion() {
        let mut list = CellList::new();
        list.push_front(1);
        list.push_front(2);
        list.push_front(3);

        let values: Vec<_> = list.iter().copied().collect();
        assert_eq!(values, [3, 2, 1]);
        list.debug_validate_invariants();
    }

    #[test]
    fn remove_middle_relinks_neighbors() {
        let mut list = CellList::new();
        let a = list.push_back("a");
        let b = list.push_back("b");
        let c = list.push_back("c");

        assert_eq!(list.remove(b), Some("b"));
        assert_eq!(list.len(), 2);
        assert!(list.contains(a));
        assert!(!list.contains(b));
        assert!(list.contains(c));

        let values: Vec<_> = list.iter().copied().collect();
        assert_eq!(values, ["a", "c"]);
        list.debug_validate_invariants();
    }

    #[test]
    fn remove_head_and_tail_update_endpoints() {
        let mut list = CellList::new();
        let a = list.push_back(1);
        list.push_back(2);
        let c = list.push_back(3);

        list.remove(a);
        assert_eq!(list.front(), Some(&2));
        list.remove(c);
        assert_eq!(list.back(), Some(&2));
        assert_eq!(list.len(), 1);
        list.debug_validate_invariants();
    }

    #[test]
    fn slots_are_recycled_after_removal() {
        let mut list = CellList::new();
        let a = list.push_back("a");
        list.push_back("b");

        list.remove(a);
        let c = list.push_back("c");
        assert_eq!(a.index(), c.index());
        assert_eq!(list.get(c), Some(&"c"));
        list.debug_validate_invariants();
    }

    #[test]
    fn move_to_back_reorders() {
        let mut list = CellList::new();
        let a = list.push_back("a");
        list.push_back("b");
        list.push_back("c");

        assert!(list.move_to_back(a));
        let values: Vec<_> = list.iter().copied().collect();
        assert_eq!(values, ["b", "c", "a"]);

        // Moving the tail is a no-op.
        assert!(list.move_to_back(a));
        let values: Vec<_> = list.iter().copied().collect();
        assert_eq!(values, ["b", "c", "a"]);
        list.debug_validate_invariants();
    }

    #[test]
    fn move_to_back_of_absent_id_is_rejected() {
        let mut list = CellList::new();
        let a = list.push_back(1);
        list.remove(a);
        assert!(!list.move_to_back(a));
    }

    #[test]
    fn pop_front_and_back_drain_in_order() {
        let mut list = CellList::new();
        for i in 0..4 {
            list.push_back(i);
        }

        assert_eq!(list.pop_front(), Some(0));
        assert_eq!(list.pop_back(), Some(3));
        assert_eq!(list.pop_front(), Some(1));
        assert_eq!(list.pop_back(), Some(2));
        assert_eq!(list.pop_front(), None);
        assert!(list.is_empty());
        list.debug_validate_invariants();
    }

    #[test]
    fn iter_is_double_ended() {
        let mut list = CellList::new();
        for i in 0..5 {
            list.push_back(i);
        }

        let forward: Vec<_> = list.iter().copied().collect();
        let backward: Vec<_> = list.iter().rev().copied().collect();
        let mut expected = forward.clone();
        expected.reverse();
        assert_eq!(backward, expected);

        // Meeting in the middle never yields a cell twice.
        let mut iter = list.iter();
        assert_eq!(iter.next(), Some(&0));
        assert_eq!(iter.next_back(), Some(&4));
        assert_eq!(iter.next(), Some(&1));
        assert_eq!(iter.next_back(), Some(&3));
        assert_eq!(iter.next(), Some(&2));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn iter_entries_yields_live_ids() {
        let mut list = CellList::new();
        let a = list.push_back("a");
        let b = list.push_back("b");

        let ids: Vec<_> = list.iter_entries().map(|(id, _)| id).collect();
        assert_eq!(ids, [a, b]);
    }

    #[test]
    fn clear_resets_everything() {
        let mut list = CellList::new();
        for i in 0..3 {
            list.push_back(i);
        }
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
        assert_eq!(list.iter().count(), 0);
        list.debug_validate_invariants();
    }
}
