//! Fixed-capacity indexed binary min-heap
//!
//! [`IndexedHeap`] is an array-backed binary heap over element handles. Every
//! element stores its own current position (through [`IndexOps`]), so an element
//! can be repositioned after its priority changes, or removed outright, in
//! O(log n) using nothing but its identity. Callers never see array positions.
//!
//! # Time Complexity
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | `push`    | O(log n)   |
//! | `pop`     | O(log n)   |
//! | `peek`    | O(1)       |
//! | `adjust`  | O(log n)   |
//! | `erase`   | O(log n)   |
//! | `clear`   | O(n)       |
//! | `resize`  | O(n)       |
//!
//! # Capacity
//!
//! Storage for `capacity` handles is reserved once, at construction. A push into a
//! full heap fails and hands the element back; the heap never grows behind the
//! caller's back. [`IndexedHeap::resize`] is the explicit way to change capacity.
//!
//! # Concurrency
//!
//! The heap has no internal locking. Wrap the whole structure in a lock when it is
//! shared; no operation blocks or allocates after construction (except `resize`).
//!
//! # Example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use rust_indexed_heap::slot::HeapSlot;
//! use rust_indexed_heap::traits::{HeapNode, NodeOps};
//! use rust_indexed_heap::IndexedHeap;
//!
//! struct Retry { due: Cell<u64>, slot: HeapSlot }
//!
//! impl HeapNode for Retry {
//!     type Slot = HeapSlot;
//!     fn heap_slot(&self) -> &HeapSlot { &self.slot }
//!     fn heap_greater(&self, other: &Self) -> bool { self.due.get() > other.due.get() }
//! }
//!
//! let retry = |due| Rc::new(Retry { due: Cell::new(due), slot: HeapSlot::new() });
//! let (a, b, c) = (retry(10), retry(20), retry(30));
//!
//! let mut heap = IndexedHeap::new(8, NodeOps).unwrap();
//! for r in [&a, &b, &c] {
//!     heap.push(Rc::clone(r)).unwrap();
//! }
//!
//! // Pull the last retry forward and tell the heap about it.
//! c.due.set(5);
//! heap.adjust(Rc::clone(&c)).unwrap();
//! assert!(Rc::ptr_eq(heap.peek().unwrap(), &c));
//!
//! // Cancel one outright.
//! heap.erase(&b).unwrap();
//! assert_eq!(heap.len(), 2);
//! ```

use crate::traits::{FnOps, HeapError, IndexOps, PushError};
use log::{debug, trace};
use std::fmt;

#[inline]
fn parent(index: usize) -> usize {
    (index - 1) / 2
}

/// A fixed-capacity binary min-heap with identity-based update and removal
///
/// `E` is the handle type stored in the heap (usually `&T`, `Rc<T>` or `Arc<T>`),
/// `O` the accessor set that orders handles and tracks their positions.
///
/// After every public call:
/// - no parent is `greater` than either of its children
/// - every live element's stored index is its position in the heap
/// - elements that left the heap through `pop`, `erase`, `clear` or `drain`
///   report `None`
pub struct IndexedHeap<E, O> {
    slots: Vec<E>,
    capacity: usize,
    ops: O,
}

impl<E, O: IndexOps<E>> IndexedHeap<E, O> {
    /// Creates an empty heap able to hold `capacity` elements
    ///
    /// # Errors
    /// Returns `HeapError::OutOfMemory` if the backing storage cannot be allocated.
    pub fn new(capacity: usize, ops: O) -> Result<Self, HeapError> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| HeapError::OutOfMemory)?;
        trace!("created indexed heap with capacity {capacity}");
        Ok(Self {
            slots,
            capacity,
            ops,
        })
    }

    /// Maximum number of elements the heap can hold
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of elements in the heap
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if the heap is empty
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns true if a push would be rejected
    pub fn is_full(&self) -> bool {
        self.slots.len() == self.capacity
    }

    /// Returns the accessor set
    pub fn ops(&self) -> &O {
        &self.ops
    }

    /// Returns the minimum element without removing it
    pub fn peek(&self) -> Option<&E> {
        self.slots.first()
    }

    /// Returns true if `elem` is currently tracked by this heap
    pub fn contains(&self, elem: &E) -> bool {
        self.position(elem).is_some()
    }

    /// Iterates over the live elements in storage order (not priority order)
    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.slots.iter()
    }

    /// Inserts an element
    ///
    /// The element must not already be tracked; use [`adjust`](Self::adjust) when
    /// that is uncertain. Debug builds assert this.
    ///
    /// # Errors
    /// Returns the element inside a [`PushError`] if the heap is full. Nothing is
    /// modified in that case.
    pub fn push(&mut self, elem: E) -> Result<(), PushError<E>> {
        if self.is_full() {
            debug!("push rejected, heap full at {} elements", self.capacity);
            return Err(PushError(elem));
        }

        debug_assert!(
            self.position(&elem).is_none(),
            "pushed an element that is already tracked"
        );

        let index = self.slots.len();
        self.ops.set_index(&elem, Some(index));
        self.slots.push(elem);
        self.sift_up(index);
        Ok(())
    }

    /// Removes and returns the minimum element
    pub fn pop(&mut self) -> Option<E> {
        if self.slots.is_empty() {
            return None;
        }
        Some(self.remove_at(0))
    }

    /// Repositions an element after its priority was changed in place
    ///
    /// An element that is not tracked is pushed instead, so `adjust` can be called
    /// whether or not the element is currently in the heap.
    ///
    /// # Errors
    /// Returns the element inside a [`PushError`] if it had to be pushed and the heap
    /// is full.
    pub fn adjust(&mut self, elem: E) -> Result<(), PushError<E>> {
        match self.position(&elem) {
            Some(index) => {
                self.restore(index);
                Ok(())
            }
            None => self.push(elem),
        }
    }

    /// Removes an arbitrary element, returning the handle the heap held for it
    ///
    /// # Errors
    /// Returns `HeapError::NotFound` if the element is not tracked. The heap is left
    /// untouched in that case.
    pub fn erase(&mut self, elem: &E) -> Result<E, HeapError> {
        let index = self.position(elem).ok_or(HeapError::NotFound)?;
        Ok(self.remove_at(index))
    }

    /// Removes every element, marking each one as not tracked
    pub fn clear(&mut self) {
        for elem in self.slots.drain(..) {
            self.ops.set_index(&elem, None);
        }
    }

    /// Removes every element and yields the handles in storage order
    ///
    /// Every element is marked as not tracked before the first one is yielded, so
    /// dropping the iterator early leaves no stale positions behind.
    pub fn drain(&mut self) -> std::vec::Drain<'_, E> {
        for elem in &self.slots {
            self.ops.set_index(elem, None);
        }
        self.slots.drain(..)
    }

    /// Moves the heap into freshly allocated storage for `new_capacity` elements
    ///
    /// Every element's stored position is rewritten against the new storage.
    ///
    /// # Errors
    /// - `HeapError::Full` if `new_capacity` is smaller than the current length
    /// - `HeapError::OutOfMemory` if the new storage cannot be allocated
    ///
    /// The heap is unchanged on error.
    pub fn resize(&mut self, new_capacity: usize) -> Result<(), HeapError> {
        if new_capacity < self.slots.len() {
            debug!(
                "resize to {new_capacity} refused, {} elements live",
                self.slots.len()
            );
            return Err(HeapError::Full);
        }

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(new_capacity)
            .map_err(|_| HeapError::OutOfMemory)?;
        slots.append(&mut self.slots);
        for (index, elem) in slots.iter().enumerate() {
            self.ops.set_index(elem, Some(index));
        }

        trace!("resized indexed heap {} -> {new_capacity}", self.capacity);
        self.slots = slots;
        self.capacity = new_capacity;
        Ok(())
    }

    /// Checks the heap property and index coherence of every live element
    pub fn check_invariants(&self) -> bool {
        self.slots.len() <= self.capacity
            && self.slots.iter().enumerate().all(|(index, elem)| {
                self.ops.get_index(elem) == Some(index)
                    && (index == 0 || !self.ops.greater(&self.slots[parent(index)], elem))
            })
    }

    /// Resolves an element's stored index, rejecting indices past the live range
    fn position(&self, elem: &E) -> Option<usize> {
        self.ops
            .get_index(elem)
            .filter(|&index| index < self.slots.len())
    }

    /// Removes the element at `index`, filling the hole with the last element
    fn remove_at(&mut self, index: usize) -> E {
        let removed = self.slots.swap_remove(index);
        self.ops.set_index(&removed, None);

        if index < self.slots.len() {
            self.ops.set_index(&self.slots[index], Some(index));
            self.restore(index);
        }
        removed
    }

    /// Moves the element at `index` up or down, whichever the heap property needs
    fn restore(&mut self, index: usize) {
        if index > 0 && self.ops.greater(&self.slots[parent(index)], &self.slots[index]) {
            self.sift_up(index);
        } else {
            self.sift_down(index);
        }
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = parent(index);
            if !self.ops.greater(&self.slots[parent], &self.slots[index]) {
                break;
            }
            self.swap(index, parent);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.slots.len();
        loop {
            let left = 2 * index + 1;
            if left >= len {
                break;
            }
            let right = left + 1;

            // Compare against the lesser child
            let child = if right < len && self.ops.greater(&self.slots[left], &self.slots[right])
            {
                right
            } else {
                left
            };

            if !self.ops.greater(&self.slots[index], &self.slots[child]) {
                break;
            }
            self.swap(index, child);
            index = child;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.slots.swap(a, b);
        self.ops.set_index(&self.slots[a], Some(a));
        self.ops.set_index(&self.slots[b], Some(b));
    }
}

impl<E, G, S, I> IndexedHeap<E, FnOps<G, S, I>>
where
    G: Fn(&E, &E) -> bool,
    S: Fn(&E, Option<usize>),
    I: Fn(&E) -> Option<usize>,
{
    /// Creates an empty heap from three accessor closures
    ///
    /// # Errors
    /// Returns `HeapError::OutOfMemory` if the backing storage cannot be allocated.
    pub fn with_fns(
        capacity: usize,
        greater: G,
        set_index: S,
        get_index: I,
    ) -> Result<Self, HeapError> {
        Self::new(capacity, FnOps::new(greater, set_index, get_index))
    }
}

impl<'a, E, O: IndexOps<E>> IntoIterator for &'a IndexedHeap<E, O> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<E: fmt::Debug, O> fmt::Debug for IndexedHeap<E, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedHeap")
            .field("capacity", &self.capacity)
            .field("slots", &self.slots)
            .finish_non_exhaustive()
    }
}
