//! Slot storage embedded in heap elements
//!
//! An indexed heap needs every element to remember where it currently sits in the
//! heap array. Elements carry one of the types in this module and hand it to the
//! heap through [`HeapNode`](crate::traits::HeapNode) or through the closures given
//! to [`FnOps`](crate::traits::FnOps).
//!
//! - [`HeapSlot`]: `Cell`-backed, for `&T` and `Rc<T>` elements
//! - [`AtomicHeapSlot`]: atomic, for `Arc<T>` elements shared across threads
//!
//! Both report `None` for an element that is not in any heap.

use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

const VACANT: usize = usize::MAX;

/// Storage for an element's current heap position
pub trait SlotStore {
    /// Returns the stored position, or `None` when the element is not tracked
    fn load(&self) -> Option<usize>;

    /// Stores a position, or `None` to mark the element as not tracked
    fn store(&self, slot: Option<usize>);

    /// Returns true if a position is stored
    fn is_linked(&self) -> bool {
        self.load().is_some()
    }
}

#[inline]
fn encode(slot: Option<usize>) -> usize {
    match slot {
        Some(index) => {
            debug_assert_ne!(index, VACANT, "heap position collides with the vacant marker");
            index
        }
        None => VACANT,
    }
}

#[inline]
fn decode(raw: usize) -> Option<usize> {
    (raw != VACANT).then_some(raw)
}

/// Single-threaded slot storage
///
/// # Example
///
/// ```rust
/// use rust_indexed_heap::slot::{HeapSlot, SlotStore};
///
/// let slot = HeapSlot::new();
/// assert_eq!(slot.load(), None);
/// slot.store(Some(3));
/// assert_eq!(slot.load(), Some(3));
/// ```
pub struct HeapSlot(Cell<usize>);

impl HeapSlot {
    /// Creates a slot for an element that is not in a heap
    pub const fn new() -> Self {
        Self(Cell::new(VACANT))
    }
}

impl SlotStore for HeapSlot {
    #[inline]
    fn load(&self) -> Option<usize> {
        decode(self.0.get())
    }

    #[inline]
    fn store(&self, slot: Option<usize>) {
        self.0.set(encode(slot));
    }
}

impl Default for HeapSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HeapSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HeapSlot").field(&self.load()).finish()
    }
}

/// Slot storage for elements shared between threads
///
/// The heap is not synchronized. Callers serialize every heap call behind their own
/// lock, which also orders the accesses to this slot, so relaxed atomics suffice.
pub struct AtomicHeapSlot(AtomicUsize);

impl AtomicHeapSlot {
    /// Creates a slot for an element that is not in a heap
    pub const fn new() -> Self {
        Self(AtomicUsize::new(VACANT))
    }
}

impl SlotStore for AtomicHeapSlot {
    #[inline]
    fn load(&self) -> Option<usize> {
        decode(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    fn store(&self, slot: Option<usize>) {
        self.0.store(encode(slot), Ordering::Relaxed);
    }
}

impl Default for AtomicHeapSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AtomicHeapSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AtomicHeapSlot").field(&self.load()).finish()
    }
}
