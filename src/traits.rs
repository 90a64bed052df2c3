//! Error types and element accessors for indexed heaps
//!
//! The heap never owns the records it orders. It stores handles (`&T`, `Rc<T>`,
//! `Arc<T>`, ...) and talks to the records only through an [`IndexOps`]
//! implementation supplied at construction:
//!
//! - `greater(a, b)`: strict ordering, true when `a` should sort after `b`
//! - `set_index(elem, slot)`: remember the element's position (`None` = not tracked)
//! - `get_index(elem)`: read that position back
//!
//! Two ready-made implementations are provided:
//!
//! - [`FnOps`]: three closures, for records laid out however the caller likes
//! - [`NodeOps`]: for records implementing [`HeapNode`]

use crate::slot::SlotStore;
use std::fmt;
use std::ops::Deref;

/// Error type for heap operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// Every slot is occupied
    Full,
    /// The element is not currently tracked by the heap
    NotFound,
    /// Backing storage could not be allocated
    OutOfMemory,
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapError::Full => write!(f, "heap is at capacity"),
            HeapError::NotFound => write!(f, "element is not in the heap"),
            HeapError::OutOfMemory => write!(f, "could not allocate heap storage"),
        }
    }
}

impl std::error::Error for HeapError {}

/// A push rejected because the heap is full
///
/// Carries the rejected handle back to the caller, the same way
/// `std::sync::mpsc::SendError` returns an unsent value.
#[derive(PartialEq, Eq, Clone, Copy)]
pub struct PushError<E>(pub E);

impl<E> PushError<E> {
    /// Returns the handle that could not be pushed
    pub fn into_inner(self) -> E {
        self.0
    }
}

impl<E> fmt::Debug for PushError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushError").finish_non_exhaustive()
    }
}

impl<E> fmt::Display for PushError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&HeapError::Full, f)
    }
}

impl<E> std::error::Error for PushError<E> {}

impl<E> From<PushError<E>> for HeapError {
    fn from(_: PushError<E>) -> Self {
        HeapError::Full
    }
}

/// Accessors the heap uses to order elements and track their positions
///
/// # Contract
///
/// - `greater` is a strict, consistent ordering. Its answer for a pair must not change
///   unless one of the elements was reported to the heap through `adjust`.
/// - `get_index` returns exactly what the last `set_index` stored, and `None` for an
///   element that was never pushed.
///
/// Breaking the contract never causes undefined behavior, but the heap may then
/// return elements out of order or report `NotFound` for a tracked element.
pub trait IndexOps<E> {
    /// Returns true if `a` should sort after `b`
    fn greater(&self, a: &E, b: &E) -> bool;

    /// Stores the element's position, or `None` when it leaves the heap
    fn set_index(&self, elem: &E, slot: Option<usize>);

    /// Returns the element's stored position
    fn get_index(&self, elem: &E) -> Option<usize>;
}

/// [`IndexOps`] built from three closures
///
/// # Example
///
/// ```rust
/// use rust_indexed_heap::slot::{HeapSlot, SlotStore};
/// use rust_indexed_heap::traits::FnOps;
/// use rust_indexed_heap::IndexedHeap;
///
/// struct Request { deadline: u64, slot: HeapSlot }
///
/// let a = Request { deadline: 20, slot: HeapSlot::new() };
/// let b = Request { deadline: 10, slot: HeapSlot::new() };
///
/// let ops = FnOps::new(
///     |x: &&Request, y: &&Request| x.deadline > y.deadline,
///     |r: &&Request, slot| r.slot.store(slot),
///     |r: &&Request| r.slot.load(),
/// );
/// let mut heap = IndexedHeap::new(4, ops).unwrap();
/// heap.push(&a).unwrap();
/// heap.push(&b).unwrap();
/// assert_eq!(heap.peek().map(|r| r.deadline), Some(10));
/// ```
#[derive(Clone, Copy)]
pub struct FnOps<G, S, I> {
    greater: G,
    set_index: S,
    get_index: I,
}

impl<G, S, I> FnOps<G, S, I> {
    /// Bundles the three accessors
    pub fn new<E>(greater: G, set_index: S, get_index: I) -> Self
    where
        G: Fn(&E, &E) -> bool,
        S: Fn(&E, Option<usize>),
        I: Fn(&E) -> Option<usize>,
    {
        Self {
            greater,
            set_index,
            get_index,
        }
    }
}

impl<G, S, I> fmt::Debug for FnOps<G, S, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnOps").finish_non_exhaustive()
    }
}

impl<E, G, S, I> IndexOps<E> for FnOps<G, S, I>
where
    G: Fn(&E, &E) -> bool,
    S: Fn(&E, Option<usize>),
    I: Fn(&E) -> Option<usize>,
{
    #[inline]
    fn greater(&self, a: &E, b: &E) -> bool {
        (self.greater)(a, b)
    }

    #[inline]
    fn set_index(&self, elem: &E, slot: Option<usize>) {
        (self.set_index)(elem, slot)
    }

    #[inline]
    fn get_index(&self, elem: &E) -> Option<usize> {
        (self.get_index)(elem)
    }
}

/// A record that embeds its own heap slot and knows how to order itself
///
/// Implement this for the pointee of your handle type and use [`NodeOps`]
/// as the heap's accessor set.
pub trait HeapNode {
    /// Slot storage embedded in the record
    type Slot: SlotStore;

    /// Returns the embedded slot
    fn heap_slot(&self) -> &Self::Slot;

    /// Returns true if `self` should sort after `other`
    fn heap_greater(&self, other: &Self) -> bool;
}

/// [`IndexOps`] for any handle that dereferences to a [`HeapNode`]
#[derive(Debug, Default, Clone, Copy)]
pub struct NodeOps;

impl<E> IndexOps<E> for NodeOps
where
    E: Deref,
    E::Target: HeapNode,
{
    #[inline]
    fn greater(&self, a: &E, b: &E) -> bool {
        (**a).heap_greater(&**b)
    }

    #[inline]
    fn set_index(&self, elem: &E, slot: Option<usize>) {
        (**elem).heap_slot().store(slot)
    }

    #[inline]
    fn get_index(&self, elem: &E) -> Option<usize> {
        (**elem).heap_slot().load()
    }
}
