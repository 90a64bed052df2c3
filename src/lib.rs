//! Indexed Binary Heap for Rust
//!
//! This crate provides a fixed-capacity binary min-heap whose elements remember
//! their own position. Any tracked element can be repositioned after a priority
//! change, or removed, in O(log n) using only the element itself: the usual tool
//! for request timeouts, retransmission timers and retry deadlines that get
//! extended or cancelled long before they expire.
//!
//! # Features
//!
//! - **Caller-owned elements**: the heap stores handles (`&T`, `Rc<T>`, `Arc<T>`) and
//!   never allocates or frees the records themselves
//! - **Identity-based updates**: `adjust` and `erase` take the element, never an
//!   array position
//! - **Fixed capacity**: storage is reserved up front; a full heap rejects pushes
//!   instead of reallocating, and `resize` rebuilds explicitly
//! - **Deadline queue**: [`DeadlineQueue`](deadline::DeadlineQueue) packages the heap
//!   as an earliest-deadline-first timer queue
//!
//! # Example
//!
//! ```rust
//! use rust_indexed_heap::IndexedHeap;
//! use rust_indexed_heap::slot::{HeapSlot, SlotStore};
//! use std::cell::Cell;
//!
//! struct Request { timeout: Cell<u32>, slot: HeapSlot }
//! let req = |t| Request { timeout: Cell::new(t), slot: HeapSlot::new() };
//! let (r1, r2) = (req(300), req(100));
//!
//! let mut heap = IndexedHeap::with_fns(
//!     4,
//!     |a: &&Request, b: &&Request| a.timeout.get() > b.timeout.get(),
//!     |r: &&Request, slot| r.slot.store(slot),
//!     |r: &&Request| r.slot.load(),
//! )
//! .unwrap();
//!
//! heap.push(&r1).unwrap();
//! heap.push(&r2).unwrap();
//! assert_eq!(heap.peek().map(|r| r.timeout.get()), Some(100));
//!
//! heap.erase(&&r2).unwrap();
//! assert_eq!(r2.slot.load(), None);
//! assert_eq!(heap.pop().map(|r| r.timeout.get()), Some(300));
//! ```

pub mod deadline;
pub mod indexed;
pub mod slot;
pub mod traits;

pub use indexed::IndexedHeap;
pub use traits::{HeapError, IndexOps, PushError};
