//! Deadline tracking for retransmission and retry timers
//!
//! [`DeadlineQueue`] keeps outstanding timers ordered by expiry on top of an
//! [`IndexedHeap`]. Each [`Timer`] embeds its own heap slot, so a timer can be
//! extended, pulled forward or cancelled in O(log n) when the request it guards
//! completes, without scanning the queue.
//!
//! Deadlines are plain `u64` ticks; the caller decides what a tick is (milliseconds
//! since start, a monotonic counter, ...). Timers with equal deadlines fire in the
//! order they were last scheduled.
//!
//! # Example
//!
//! ```rust
//! use rust_indexed_heap::deadline::DeadlineQueue;
//!
//! let mut timers = DeadlineQueue::with_capacity(16).unwrap();
//! let ack = timers.schedule(100, "ack").unwrap();
//! let ping = timers.schedule(250, "ping").unwrap();
//!
//! // The peer asked for more time
//! timers.reschedule(&ack, 300).unwrap();
//! assert_eq!(timers.next_deadline(), Some(250));
//!
//! // Reply arrived before the ping timer fired
//! assert!(timers.cancel(&ping));
//!
//! let fired: Vec<_> = timers.drain_expired(400).map(|t| *t.payload()).collect();
//! assert_eq!(fired, vec!["ack"]);
//! ```

use crate::indexed::IndexedHeap;
use crate::slot::{HeapSlot, SlotStore};
use crate::traits::{HeapError, HeapNode, NodeOps};
use log::{debug, trace};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_QUEUE_ID: AtomicU64 = AtomicU64::new(0);

/// A scheduled deadline and the payload it guards
pub struct Timer<T> {
    deadline: Cell<u64>,
    seq: Cell<u64>,
    slot: HeapSlot,
    queue: u64,
    payload: T,
}

/// Shared handle to a [`Timer`], returned by [`DeadlineQueue::schedule`]
pub type TimerHandle<T> = Rc<Timer<T>>;

impl<T> Timer<T> {
    /// Tick at which the timer expires
    pub fn deadline(&self) -> u64 {
        self.deadline.get()
    }

    /// Value the timer was scheduled with
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Returns true while the timer sits in a queue
    pub fn is_scheduled(&self) -> bool {
        self.slot.is_linked()
    }
}

impl<T> HeapNode for Timer<T> {
    type Slot = HeapSlot;

    fn heap_slot(&self) -> &HeapSlot {
        &self.slot
    }

    fn heap_greater(&self, other: &Self) -> bool {
        (self.deadline.get(), self.seq.get()) > (other.deadline.get(), other.seq.get())
    }
}

impl<T: fmt::Debug> fmt::Debug for Timer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("deadline", &self.deadline.get())
            .field("scheduled", &self.is_scheduled())
            .field("payload", &self.payload)
            .finish()
    }
}

/// Earliest-deadline-first queue of timers with O(log n) reschedule and cancel
///
/// Timer handles belong to the queue that created them; other queues refuse to
/// reschedule or cancel them. Dropping the queue marks every outstanding timer as
/// no longer scheduled.
pub struct DeadlineQueue<T> {
    heap: IndexedHeap<TimerHandle<T>, NodeOps>,
    id: u64,
    next_seq: u64,
}

impl<T> DeadlineQueue<T> {
    /// Creates a queue that can hold up to `capacity` outstanding timers
    ///
    /// # Errors
    /// Returns `HeapError::OutOfMemory` if the queue storage cannot be allocated.
    pub fn with_capacity(capacity: usize) -> Result<Self, HeapError> {
        Ok(Self {
            heap: IndexedHeap::new(capacity, NodeOps)?,
            id: NEXT_QUEUE_ID.fetch_add(1, Ordering::Relaxed),
            next_seq: 0,
        })
    }

    /// Number of outstanding timers
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns true if no timer is outstanding
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Maximum number of outstanding timers
    pub fn capacity(&self) -> usize {
        self.heap.capacity()
    }

    /// Arms a new timer
    ///
    /// # Errors
    /// Returns `HeapError::Full` if the queue already holds `capacity` timers.
    pub fn schedule(&mut self, deadline: u64, payload: T) -> Result<TimerHandle<T>, HeapError> {
        let timer = Rc::new(Timer {
            deadline: Cell::new(deadline),
            seq: Cell::new(self.bump()),
            slot: HeapSlot::new(),
            queue: self.id,
            payload,
        });
        if let Err(err) = self.heap.push(Rc::clone(&timer)) {
            debug!("cannot schedule timer for tick {deadline}: {err}");
            return Err(err.into());
        }
        trace!("scheduled timer for tick {deadline}");
        Ok(timer)
    }

    /// Moves a timer to a new deadline
    ///
    /// A timer that already fired or was cancelled is armed again.
    ///
    /// # Errors
    /// - `HeapError::NotFound` if the timer was created by another queue; nothing
    ///   changes in that case
    /// - `HeapError::Full` if the timer had to be re-armed and the queue is full; the
    ///   timer's deadline is updated anyway
    pub fn reschedule(&mut self, timer: &TimerHandle<T>, deadline: u64) -> Result<(), HeapError> {
        if !self.owns(timer) {
            return Err(HeapError::NotFound);
        }
        timer.deadline.set(deadline);
        timer.seq.set(self.bump());
        self.heap.adjust(Rc::clone(timer))?;
        Ok(())
    }

    /// Disarms a timer, returning false if it was not scheduled in this queue
    pub fn cancel(&mut self, timer: &TimerHandle<T>) -> bool {
        self.owns(timer) && self.heap.erase(timer).is_ok()
    }

    /// Earliest outstanding deadline
    pub fn next_deadline(&self) -> Option<u64> {
        self.heap.peek().map(|timer| timer.deadline())
    }

    /// Earliest outstanding timer
    pub fn peek(&self) -> Option<&TimerHandle<T>> {
        self.heap.peek()
    }

    /// Removes and returns the earliest timer if it is due at `now`
    pub fn pop_expired(&mut self, now: u64) -> Option<TimerHandle<T>> {
        if self.next_deadline()? > now {
            return None;
        }
        self.heap.pop()
    }

    /// Removes every timer due at `now`, earliest first
    pub fn drain_expired(&mut self, now: u64) -> impl Iterator<Item = TimerHandle<T>> + '_ {
        std::iter::from_fn(move || self.pop_expired(now))
    }

    /// Slot positions are only meaningful inside the queue that assigned them
    fn owns(&self, timer: &TimerHandle<T>) -> bool {
        timer.queue == self.id
    }

    fn bump(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

impl<T> Drop for DeadlineQueue<T> {
    fn drop(&mut self) {
        self.heap.clear();
    }
}

impl<T: fmt::Debug> fmt::Debug for DeadlineQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeadlineQueue")
            .field("len", &self.len())
            .field("next_deadline", &self.next_deadline())
            .finish_non_exhaustive()
    }
}
