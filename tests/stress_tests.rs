//! Stress tests that push the heap through long randomized workloads
//!
//! Each test is driven by a seeded RNG so failures reproduce. Logging goes
//! through env_logger; run with `RUST_LOG=trace` to see heap events.

use ctor::ctor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_indexed_heap::deadline::DeadlineQueue;
use rust_indexed_heap::slot::{HeapSlot, SlotStore};
use rust_indexed_heap::traits::{HeapNode, NodeOps};
use rust_indexed_heap::{HeapError, IndexedHeap};
use std::cell::Cell;
use std::rc::Rc;

#[ctor]
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug)]
struct Entry {
    priority: Cell<u32>,
    slot: HeapSlot,
}

impl HeapNode for Entry {
    type Slot = HeapSlot;

    fn heap_slot(&self) -> &HeapSlot {
        &self.slot
    }

    fn heap_greater(&self, other: &Self) -> bool {
        self.priority.get() > other.priority.get()
    }
}

fn entries(rng: &mut StdRng, n: usize) -> Vec<Rc<Entry>> {
    (0..n)
        .map(|_| {
            Rc::new(Entry {
                priority: Cell::new(rng.random_range(0..1_000_000)),
                slot: HeapSlot::new(),
            })
        })
        .collect()
}

fn drain_sorted(heap: &mut IndexedHeap<Rc<Entry>, NodeOps>) -> Vec<u32> {
    let mut last = 0;
    let mut out = Vec::with_capacity(heap.len());
    while let Some(e) = heap.pop() {
        let p = e.priority.get();
        assert!(p >= last, "popped {p} after {last}");
        last = p;
        out.push(p);
    }
    out
}

#[test]
fn test_massive_push_pop() {
    let mut rng = StdRng::seed_from_u64(1);
    let items = entries(&mut rng, 10_000);
    let mut heap = IndexedHeap::new(items.len(), NodeOps).unwrap();

    for e in &items {
        heap.push(Rc::clone(e)).unwrap();
    }
    assert_eq!(heap.len(), 10_000);
    assert!(heap.check_invariants());

    let popped = drain_sorted(&mut heap);
    assert_eq!(popped.len(), 10_000);
    assert!(items.iter().all(|e| !e.slot.is_linked()));
}

#[test]
fn test_many_adjusts() {
    let mut rng = StdRng::seed_from_u64(2);
    let items = entries(&mut rng, 2_000);
    let mut heap = IndexedHeap::new(items.len(), NodeOps).unwrap();
    for e in &items {
        heap.push(Rc::clone(e)).unwrap();
    }

    for round in 0..20_000 {
        let e = &items[rng.random_range(0..items.len())];
        e.priority.set(rng.random_range(0..1_000_000));
        heap.adjust(Rc::clone(e)).unwrap();
        if round % 1_000 == 0 {
            assert!(heap.check_invariants());
        }
    }

    let mut expected: Vec<u32> = items.iter().map(|e| e.priority.get()).collect();
    expected.sort_unstable();
    assert_eq!(drain_sorted(&mut heap), expected);
}

#[test]
fn test_interleaved_erase_and_push() {
    let mut rng = StdRng::seed_from_u64(3);
    let items = entries(&mut rng, 512);
    let mut heap = IndexedHeap::new(256, NodeOps).unwrap();

    for _ in 0..50_000 {
        let e = &items[rng.random_range(0..items.len())];
        if heap.contains(e) {
            heap.erase(e).unwrap();
            assert!(!e.slot.is_linked());
        } else {
            match heap.push(Rc::clone(e)) {
                Ok(()) => assert!(e.slot.is_linked()),
                Err(err) => {
                    assert!(heap.is_full());
                    assert_eq!(HeapError::from(err), HeapError::Full);
                }
            }
        }
    }

    assert!(heap.check_invariants());
    let live = items.iter().filter(|e| e.slot.is_linked()).count();
    assert_eq!(live, heap.len());
    drain_sorted(&mut heap);
}

#[test]
fn test_grow_by_resize() {
    let mut rng = StdRng::seed_from_u64(4);
    let items = entries(&mut rng, 1_000);
    let mut heap = IndexedHeap::new(1, NodeOps).unwrap();

    for e in &items {
        if let Err(rejected) = heap.push(Rc::clone(e)) {
            let doubled = heap.capacity() * 2;
            heap.resize(doubled).unwrap();
            heap.push(rejected.into_inner()).unwrap();
        }
    }

    assert_eq!(heap.capacity(), 1024);
    assert!(heap.check_invariants());
    assert_eq!(drain_sorted(&mut heap).len(), 1_000);
}

#[test]
fn test_timer_churn() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut queue = DeadlineQueue::with_capacity(128).unwrap();
    let mut outstanding = Vec::new();
    let mut now = 0u64;
    let mut fired = 0usize;
    let mut cancelled = 0usize;
    let mut scheduled = 0usize;

    for _ in 0..20_000 {
        match rng.random_range(0..4) {
            0 => {
                if let Ok(timer) = queue.schedule(now + rng.random_range(1..500), scheduled) {
                    outstanding.push(timer);
                    scheduled += 1;
                }
            }
            1 if !outstanding.is_empty() => {
                let timer = &outstanding[rng.random_range(0..outstanding.len())];
                if timer.is_scheduled() {
                    queue.reschedule(timer, now + rng.random_range(1..500)).unwrap();
                }
            }
            2 if !outstanding.is_empty() => {
                let timer = outstanding.swap_remove(rng.random_range(0..outstanding.len()));
                if queue.cancel(&timer) {
                    cancelled += 1;
                }
            }
            _ => {
                now += rng.random_range(0..20);
                let mut last = 0;
                for timer in queue.drain_expired(now) {
                    assert!(timer.deadline() <= now);
                    assert!(timer.deadline() >= last);
                    assert!(!timer.is_scheduled());
                    last = timer.deadline();
                    fired += 1;
                }
            }
        }
    }

    assert_eq!(scheduled, fired + cancelled + queue.len());
}
