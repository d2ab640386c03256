//! Bounded single-producer/single-consumer ring buffer.
//!
//! Capacity is fixed at construction and rounded up to the next power of two
//! so index wrapping reduces to a mask. Head and tail counters are
//! cache-line padded to avoid false sharing between the producer and
//! consumer threads; both counters are unwrapped `u64` sequence numbers
//! (not indices already reduced mod capacity), so there's no ABA hazard
//! across wraparounds.
//!
//! # Memory ordering
//! The producer writes the slot, then publishes the new head with `Release`.
//! The consumer reads the tail with `Relaxed` (it's the only writer of tail),
//! checks the head with `Acquire` to observe the producer's slot write, reads
//! the slot, then publishes the new tail with `Release`. Symmetric for the
//! producer's `Acquire` read of tail to check for a full buffer.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_utils::CachePadded;

pub struct RingBuffer<T> {
    mask: u64,
    buffer: Box<[UnsafeCell<Option<T>>]>,
    head: CachePadded<AtomicU64>,
    tail: CachePadded<AtomicU64>,
}

unsafe impl<T: Send> Send for RingBuffer<T> {}
unsafe impl<T: Send> Sync for RingBuffer<T> {}

impl<T> RingBuffer<T> {
    /// Creates a ring buffer whose capacity is the next power of two `>= capacity_hint`.
    pub fn new(capacity_hint: usize) -> Self {
        let capacity = capacity_hint.next_power_of_two().max(2);
        let mut buffer = Vec::with_capacity(capacity);
        buffer.resize_with(capacity, || UnsafeCell::new(None));
        Self {
            mask: (capacity - 1) as u64,
            buffer: buffer.into_boxed_slice(),
            head: CachePadded::new(AtomicU64::new(0)),
            tail: CachePadded::new(AtomicU64::new(0)),
        }
    }

    pub fn capacity(&self) -> usize {
        (self.mask + 1) as usize
    }

    /// Non-blocking push. Returns `Err(item)` if the buffer is full.
    pub fn push(&self, item: T) -> Result<(), T> {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        if head.wrapping_sub(tail) >= self.capacity() as u64 {
            return Err(item);
        }
        let idx = (head & self.mask) as usize;
        unsafe {
            *self.buffer[idx].get() = Some(item);
        }
        self.head.store(head.wrapping_add(1), Ordering::Release);
        Ok(())
    }

    /// Non-blocking pop. Returns `None` if the buffer is empty.
    pub fn pop(&self) -> Option<T> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);
        if tail == head {
            return None;
        }
        let idx = (tail & self.mask) as usize;
        let item = unsafe { (*self.buffer[idx].get()).take() };
        self.tail.store(tail.wrapping_add(1), Ordering::Release);
        item
    }

    pub fn is_empty(&self) -> bool {
        self.tail.load(Ordering::Acquire) == self.head.load(Ordering::Acquire)
    }
}
