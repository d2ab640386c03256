//! Fixed-capacity slab allocator handing out stable integer handles for orders.
//!
//! Mirrors a free-list-backed object pool: each slot either holds a live
//! [`Order`](crate::engine::types::Order) or an index to the next free slot.
//! Handles stay valid for the lifetime of the order they name and are never
//! reused while the order they point to is live.

use parking_lot::Mutex;

use crate::engine::types::Order;

/// Sentinel handle meaning "no order" (null prev/next/head/tail link).
pub const NULL_HANDLE: u32 = u32::MAX;

/// Stable index into an [`OrderArena`].
pub type Handle = u32;

#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    #[error("order arena exhausted (capacity {capacity})")]
    Full { capacity: usize },
}

enum Slot {
    Occupied(Order),
    Free { next_free: u32 },
}

struct Inner {
    slots: Vec<Slot>,
    free_head: u32,
    len: usize,
}

/// Slab of `capacity` order slots with an intrusive free-list.
///
/// `allocate`/`deallocate` are O(1). Shared across the scheduler and matching
/// engine threads behind a single mutex; the hot path is one allocation per
/// submitted order, so contention has not warranted a per-thread free-list.
pub struct OrderArena {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl OrderArena {
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        for i in 0..capacity {
            let next_free = if i + 1 == capacity {
                NULL_HANDLE
            } else {
                (i + 1) as u32
            };
            slots.push(Slot::Free { next_free });
        }
        let free_head = if capacity == 0 { NULL_HANDLE } else { 0 };
        Self {
            inner: Mutex::new(Inner {
                slots,
                free_head,
                len: 0,
            }),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Allocates a slot and writes `order` into it, returning the handle.
    pub fn allocate(&self, order: Order) -> Result<Handle, ArenaError> {
        let mut inner = self.inner.lock();
        let head = inner.free_head;
        if head == NULL_HANDLE {
            return Err(ArenaError::Full {
                capacity: self.capacity,
            });
        }
        let next_free = match inner.slots[head as usize] {
            Slot::Free { next_free } => next_free,
            Slot::Occupied(_) => unreachable!("free list pointed at an occupied slot"),
        };
        inner.slots[head as usize] = Slot::Occupied(order);
        inner.free_head = next_free;
        inner.len += 1;
        Ok(head)
    }

    /// Returns the slot to the free-list and hands back the order that was stored there.
    pub fn deallocate(&self, handle: Handle) -> Order {
        let mut inner = self.inner.lock();
        let prev_head = inner.free_head;
        let occupied = std::mem::replace(
            &mut inner.slots[handle as usize],
            Slot::Free {
                next_free: prev_head,
            },
        );
        inner.free_head = handle;
        inner.len -= 1;
        match occupied {
            Slot::Occupied(order) => order,
            Slot::Free { .. } => panic!("double free of arena handle {handle}"),
        }
    }

    pub fn get(&self, handle: Handle) -> OrderRef<'_> {
        OrderRef { arena: self, handle }
    }

    /// Fills `resting` against `incoming` under a single lock (both orders
    /// must be mutated atomically with respect to other arena access), and
    /// returns `(filled_quantity, resting_after, incoming_after)`.
    pub fn fill_pair(&self, resting: Handle, incoming: Handle) -> (u32, Order, Order) {
        assert_ne!(resting, incoming, "an order cannot fill against itself");
        let mut inner = self.inner.lock();
        let (lo, hi) = if resting < incoming {
            (resting, incoming)
        } else {
            (incoming, resting)
        };
        let (left, right) = inner.slots.split_at_mut(hi as usize);
        let lo_slot = &mut left[lo as usize];
        let hi_slot = &mut right[0];
        let (resting_slot, incoming_slot) = if resting < incoming {
            (lo_slot, hi_slot)
        } else {
            (hi_slot, lo_slot)
        };
        let resting_order = match resting_slot {
            Slot::Occupied(o) => o,
            Slot::Free { .. } => panic!("fill_pair on freed handle {resting}"),
        };
        let incoming_order = match incoming_slot {
            Slot::Occupied(o) => o,
            Slot::Free { .. } => panic!("fill_pair on freed handle {incoming}"),
        };
        let filled = resting_order.fill(incoming_order);
        (filled, resting_order.clone(), incoming_order.clone())
    }

    fn with_slot<R>(&self, handle: Handle, f: impl FnOnce(&Order) -> R) -> R {
        let inner = self.inner.lock();
        match &inner.slots[handle as usize] {
            Slot::Occupied(order) => f(order),
            Slot::Free { .. } => panic!("access to freed arena handle {handle}"),
        }
    }

    fn with_slot_mut<R>(&self, handle: Handle, f: impl FnOnce(&mut Order) -> R) -> R {
        let mut inner = self.inner.lock();
        match &mut inner.slots[handle as usize] {
            Slot::Occupied(order) => f(order),
            Slot::Free { .. } => panic!("access to freed arena handle {handle}"),
        }
    }
}

/// A short-lived accessor for the order stored at a handle.
///
/// Kept as a thin wrapper rather than returning `&Order` directly since the
/// arena is mutex-guarded; callers read/update through closures.
pub struct OrderRef<'a> {
    arena: &'a OrderArena,
    handle: Handle,
}

impl<'a> OrderRef<'a> {
    pub fn read<R>(&self, f: impl FnOnce(&Order) -> R) -> R {
        self.arena.with_slot(self.handle, f)
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut Order) -> R) -> R {
        self.arena.with_slot_mut(self.handle, f)
    }
}
