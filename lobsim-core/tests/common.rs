//! Shared scaffolding for the integration tests: builds a bare matching
//! engine plus the arena and ingress ring behind it, the same way
//! `engine::matching`'s own unit tests do, so these tests only ever go
//! through the public API.

#![allow(dead_code)]

use std::sync::Arc;

use lobsim_core::arena::{Handle, OrderArena};
use lobsim_core::engine::dispatcher::TradeDispatcher;
use lobsim_core::engine::matching::MatchingEngine;
use lobsim_core::engine::types::{Order, OrderType, Price, Quantity, Side, TradeInfo};
use lobsim_core::ring::RingBuffer;

pub const ARENA_CAPACITY: usize = 1024;
pub const RING_CAPACITY: usize = 256;

pub fn new_engine() -> (MatchingEngine, Arc<OrderArena>, Arc<RingBuffer<Handle>>) {
    let arena = Arc::new(OrderArena::new(ARENA_CAPACITY));
    let ingress = Arc::new(RingBuffer::new(RING_CAPACITY));
    let engine = MatchingEngine::new(arena.clone(), TradeDispatcher::new(), ingress.clone());
    (engine, arena, ingress)
}

/// Attaches a fresh trade egress ring for `client_ref` to `engine`'s dispatcher.
pub fn attach_client(engine: &mut MatchingEngine, client_ref: u64) -> Arc<RingBuffer<TradeInfo>> {
    let ring = Arc::new(RingBuffer::new(RING_CAPACITY));
    engine.dispatcher_mut().attach(client_ref, ring.clone());
    ring
}

/// Allocates `order` and pushes its handle onto `ingress`.
pub fn submit(arena: &Arc<OrderArena>, ingress: &Arc<RingBuffer<Handle>>, order: Order) -> Handle {
    let handle = arena.allocate(order).unwrap();
    ingress.push(handle).unwrap();
    handle
}

pub fn submit_limit(
    arena: &Arc<OrderArena>,
    ingress: &Arc<RingBuffer<Handle>>,
    client_ref: u64,
    side: Side,
    price: Price,
    quantity: Quantity,
    timestamp: u64,
) -> Handle {
    submit(arena, ingress, Order::new_limit(0, client_ref, side, price, quantity, timestamp))
}

pub fn submit_market(
    arena: &Arc<OrderArena>,
    ingress: &Arc<RingBuffer<Handle>>,
    client_ref: u64,
    side: Side,
    quantity: Quantity,
    timestamp: u64,
) -> Handle {
    submit(
        arena,
        ingress,
        Order::new_limit(0, client_ref, side, 0, quantity, timestamp).with_type(OrderType::Market),
    )
}

/// Submits a CANCEL directive targeting the order id assigned to `target`
/// (the engine assigns `order_id = handle` the first time it processes an
/// order, so the handle doubles as the id to cancel).
pub fn submit_cancel(
    arena: &Arc<OrderArena>,
    ingress: &Arc<RingBuffer<Handle>>,
    target: Handle,
    client_ref: u64,
    timestamp: u64,
) -> Handle {
    let mut cancel = Order::new_limit(target as u64, client_ref, Side::Buy, 0, 0, timestamp);
    cancel.order_type = OrderType::Cancel;
    submit(arena, ingress, cancel)
}

/// Processes everything currently queued on the engine's ingress ring.
pub fn drain(engine: &mut MatchingEngine) {
    while engine.process_next() {}
}

/// Pops every item currently available on `ring`, in FIFO order.
pub fn drain_ring<T>(ring: &RingBuffer<T>) -> Vec<T> {
    let mut out = Vec::new();
    while let Some(item) = ring.pop() {
        out.push(item);
    }
    out
}
