use std::sync::Arc;

use lobsim_core::arena::{Handle, OrderArena};
use lobsim_core::engine::dispatcher::TradeDispatcher;
use lobsim_core::engine::matching::MatchingEngine;
use lobsim_core::engine::types::{Order, OrderType, Side};
use lobsim_core::ring::RingBuffer;

pub fn make_limit_order(client_ref: u64, side: Side, price: i64, qty: u32, ts: u64) -> Order {
    Order::new_limit(0, client_ref, side, price, qty, ts)
}

pub fn make_market_order(client_ref: u64, side: Side, qty: u32, ts: u64) -> Order {
    make_limit_order(client_ref, side, 0, qty, ts).with_type(OrderType::Market)
}

pub fn new_engine(capacity: usize) -> (MatchingEngine, Arc<OrderArena>, Arc<RingBuffer<Handle>>) {
    let arena = Arc::new(OrderArena::new(capacity));
    let ingress = Arc::new(RingBuffer::new(capacity.next_power_of_two()));
    let engine = MatchingEngine::new(arena.clone(), TradeDispatcher::new(), ingress.clone());
    (engine, arena, ingress)
}

pub fn submit(arena: &Arc<OrderArena>, ingress: &Arc<RingBuffer<Handle>>, order: Order) -> Handle {
    let handle = arena.allocate(order).unwrap();
    ingress.push(handle).unwrap();
    handle
}
