mod common;

use crate::common::*;
use lobsim_core::arena::OrderArena;
use lobsim_core::engine::dispatcher::TradeDispatcher;
use lobsim_core::engine::matching::MatchingEngine;
use lobsim_core::engine::types::Side;
use lobsim_core::ring::RingBuffer;
use rand::Rng;
use std::sync::Arc;

const STRESS_ARENA_CAPACITY: usize = 1 << 17;
const STRESS_RING_CAPACITY: usize = 1 << 17;

fn stress_engine() -> (MatchingEngine, Arc<OrderArena>, Arc<RingBuffer<lobsim_core::arena::Handle>>) {
    let arena = Arc::new(OrderArena::new(STRESS_ARENA_CAPACITY));
    let ingress = Arc::new(RingBuffer::new(STRESS_RING_CAPACITY));
    let engine = MatchingEngine::new(arena.clone(), TradeDispatcher::new(), ingress.clone());
    (engine, arena, ingress)
}

#[test]
fn massive_one_sided_insertion_keeps_every_order_resting() {
    let (mut engine, arena, ingress) = stress_engine();
    for i in 0..50_000u64 {
        submit_limit(&arena, &ingress, i, Side::Buy, 10_000 + (i % 1_000) as i64, 10, 1_000 + i);
        engine.process_next();
    }
    assert_eq!(arena.len(), 50_000);
}

#[test]
fn massive_random_cancellation_never_panics() {
    let (mut engine, arena, ingress) = stress_engine();
    let mut handles = Vec::with_capacity(30_000);
    for i in 0..30_000u64 {
        let handle = submit_limit(&arena, &ingress, i, Side::Sell, 10_500 + (i % 500) as i64, 10, 2_000 + i);
        engine.process_next();
        handles.push(handle);
    }

    let mut rng = rand::rng();
    for i in 0..15_000u64 {
        let target = handles[rng.random_range(0..handles.len())];
        submit_cancel(&arena, &ingress, target, i, 3_000 + i);
        engine.process_next();
    }

    assert!(arena.len() <= 30_000);
}

#[test]
fn massive_crossing_matches_without_panicking_and_drains_to_consistent_state() {
    let (mut engine, arena, ingress) = stress_engine();
    for i in 0..20_000u64 {
        submit_limit(&arena, &ingress, i, Side::Sell, 10_500 + (i % 500) as i64, 10, 3_000 + i);
    }
    for i in 20_000..40_000u64 {
        submit_limit(&arena, &ingress, i, Side::Buy, 11_500, 10, 4_000 + i);
    }
    drain(&mut engine);

    let book = engine.book_handle();
    if let Some(bid) = book.read().best_bid_price() {
        if let Some(ask) = book.read().best_ask_price() {
            assert!(bid < ask, "no resting cross should survive a full drain");
        }
    }
}
