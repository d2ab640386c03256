mod common;

use crate::common::*;
use lobsim_core::engine::types::{ExecutionType, Side};

#[test]
fn crossing_limit_produces_full_full_trade() {
    let (mut engine, arena, ingress) = new_engine();
    attach_client(&mut engine, 1);
    let buyer_ring = attach_client(&mut engine, 2);

    submit_limit(&arena, &ingress, 1, Side::Buy, 11000, 10, 0);
    drain(&mut engine);
    assert_eq!(engine.book_handle().read().best_bid_price(), Some(11000));

    submit_limit(&arena, &ingress, 2, Side::Sell, 11000, 10, 1);
    drain(&mut engine);

    assert_eq!(engine.book_handle().read().best_bid_price(), None);
    assert_eq!(engine.book_handle().read().best_ask_price(), None);

    let buyer_reports = drain_ring(&buyer_ring);
    assert_eq!(buyer_reports.len(), 1);
    assert_eq!(buyer_reports[0].execution_type, ExecutionType::Full);
    assert_eq!(buyer_reports[0].quantity, 10);
    assert_eq!(buyer_reports[0].price, 11000);
}

#[test]
fn partial_fill_leaves_buyer_resting_with_remainder() {
    let (mut engine, arena, ingress) = new_engine();
    let seller_ring = attach_client(&mut engine, 1);
    attach_client(&mut engine, 2);

    submit_limit(&arena, &ingress, 1, Side::Buy, 11000, 15, 0);
    drain(&mut engine);
    submit_limit(&arena, &ingress, 2, Side::Sell, 11000, 10, 1);
    drain(&mut engine);

    let seller_reports = drain_ring(&seller_ring);
    assert_eq!(seller_reports.len(), 1);
    assert_eq!(seller_reports[0].execution_type, ExecutionType::Full);

    let remaining_handle = engine.book_handle().read().best_handle(Side::Buy).unwrap();
    let remaining = arena.get(remaining_handle).read(|o| o.remaining_quantity);
    assert_eq!(remaining, 5);
    assert_eq!(engine.book_handle().read().best_bid_price(), Some(11000));
}

#[test]
fn resting_limit_does_not_fill_without_a_cross() {
    let (mut engine, arena, ingress) = new_engine();
    submit_limit(&arena, &ingress, 1, Side::Buy, 10990, 10, 0);
    drain(&mut engine);
    submit_limit(&arena, &ingress, 2, Side::Sell, 11010, 10, 1);
    drain(&mut engine);

    assert_eq!(engine.book_handle().read().best_bid_price(), Some(10990));
    assert_eq!(engine.book_handle().read().best_ask_price(), Some(11010));
}

#[test]
fn price_time_priority_fills_earlier_agent_first() {
    let (mut engine, arena, ingress) = new_engine();
    let agent_a_ring = attach_client(&mut engine, 1);
    let agent_b_ring = attach_client(&mut engine, 2);
    attach_client(&mut engine, 3);

    submit_limit(&arena, &ingress, 1, Side::Buy, 11000, 10, 0);
    drain(&mut engine);
    submit_limit(&arena, &ingress, 2, Side::Buy, 11000, 10, 1);
    drain(&mut engine);
    submit_limit(&arena, &ingress, 3, Side::Sell, 11000, 15, 2);
    drain(&mut engine);

    let a_reports = drain_ring(&agent_a_ring);
    assert_eq!(a_reports.len(), 1);
    assert_eq!(a_reports[0].execution_type, ExecutionType::Full);

    let b_reports = drain_ring(&agent_b_ring);
    assert_eq!(b_reports.len(), 1);
    assert_eq!(b_reports[0].execution_type, ExecutionType::Partial);
    assert_eq!(b_reports[0].quantity, 5);

    let remaining_handle = engine.book_handle().read().best_handle(Side::Buy).unwrap();
    let (client_ref, remaining) = arena.get(remaining_handle).read(|o| (o.client_ref, o.remaining_quantity));
    assert_eq!(client_ref, 2, "agent B's order should still be resting as head");
    assert_eq!(remaining, 5);
}
