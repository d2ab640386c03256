mod common;

use crate::common::*;
use lobsim_core::engine::types::{ExecutionType, Side};

#[test]
fn market_buy_sweeps_multiple_ask_levels() {
    let (mut engine, arena, ingress) = new_engine();
    attach_client(&mut engine, 1);
    attach_client(&mut engine, 2);
    let buyer_ring = attach_client(&mut engine, 3);

    submit_limit(&arena, &ingress, 1, Side::Sell, 11000, 10, 0);
    drain(&mut engine);
    submit_limit(&arena, &ingress, 2, Side::Sell, 11001, 10, 1);
    drain(&mut engine);

    submit_market(&arena, &ingress, 3, Side::Buy, 15, 2);
    drain(&mut engine);

    let buyer_reports = drain_ring(&buyer_ring);
    assert_eq!(buyer_reports.len(), 2);
    assert_eq!(buyer_reports[0].price, 11000);
    assert_eq!(buyer_reports[0].quantity, 10);
    assert_eq!(buyer_reports[1].price, 11001);
    assert_eq!(buyer_reports[1].quantity, 5);
    assert_eq!(buyer_reports[1].execution_type, ExecutionType::Full);

    assert_eq!(engine.book_handle().read().best_ask_price(), Some(11001));
    let remaining_handle = engine.book_handle().read().best_handle(Side::Sell).unwrap();
    let remaining = arena.get(remaining_handle).read(|o| o.remaining_quantity);
    assert_eq!(remaining, 5);
}

#[test]
fn market_order_on_empty_book_is_cancelled() {
    let (mut engine, arena, ingress) = new_engine();
    let buyer_ring = attach_client(&mut engine, 1);

    submit_market(&arena, &ingress, 1, Side::Buy, 10, 0);
    drain(&mut engine);

    let reports = drain_ring(&buyer_ring);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].execution_type, ExecutionType::Cancel);
    assert_eq!(reports[0].quantity, 0);

    assert_eq!(engine.book_handle().read().best_bid_price(), None);
    assert_eq!(engine.book_handle().read().best_ask_price(), None);
}

#[test]
fn market_sell_partially_filled_then_cancelled_for_remainder() {
    let (mut engine, arena, ingress) = new_engine();
    attach_client(&mut engine, 1);
    let seller_ring = attach_client(&mut engine, 2);

    submit_limit(&arena, &ingress, 1, Side::Buy, 11000, 4, 0);
    drain(&mut engine);

    submit_market(&arena, &ingress, 2, Side::Sell, 10, 1);
    drain(&mut engine);

    let reports = drain_ring(&seller_ring);
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].execution_type, ExecutionType::Partial);
    assert_eq!(reports[0].quantity, 4);
    assert_eq!(reports[1].execution_type, ExecutionType::Cancel);
    assert_eq!(reports[1].quantity, 0, "unfilled market remainder carries no quantity on its cancel report");

    assert_eq!(engine.book_handle().read().best_bid_price(), None);
}
