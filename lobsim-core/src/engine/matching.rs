//! Limit/market/cancel order processing against the [`OrderBook`].

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::arena::{Handle, OrderArena};
use crate::engine::book::OrderBook;
use crate::engine::dispatcher::TradeDispatcher;
use crate::engine::types::{
    ExecutionType, Order, OrderId, OrderType, Quantity, Side, Trade, TradeInfo,
};
use crate::ring::RingBuffer;

/// Single-threaded matching loop: this instance is the sole mutator of the
/// book and sole consumer of `ingress`. The book itself lives behind a
/// `RwLock` so agent strategies on other threads can take read locks to
/// query best bid/ask without going through the engine.
pub struct MatchingEngine {
    book: Arc<RwLock<OrderBook>>,
    arena: Arc<OrderArena>,
    dispatcher: TradeDispatcher,
    ingress: Arc<RingBuffer<Handle>>,
}

impl MatchingEngine {
    pub fn new(
        arena: Arc<OrderArena>,
        dispatcher: TradeDispatcher,
        ingress: Arc<RingBuffer<Handle>>,
    ) -> Self {
        let book = Arc::new(RwLock::new(OrderBook::new(arena.clone())));
        Self {
            book,
            arena,
            dispatcher,
            ingress,
        }
    }

    pub fn dispatcher_mut(&mut self) -> &mut TradeDispatcher {
        &mut self.dispatcher
    }

    /// A shared read-only handle to the book, for strategies to query best
    /// bid/ask concurrently with the engine thread.
    pub fn book_handle(&self) -> Arc<RwLock<OrderBook>> {
        self.book.clone()
    }

    /// Pops and processes one ingress message. Returns `false` when the
    /// ring was empty (caller should yield/spin).
    pub fn process_next(&mut self) -> bool {
        let Some(handle) = self.ingress.pop() else {
            return false;
        };
        let order_type = self.arena.get(handle).read(|o| o.order_type);
        match order_type {
            OrderType::Cancel => self.process_cancel(handle),
            OrderType::Limit => {
                self.assign_order_id(handle);
                self.match_limit(handle);
            }
            OrderType::Market => {
                self.assign_order_id(handle);
                self.match_market(handle);
            }
        }
        true
    }

    /// Derives the order id deterministically from the arena handle. The
    /// handle is already known to the agent that allocated the order, so
    /// this lets a later cancel address the same id without a round trip
    /// back through the engine.
    fn assign_order_id(&mut self, handle: Handle) {
        self.arena.get(handle).update(|o| o.id = handle as OrderId);
        debug!(order_id = handle, "assigned order id");
    }

    fn match_limit(&mut self, incoming: Handle) {
        loop {
            let (side, remaining) = self.arena.get(incoming).read(|o| (o.side, o.remaining_quantity));
            if remaining == 0 {
                self.arena.deallocate(incoming);
                return;
            }
            let opposite = side.opposite();
            let Some(resting) = self.book.read().best_handle(opposite) else {
                self.book.write().add_order(incoming);
                return;
            };
            let resting_price = self.arena.get(resting).read(|o| o.price);
            let order_price = self.arena.get(incoming).read(|o| o.price);
            let crosses = match side {
                Side::Buy => resting_price <= order_price,
                Side::Sell => resting_price >= order_price,
            };
            if !crosses {
                self.book.write().add_order(incoming);
                return;
            }
            self.execute_fill(resting, incoming);
        }
    }

    fn match_market(&mut self, incoming: Handle) {
        loop {
            let remaining = self.arena.get(incoming).read(|o| o.remaining_quantity);
            if remaining == 0 {
                self.arena.deallocate(incoming);
                return;
            }
            let side = self.arena.get(incoming).read(|o| o.side);
            let Some(resting) = self.book.read().best_handle(side.opposite()) else {
                self.cancel_unfilled_market(incoming);
                return;
            };
            self.execute_fill(resting, incoming);
        }
    }

    /// No liquidity was available to satisfy the remainder of a market
    /// order: the residual is withdrawn and the submitter gets a CANCEL
    /// report, without ever inserting the exhausted order into the book.
    fn cancel_unfilled_market(&mut self, incoming: Handle) {
        let order = self.arena.deallocate(incoming);
        let report = TradeInfo {
            order_id: order.id,
            order_type: order.order_type,
            client_ref: order.client_ref,
            side: order.side,
            price: order.price,
            quantity: 0,
            counterparty: order.snapshot(),
            execution_type: ExecutionType::Cancel,
        };
        self.dispatcher.push(one_sided_trade(order.side, report));
    }

    fn process_cancel(&mut self, cancel_handle: Handle) {
        let target_id = self.arena.get(cancel_handle).read(|o| o.id);
        self.arena.deallocate(cancel_handle);

        let Some(target_handle) = self.book.read().handle_for(target_id) else {
            // Legal race: the target was already filled or cancelled.
            return;
        };
        self.book.write().remove_order(target_handle);
        let target = self.arena.deallocate(target_handle);
        let report = TradeInfo {
            order_id: target.id,
            order_type: target.order_type,
            client_ref: target.client_ref,
            side: target.side,
            price: target.price,
            quantity: target.remaining_quantity,
            counterparty: target.snapshot(),
            execution_type: ExecutionType::Cancel,
        };
        self.dispatcher.push(one_sided_trade(target.side, report));
    }

    fn execute_fill(&mut self, resting: Handle, incoming: Handle) {
        let (filled, resting_after, incoming_after) = self.arena.fill_pair(resting, incoming);
        debug!(filled, resting, incoming, "matched orders");
        self.dispatcher.push(build_trade(filled, &resting_after, &incoming_after));
        if resting_after.remaining_quantity == 0 {
            self.book.write().remove_order(resting);
            self.arena.deallocate(resting);
        }
    }
}

fn execution_type(order: &Order) -> ExecutionType {
    if order.remaining_quantity == 0 {
        ExecutionType::Full
    } else {
        ExecutionType::Partial
    }
}

/// Builds the two-sided trade report for a fill. Price is always taken from
/// the resting (book) side, matching price-time priority semantics.
fn build_trade(filled: Quantity, resting: &Order, incoming: &Order) -> Trade {
    let (ask_order, bid_order) = match incoming.side {
        Side::Buy => (resting, incoming),
        Side::Sell => (incoming, resting),
    };
    let ask_info = TradeInfo {
        order_id: ask_order.id,
        order_type: ask_order.order_type,
        client_ref: ask_order.client_ref,
        side: Side::Sell,
        price: resting.price,
        quantity: filled,
        counterparty: bid_order.snapshot(),
        execution_type: execution_type(ask_order),
    };
    let bid_info = TradeInfo {
        order_id: bid_order.id,
        order_type: bid_order.order_type,
        client_ref: bid_order.client_ref,
        side: Side::Buy,
        price: resting.price,
        quantity: filled,
        counterparty: ask_order.snapshot(),
        execution_type: execution_type(bid_order),
    };
    Trade::new(ask_info, bid_info)
}

/// Wraps a single real report with an [`ExecutionType::Invalid`] placeholder
/// on the opposite side, which [`TradeDispatcher`] drops before delivery.
fn one_sided_trade(real_side: Side, report: TradeInfo) -> Trade {
    let placeholder = TradeInfo {
        order_id: 0,
        order_type: OrderType::Cancel,
        client_ref: 0,
        side: real_side.opposite(),
        price: report.price,
        quantity: 0,
        counterparty: report.counterparty,
        execution_type: ExecutionType::Invalid,
    };
    match real_side {
        Side::Buy => Trade::new(placeholder, report),
        Side::Sell => Trade::new(report, placeholder),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::Order;

    fn engine() -> (MatchingEngine, Arc<OrderArena>, Arc<RingBuffer<Handle>>) {
        let arena = Arc::new(OrderArena::new(64));
        let ingress = Arc::new(RingBuffer::new(16));
        let engine = MatchingEngine::new(arena.clone(), TradeDispatcher::new(), ingress.clone());
        (engine, arena, ingress)
    }

    fn submit(arena: &Arc<OrderArena>, ingress: &Arc<RingBuffer<Handle>>, order: Order) -> Handle {
        let handle = arena.allocate(order).unwrap();
        ingress.push(handle).unwrap();
        handle
    }

    #[test]
    fn crossing_limit_orders_fill_fully() {
        let (mut engine, arena, ingress) = engine();
        submit(&arena, &ingress, Order::new_limit(0, 1, Side::Buy, 11000, 10, 0));
        engine.process_next();
        assert_eq!(engine.book_handle().read().best_bid_price(), Some(11000));

        submit(&arena, &ingress, Order::new_limit(0, 2, Side::Sell, 11000, 10, 1));
        engine.process_next();
        assert_eq!(engine.book_handle().read().best_bid_price(), None);
        assert_eq!(engine.book_handle().read().best_ask_price(), None);
    }

    #[test]
    fn partial_fill_leaves_remainder_resting() {
        let (mut engine, arena, ingress) = engine();
        submit(&arena, &ingress, Order::new_limit(0, 1, Side::Buy, 11000, 15, 0));
        engine.process_next();
        submit(&arena, &ingress, Order::new_limit(0, 2, Side::Sell, 11000, 10, 1));
        engine.process_next();
        let remaining_handle = engine.book_handle().read().best_handle(Side::Buy).unwrap();
        let remaining = arena.get(remaining_handle).read(|o| o.remaining_quantity);
        assert_eq!(remaining, 5);
    }

    #[test]
    fn market_order_without_liquidity_is_cancelled() {
        let (mut engine, arena, ingress) = engine();
        let handle = submit(
            &arena,
            &ingress,
            Order::new_limit(0, 1, Side::Buy, 0, 10, 0).with_type(OrderType::Market),
        );
        engine.process_next();
        assert_eq!(engine.book_handle().read().best_bid_price(), None);
        assert_eq!(engine.book_handle().read().best_ask_price(), None);
        let _ = handle;
    }

    #[test]
    fn cancel_unknown_order_is_a_silent_noop() {
        let (mut engine, arena, ingress) = engine();
        let mut cancel = Order::new_limit(999, 1, Side::Buy, 0, 0, 0);
        cancel.order_type = OrderType::Cancel;
        submit(&arena, &ingress, cancel);
        engine.process_next();
    }

    #[test]
    fn price_time_priority_fills_earlier_order_first() {
        let (mut engine, arena, ingress) = engine();
        submit(&arena, &ingress, Order::new_limit(0, 1, Side::Buy, 11000, 10, 0));
        engine.process_next();
        submit(&arena, &ingress, Order::new_limit(0, 2, Side::Buy, 11000, 10, 1));
        engine.process_next();
        submit(&arena, &ingress, Order::new_limit(0, 3, Side::Sell, 11000, 15, 2));
        engine.process_next();
        let remaining_handle = engine.book_handle().read().best_handle(Side::Buy).unwrap();
        let (client_ref, remaining) = arena.get(remaining_handle).read(|o| (o.client_ref, o.remaining_quantity));
        assert_eq!(client_ref, 2, "agent 1's order should have filled completely first");
        assert_eq!(remaining, 5);
    }
}
