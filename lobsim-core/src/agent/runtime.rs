//! The agent: owns a [`Strategy`], its cash/inventory accounting, and the
//! rings connecting it to the matching engine.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::arena::{Handle, OrderArena};
use crate::engine::book::OrderBook;
use crate::engine::types::{
    ClientRef, ExecutionType, Order, OrderType, Price, Quantity, Side, Timestamp, TradeInfo,
};
use crate::ring::RingBuffer;

use super::strategy::{ActiveOrderInfo, AgentAction, AgentView, OrderRequest, Strategy};

/// What the agent itself remembers about one of its resting orders, beyond
/// the `{side, price}` a strategy is shown: enough to reverse the cash/unit
/// reservation made at submission when a fill or cancel report arrives.
struct OpenOrder {
    side: Side,
    price: Price,
    remaining: Quantity,
}

/// One simulated trader. `client_ref` addresses this agent's trade egress
/// ring in the [`TradeDispatcher`](crate::engine::dispatcher::TradeDispatcher).
pub struct Agent {
    pub client_ref: ClientRef,
    pub rate: f64,
    strategy: Strategy,
    arena: Arc<OrderArena>,
    ingress: Arc<RingBuffer<Handle>>,
    trades: Arc<RingBuffer<TradeInfo>>,
    book: Arc<RwLock<OrderBook>>,
    active_orders: HashMap<Handle, OpenOrder>,
    cash_available: i64,
    cash_reserved: i64,
    units: i64,
}

impl Agent {
    pub fn new(
        client_ref: ClientRef,
        strategy: Strategy,
        rate: f64,
        arena: Arc<OrderArena>,
        ingress: Arc<RingBuffer<Handle>>,
        trades: Arc<RingBuffer<TradeInfo>>,
        book: Arc<RwLock<OrderBook>>,
        starting_cash: i64,
        starting_units: i64,
    ) -> Self {
        Self {
            client_ref,
            rate,
            strategy,
            arena,
            ingress,
            trades,
            book,
            active_orders: HashMap::new(),
            cash_available: starting_cash,
            cash_reserved: 0,
            units: starting_units,
        }
    }

    pub fn cash_available(&self) -> i64 {
        self.cash_available
    }

    pub fn cash_total(&self) -> i64 {
        self.cash_available + self.cash_reserved
    }

    pub fn units(&self) -> i64 {
        self.units
    }

    pub fn kind(&self) -> super::strategy::StrategyKind {
        self.strategy.kind()
    }

    /// Consults the strategy for this tick's actions. Does not apply them;
    /// call [`Agent::apply`] for each one returned.
    pub fn act(&mut self) -> Vec<AgentAction> {
        let (best_bid, best_ask) = {
            let book = self.book.read();
            (book.best_bid_price(), book.best_ask_price())
        };
        let view_orders: HashMap<Handle, ActiveOrderInfo> = self
            .active_orders
            .iter()
            .map(|(&handle, open)| (handle, ActiveOrderInfo { side: open.side, price: open.price }))
            .collect();
        let view = AgentView {
            best_bid,
            best_ask,
            cash_available: self.cash_available,
            units: self.units,
            active_orders: &view_orders,
        };
        self.strategy.act(&view)
    }

    pub fn apply(&mut self, action: AgentAction, now: Timestamp) {
        match action {
            AgentAction::Submit(request) => self.submit(request, now),
            AgentAction::Cancel(handle) => self.cancel(handle, now),
        }
    }

    /// Allocates the order, applies submission-side accounting (reserves cash
    /// for a buy — at its limit price, or at its ceiling/floor placeholder
    /// for a market order, which carries no price of its own — and removes
    /// units for any sell), and pushes it to the engine's ingress ring.
    /// Silently drops the order if the arena or ring is momentarily
    /// exhausted; the agent simply tries again next tick.
    fn submit(&mut self, request: OrderRequest, now: Timestamp) {
        let order = Order::new_limit(0, self.client_ref, request.side, request.price, request.quantity, now)
            .with_type(request.order_type);
        let Ok(handle) = self.arena.allocate(order) else {
            return;
        };

        match request.side {
            Side::Buy => {
                let reserved = request.price * request.quantity as i64;
                self.cash_available -= reserved;
                self.cash_reserved += reserved;
            }
            Side::Sell => {
                self.units -= request.quantity as i64;
            }
        }

        self.active_orders.insert(
            handle,
            OpenOrder { side: request.side, price: request.price, remaining: request.quantity },
        );

        if self.ingress.push(handle).is_err() {
            self.active_orders.remove(&handle);
            self.arena.deallocate(handle);
        }
    }

    /// Submits a CANCEL naming `handle` directly, since the order id the
    /// engine will look up is the handle itself.
    fn cancel(&mut self, handle: Handle, now: Timestamp) {
        let mut cancel_order = Order::new_limit(handle as u64, self.client_ref, Side::Buy, 0, 0, now);
        cancel_order.order_type = OrderType::Cancel;
        if let Ok(cancel_handle) = self.arena.allocate(cancel_order) {
            if self.ingress.push(cancel_handle).is_err() {
                self.arena.deallocate(cancel_handle);
            }
        }
    }

    /// Drains every trade report waiting on this agent's egress ring,
    /// applying execution-side accounting for each. Used both for the
    /// per-tick incoming loop and the final shutdown drain.
    pub fn drain_trades(&mut self) -> usize {
        let mut drained = 0;
        while let Some(report) = self.trades.pop() {
            self.apply_trade(report);
            drained += 1;
        }
        drained
    }

    fn apply_trade(&mut self, report: TradeInfo) {
        if report.execution_type == ExecutionType::Invalid {
            return;
        }
        let handle = report.order_id as Handle;

        match report.execution_type {
            ExecutionType::Partial | ExecutionType::Full => {
                if let Some(open) = self.active_orders.get_mut(&handle) {
                    open.remaining = open.remaining.saturating_sub(report.quantity);
                    match report.side {
                        Side::Buy => {
                            let released = open.price * report.quantity as i64;
                            let actual_cost = report.price * report.quantity as i64;
                            self.cash_reserved -= released;
                            self.cash_available += released - actual_cost;
                            self.units += report.quantity as i64;
                        }
                        Side::Sell => {
                            self.cash_available += report.price * report.quantity as i64;
                        }
                    }
                }
                if report.execution_type == ExecutionType::Full {
                    self.active_orders.remove(&handle);
                }
            }
            ExecutionType::Cancel => {
                if let Some(open) = self.active_orders.remove(&handle) {
                    match open.side {
                        Side::Buy => {
                            let released = open.price * open.remaining as i64;
                            self.cash_reserved -= released;
                            self.cash_available += released;
                        }
                        Side::Sell => {
                            self.units += open.remaining as i64;
                        }
                    }
                }
            }
            ExecutionType::Invalid => {}
        }
    }
}
