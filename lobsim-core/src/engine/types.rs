//! Core order, trade, and identifier types shared across the matching engine.

use crate::arena::{Handle, NULL_HANDLE};

pub type OrderId = u64;
/// Integer cents. Money never touches floating point in this crate.
pub type Price = i64;
pub type Quantity = u32;
pub type ClientRef = u64;
pub type Timestamp = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderType {
    Limit,
    Market,
    Cancel,
}

/// Outcome tag carried on each [`TradeInfo`] delivered to an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionType {
    /// Order was filled for less than its remaining quantity; it still rests.
    Partial,
    /// Order's remaining quantity reached zero.
    Full,
    /// Order was removed from the book without a fill.
    Cancel,
    /// Placeholder for the opposing side of a cancel; never delivered.
    Invalid,
}

/// A resting or in-flight order. Arena-allocated; `prev`/`next` are intrusive
/// FIFO links within its price level (`NULL_HANDLE` when absent).
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub order_type: OrderType,
    pub client_ref: ClientRef,
    pub side: Side,
    pub price: Price,
    pub initial_quantity: Quantity,
    pub remaining_quantity: Quantity,
    pub prev: Handle,
    pub next: Handle,
    pub timestamp: Timestamp,
}

impl Order {
    pub fn new_limit(
        id: OrderId,
        client_ref: ClientRef,
        side: Side,
        price: Price,
        quantity: Quantity,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id,
            order_type: OrderType::Limit,
            client_ref,
            side,
            price,
            initial_quantity: quantity,
            remaining_quantity: quantity,
            prev: NULL_HANDLE,
            next: NULL_HANDLE,
            timestamp,
        }
    }

    pub fn with_type(mut self, order_type: OrderType) -> Self {
        self.order_type = order_type;
        self
    }

    pub fn is_filled(&self) -> bool {
        self.remaining_quantity == 0
    }

    /// Fills `self` (the resting/counterparty order) against `incoming`,
    /// decrementing both by `min(remaining, remaining)` and returning the
    /// quantity filled.
    pub fn fill(&mut self, incoming: &mut Order) -> Quantity {
        let filled = self.remaining_quantity.min(incoming.remaining_quantity);
        self.remaining_quantity -= filled;
        incoming.remaining_quantity -= filled;
        filled
    }

    pub fn snapshot(&self) -> OrderSnapshot {
        OrderSnapshot {
            id: self.id,
            order_type: self.order_type,
            client_ref: self.client_ref,
            side: self.side,
            price: self.price,
            initial_quantity: self.initial_quantity,
            remaining_quantity: self.remaining_quantity,
            timestamp: self.timestamp,
        }
    }
}

/// Plain copy of an order's fields, detached from the arena. Embedded in
/// [`TradeInfo`] so a recipient can see the counterparty's order without
/// racing its possible deallocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSnapshot {
    pub id: OrderId,
    pub order_type: OrderType,
    pub client_ref: ClientRef,
    pub side: Side,
    pub price: Price,
    pub initial_quantity: Quantity,
    pub remaining_quantity: Quantity,
    pub timestamp: Timestamp,
}

/// One side of a [`Trade`]: what happened, to whom, and the counterparty's
/// order for reconciliation.
#[derive(Debug, Clone, Copy)]
pub struct TradeInfo {
    pub order_id: OrderId,
    pub order_type: OrderType,
    pub client_ref: ClientRef,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
    pub counterparty: OrderSnapshot,
    pub execution_type: ExecutionType,
}

/// A matching event, always carrying both counterparty reports. For a
/// cancel, the `opposite` side is [`ExecutionType::Invalid`] and must not be
/// delivered (see [`crate::engine::dispatcher::TradeDispatcher`]).
#[derive(Debug, Clone, Copy)]
pub struct Trade {
    pub ask_side: TradeInfo,
    pub bid_side: TradeInfo,
}

impl Trade {
    pub fn new(ask_side: TradeInfo, bid_side: TradeInfo) -> Self {
        Self { ask_side, bid_side }
    }

    /// The report addressed to `side`.
    pub fn for_side(&self, side: Side) -> &TradeInfo {
        match side {
            Side::Buy => &self.bid_side,
            Side::Sell => &self.ask_side,
        }
    }
}
