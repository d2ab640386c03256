//! The contract between an [`Agent`](crate::agent::runtime::Agent) and its
//! trading strategy, plus the closed set of concrete strategies.

use std::collections::HashMap;

use crate::arena::Handle;
use crate::engine::types::{OrderType, Price, Quantity, Side};

use super::strategies::{market_maker::MarketMakerStrategy, momentum::MomentumStrategy, random::RandomStrategy};

/// One order a strategy wants submitted; turned into an allocated [`Order`](crate::engine::types::Order)
/// and accounting update by the agent runtime.
#[derive(Debug, Clone, Copy)]
pub struct OrderRequest {
    pub order_type: OrderType,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
}

impl OrderRequest {
    pub fn limit(side: Side, price: Price, quantity: Quantity) -> Self {
        Self { order_type: OrderType::Limit, side, price, quantity }
    }

    /// `reserve_price` is a conservative ceiling (buy) or floor (sell) the
    /// submitting agent uses to size its submission-time reservation, since
    /// a market order carries no price of its own for the book to match on.
    pub fn market(side: Side, quantity: Quantity, reserve_price: Price) -> Self {
        Self { order_type: OrderType::Market, side, price: reserve_price, quantity }
    }
}

/// Either a new order or a cancel of one of the agent's own resting orders
/// (named by arena handle, which doubles as its order id).
#[derive(Debug, Clone, Copy)]
pub enum AgentAction {
    Submit(OrderRequest),
    Cancel(Handle),
}

#[derive(Debug, Clone, Copy)]
pub struct ActiveOrderInfo {
    pub side: Side,
    pub price: Price,
}

/// Read-only snapshot handed to a strategy each time it acts: current book
/// prices and the agent's own cash/inventory/active-order state. Strategies
/// never mutate engine state directly; they only return [`AgentAction`]s.
pub struct AgentView<'a> {
    pub best_bid: Option<Price>,
    pub best_ask: Option<Price>,
    pub cash_available: i64,
    pub units: i64,
    pub active_orders: &'a HashMap<Handle, ActiveOrderInfo>,
}

impl<'a> AgentView<'a> {
    /// Midpoint in cents, rounding down; `None` if either side is empty.
    pub fn mid_price(&self) -> Option<Price> {
        match (self.best_bid, self.best_ask) {
            (Some(bid), Some(ask)) => Some((bid + ask) / 2),
            _ => None,
        }
    }
}

pub trait TradingStrategy {
    fn act(&mut self, view: &AgentView) -> Vec<AgentAction>;
}

/// Closed set of strategy implementations, dispatched via `match` rather
/// than a trait object since the set is fixed.
pub enum Strategy {
    Random(RandomStrategy),
    MarketMaker(MarketMakerStrategy),
    Momentum(MomentumStrategy),
}

impl Strategy {
    pub fn act(&mut self, view: &AgentView) -> Vec<AgentAction> {
        match self {
            Strategy::Random(s) => s.act(view),
            Strategy::MarketMaker(s) => s.act(view),
            Strategy::Momentum(s) => s.act(view),
        }
    }

    /// Coarse strategy class, for grouping summary statistics by cohort.
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Random(_) => StrategyKind::Random,
            Strategy::MarketMaker(_) => StrategyKind::MarketMaker,
            Strategy::Momentum(_) => StrategyKind::Momentum,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Random,
    MarketMaker,
    Momentum,
}
