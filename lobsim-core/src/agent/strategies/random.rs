//! Noise trader: quotes a single limit order around the book midpoint (or a
//! fixed fallback when the book is empty) and occasionally cancels its own
//! resting orders.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::agent::strategy::{AgentAction, AgentView, OrderRequest, TradingStrategy};
use crate::engine::types::{Price, Quantity, Side};

/// Midpoint used when the book has no bid or ask yet, in cents.
const FALLBACK_MID_PRICE: Price = 11_000;
const ORDER_QUANTITY: Quantity = 10;
const CANCEL_PROBABILITY: f64 = 0.05;

pub struct RandomStrategy {
    sigma: f64,
    rng: SmallRng,
}

impl RandomStrategy {
    pub fn new(sigma: Price) -> Self {
        Self {
            sigma: sigma as f64,
            rng: SmallRng::from_os_rng(),
        }
    }
}

impl TradingStrategy for RandomStrategy {
    fn act(&mut self, view: &AgentView) -> Vec<AgentAction> {
        let mut actions = Vec::new();

        let mid = view.mid_price().unwrap_or(FALLBACK_MID_PRICE);
        let side = if self.rng.random_bool(0.5) { Side::Buy } else { Side::Sell };
        let offset = Normal::new(0.0, self.sigma).unwrap().sample(&mut self.rng);
        let price = (mid as f64 + offset).round() as Price;

        let skip = match side {
            Side::Buy => view.cash_available < price,
            Side::Sell => view.units < 1,
        };
        if !skip {
            actions.push(AgentAction::Submit(OrderRequest::limit(side, price, ORDER_QUANTITY)));
        }

        for &handle in view.active_orders.keys() {
            if self.rng.random_bool(CANCEL_PROBABILITY) {
                actions.push(AgentAction::Cancel(handle));
            }
        }

        actions
    }
}
