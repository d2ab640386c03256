//! Momentum trader: crosses the market with a market order once a short
//! moving average of the midpoint diverges from a longer one by more than a
//! threshold. Never cancels — once sent, a market order is already resolved
//! by the time the next decision point arrives.

use crate::agent::strategy::{AgentAction, AgentView, TradingStrategy};
use crate::agent::strategy::OrderRequest;
use crate::engine::types::{Price, Quantity, Side};

const SHORT_WINDOW: usize = 32;
const LONG_WINDOW: usize = 256;
const ORDER_QUANTITY: Quantity = 10;

/// Conservative ceiling/floor price (cents) a market order reserves against
/// at submission, since it carries no price of its own; matches the
/// top/bottom of the configured price ladder.
const PRICE_CEILING_CENTS: i64 = 12_000;
const PRICE_FLOOR_CENTS: i64 = 10_000;
const MIN_UNITS_TO_SELL: i64 = 10;

/// Fixed-capacity moving average with O(1) push via a running sum, auto
/// evicting the oldest sample once the window is full.
struct MovingWindow<const N: usize> {
    buffer: [f64; N],
    head: usize,
    filled: usize,
    sum: f64,
}

impl<const N: usize> MovingWindow<N> {
    fn new() -> Self {
        Self { buffer: [0.0; N], head: 0, filled: 0, sum: 0.0 }
    }

    fn push(&mut self, value: f64) {
        if self.filled < N {
            self.buffer[self.head] = value;
            self.sum += value;
            self.filled += 1;
        } else {
            let oldest = self.buffer[self.head];
            self.sum += value - oldest;
            self.buffer[self.head] = value;
        }
        self.head = (self.head + 1) % N;
    }

    fn is_full(&self) -> bool {
        self.filled == N
    }

    fn average(&self) -> f64 {
        self.sum / N as f64
    }
}

pub struct MomentumStrategy {
    threshold: f64,
    short: MovingWindow<SHORT_WINDOW>,
    long: MovingWindow<LONG_WINDOW>,
}

impl MomentumStrategy {
    pub fn new(threshold: Price) -> Self {
        Self { threshold: threshold as f64, short: MovingWindow::new(), long: MovingWindow::new() }
    }
}

impl TradingStrategy for MomentumStrategy {
    fn act(&mut self, view: &AgentView) -> Vec<AgentAction> {
        let Some(mid) = view.mid_price() else {
            return Vec::new();
        };

        self.short.push(mid as f64);
        self.long.push(mid as f64);

        if !self.short.is_full() || !self.long.is_full() {
            return Vec::new();
        }

        let short_ma = self.short.average();
        let long_ma = self.long.average();

        if short_ma - long_ma > self.threshold && view.cash_available > ORDER_QUANTITY as i64 * PRICE_CEILING_CENTS {
            return vec![AgentAction::Submit(OrderRequest::market(Side::Buy, ORDER_QUANTITY, PRICE_CEILING_CENTS))];
        }
        if long_ma - short_ma > self.threshold && view.units > MIN_UNITS_TO_SELL {
            return vec![AgentAction::Submit(OrderRequest::market(Side::Sell, ORDER_QUANTITY, PRICE_FLOOR_CENTS))];
        }
        Vec::new()
    }
}
