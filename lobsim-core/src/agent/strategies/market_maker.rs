//! Market maker: quotes a symmetric buy/sell pair around the book midpoint
//! and withdraws stale quotes once the midpoint has drifted.

use crate::agent::strategy::{AgentAction, AgentView, OrderRequest, TradingStrategy};
use crate::engine::types::{Price, Quantity, Side};

const ORDER_QUANTITY: Quantity = 10;
const MIN_UNITS_TO_QUOTE: i64 = 10;

pub struct MarketMakerStrategy {
    spread: Price,
    last_mid_price: Option<Price>,
}

impl MarketMakerStrategy {
    pub fn new(spread: Price) -> Self {
        Self { spread, last_mid_price: None }
    }
}

impl TradingStrategy for MarketMakerStrategy {
    fn act(&mut self, view: &AgentView) -> Vec<AgentAction> {
        let mut actions = Vec::new();

        let Some(mid) = view.mid_price() else {
            return actions;
        };

        let half_spread = self.spread / 2;
        let ask_price = mid + half_spread;
        let bid_price = mid - half_spread;

        if view.units > MIN_UNITS_TO_QUOTE && view.cash_available > bid_price * ORDER_QUANTITY as i64 {
            actions.push(AgentAction::Submit(OrderRequest::limit(Side::Buy, bid_price, ORDER_QUANTITY)));
            actions.push(AgentAction::Submit(OrderRequest::limit(Side::Sell, ask_price, ORDER_QUANTITY)));
        }

        if let Some(last_mid) = self.last_mid_price {
            if (mid - last_mid).abs() > self.spread {
                for (&handle, info) in view.active_orders {
                    if (info.price - mid).abs() > self.spread * 2 {
                        actions.push(AgentAction::Cancel(handle));
                    }
                }
            }
        }

        self.last_mid_price = Some(mid);
        actions
    }
}
