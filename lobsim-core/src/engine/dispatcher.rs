//! Routes matching engine trade reports to the ring buffer of the agent
//! that owns each side.

use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::types::{ClientRef, ExecutionType, Trade};
use crate::ring::RingBuffer;

/// Registry of attached agents' trade-report ingress rings, keyed by
/// [`ClientRef`]. Owned by the matching engine thread; agents attach once at
/// construction and detach on shutdown.
#[derive(Default)]
pub struct TradeDispatcher {
    clients: HashMap<ClientRef, Arc<RingBuffer<crate::engine::types::TradeInfo>>>,
}

impl TradeDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, client_ref: ClientRef, ring: Arc<RingBuffer<crate::engine::types::TradeInfo>>) {
        self.clients.insert(client_ref, ring);
    }

    pub fn detach(&mut self, client_ref: ClientRef) {
        self.clients.remove(&client_ref);
    }

    /// Splits `trade` into its two sides and pushes each to its owner's
    /// ring. The synthetic [`ExecutionType::Invalid`] side of a cancel is
    /// dropped here rather than delivered.
    pub fn push(&self, trade: Trade) {
        for info in [trade.ask_side, trade.bid_side] {
            if info.execution_type == ExecutionType::Invalid {
                continue;
            }
            if let Some(ring) = self.clients.get(&info.client_ref) {
                // A full ring drops the report; agents are expected to drain promptly.
                let _ = ring.push(info);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{OrderType, OrderSnapshot, Price, Side, TradeInfo};

    fn dummy_info(client_ref: ClientRef, execution_type: ExecutionType) -> TradeInfo {
        let snap = OrderSnapshot {
            id: 1,
            order_type: OrderType::Limit,
            client_ref,
            side: Side::Buy,
            price: 11000 as Price,
            initial_quantity: 10,
            remaining_quantity: 0,
            timestamp: 0,
        };
        TradeInfo {
            order_id: 1,
            order_type: OrderType::Limit,
            client_ref,
            side: Side::Buy,
            price: 11000,
            quantity: 10,
            counterparty: snap,
            execution_type,
        }
    }

    #[test]
    fn invalid_side_is_dropped() {
        let mut dispatcher = TradeDispatcher::new();
        let ring = Arc::new(RingBuffer::new(4));
        dispatcher.attach(1, ring.clone());
        dispatcher.attach(2, ring.clone());
        let trade = Trade::new(dummy_info(2, ExecutionType::Invalid), dummy_info(1, ExecutionType::Cancel));
        dispatcher.push(trade);
        assert_eq!(ring.pop().map(|i| i.execution_type), Some(ExecutionType::Cancel));
        assert!(ring.pop().is_none());
    }
}
