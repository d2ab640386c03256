//! Price-time-priority limit order book: a dense array of price levels, each
//! an intrusive FIFO of arena handles, indexed by a bitmap for O(1) best-bid
//! and best-ask discovery.

use std::sync::Arc;

use crate::arena::{Handle, OrderArena, NULL_HANDLE};
use crate::engine::types::{Order, OrderId, Price, Side};
use crate::hashmap::FlatHashMap;

/// Number of discrete price levels covered by the ladder (100.00 .. 120.00 at 1-cent ticks).
pub const MAX_PRICE_LEVELS: usize = 2001;
const BITMAP_WORDS: usize = (MAX_PRICE_LEVELS + 63) / 64;
const INVALID_PRICE_LEVEL_INDEX: u64 = u64::MAX;
const ORDER_INDEX_CAPACITY: usize = 1 << 16;

#[derive(Clone, Copy, Default)]
struct PriceLevel {
    head: Handle,
    tail: Handle,
}

impl PriceLevel {
    fn empty_level() -> Self {
        Self { head: NULL_HANDLE, tail: NULL_HANDLE }
    }

    fn is_empty(&self) -> bool {
        self.head == NULL_HANDLE
    }
}

/// Dense price ladder for one side plus the reverse order-id index, shared
/// by both sides of the book.
pub struct OrderBook {
    min_price: Price,
    tick: Price,
    bids: Vec<PriceLevel>,
    asks: Vec<PriceLevel>,
    bids_bitmap: [u64; BITMAP_WORDS],
    asks_bitmap: [u64; BITMAP_WORDS],
    best_bid_index: u64,
    best_ask_index: u64,
    order_index: FlatHashMap<OrderId, Handle>,
    arena: Arc<OrderArena>,
}

impl OrderBook {
    pub fn new(arena: Arc<OrderArena>) -> Self {
        Self::with_range(arena, 10_000, 1)
    }

    /// `min_price`/`tick` are in cents; `tick` must evenly divide the ladder width.
    pub fn with_range(arena: Arc<OrderArena>, min_price: Price, tick: Price) -> Self {
        Self {
            min_price,
            tick,
            bids: vec![PriceLevel::empty_level(); MAX_PRICE_LEVELS],
            asks: vec![PriceLevel::empty_level(); MAX_PRICE_LEVELS],
            bids_bitmap: [0; BITMAP_WORDS],
            asks_bitmap: [0; BITMAP_WORDS],
            best_bid_index: INVALID_PRICE_LEVEL_INDEX,
            best_ask_index: INVALID_PRICE_LEVEL_INDEX,
            order_index: FlatHashMap::new(ORDER_INDEX_CAPACITY),
            arena,
        }
    }

    pub fn price_to_index(&self, price: Price) -> u64 {
        let max_price = self.min_price + (MAX_PRICE_LEVELS as i64 - 1) * self.tick;
        let clamped = price.clamp(self.min_price, max_price);
        ((clamped - self.min_price) / self.tick) as u64
    }

    pub fn index_to_price(&self, index: u64) -> Price {
        let clamped = index.min(MAX_PRICE_LEVELS as u64 - 1);
        self.min_price + clamped as i64 * self.tick
    }

    pub fn best_bid(&self) -> Option<u64> {
        (self.best_bid_index != INVALID_PRICE_LEVEL_INDEX).then_some(self.best_bid_index)
    }

    pub fn best_ask(&self) -> Option<u64> {
        (self.best_ask_index != INVALID_PRICE_LEVEL_INDEX).then_some(self.best_ask_index)
    }

    pub fn best_bid_price(&self) -> Option<Price> {
        self.best_bid().map(|i| self.index_to_price(i))
    }

    pub fn best_ask_price(&self) -> Option<Price> {
        self.best_ask().map(|i| self.index_to_price(i))
    }

    pub fn handle_for(&self, id: OrderId) -> Option<Handle> {
        self.order_index.get(&id)
    }

    fn levels_mut(&mut self, side: Side) -> &mut Vec<PriceLevel> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    fn bitmap_mut(&mut self, side: Side) -> &mut [u64; BITMAP_WORDS] {
        match side {
            Side::Buy => &mut self.bids_bitmap,
            Side::Sell => &mut self.asks_bitmap,
        }
    }

    fn set_bit(&mut self, side: Side, index: u64) {
        let (word, bit) = (index as usize / 64, index as usize % 64);
        self.bitmap_mut(side)[word] |= 1u64 << bit;
        match side {
            Side::Buy => {
                if self.best_bid_index == INVALID_PRICE_LEVEL_INDEX || index > self.best_bid_index {
                    self.best_bid_index = index;
                }
            }
            Side::Sell => {
                if self.best_ask_index == INVALID_PRICE_LEVEL_INDEX || index < self.best_ask_index {
                    self.best_ask_index = index;
                }
            }
        }
    }

    fn clear_bit(&mut self, side: Side, index: u64) {
        let (word, bit) = (index as usize / 64, index as usize % 64);
        self.bitmap_mut(side)[word] &= !(1u64 << bit);
        let was_best = match side {
            Side::Buy => index == self.best_bid_index,
            Side::Sell => index == self.best_ask_index,
        };
        if !was_best {
            return;
        }
        match side {
            Side::Buy => self.best_bid_index = self.rescan_highest(Side::Buy),
            Side::Sell => self.best_ask_index = self.rescan_lowest(Side::Sell),
        }
    }

    /// Highest set bit, scanning words from the top down (bids: best = highest price).
    fn rescan_highest(&self, side: Side) -> u64 {
        let bitmap = match side {
            Side::Buy => &self.bids_bitmap,
            Side::Sell => &self.asks_bitmap,
        };
        for (word_idx, word) in bitmap.iter().enumerate().rev() {
            if *word != 0 {
                let bit = 63 - word.leading_zeros() as u64;
                return word_idx as u64 * 64 + bit;
            }
        }
        INVALID_PRICE_LEVEL_INDEX
    }

    /// Lowest set bit, scanning words from the bottom up (asks: best = lowest price).
    fn rescan_lowest(&self, side: Side) -> u64 {
        let bitmap = match side {
            Side::Buy => &self.bids_bitmap,
            Side::Sell => &self.asks_bitmap,
        };
        for (word_idx, word) in bitmap.iter().enumerate() {
            if *word != 0 {
                let bit = word.trailing_zeros() as u64;
                return word_idx as u64 * 64 + bit;
            }
        }
        INVALID_PRICE_LEVEL_INDEX
    }

    /// Appends `handle` to the tail of its price level and registers it by order id.
    pub fn add_order(&mut self, handle: Handle) {
        let (id, side, price) = self.arena.get(handle).read(|o| (o.id, o.side, o.price));
        let index = self.price_to_index(price);
        let was_empty = self.levels_mut(side)[index as usize].is_empty();

        let tail = self.levels_mut(side)[index as usize].tail;
        if tail == NULL_HANDLE {
            self.levels_mut(side)[index as usize] = PriceLevel { head: handle, tail: handle };
        } else {
            self.arena.get(tail).update(|o| o.next = handle);
            self.arena.get(handle).update(|o| o.prev = tail);
            self.levels_mut(side)[index as usize].tail = handle;
        }

        if was_empty {
            self.set_bit(side, index);
        }
        self.order_index.insert(id, handle);
    }

    /// Unlinks `handle` from its price level and deregisters it. Does not
    /// deallocate the arena slot; callers decide the order's fate.
    pub fn remove_order(&mut self, handle: Handle) {
        let (id, side, price, prev, next) = self
            .arena
            .get(handle)
            .read(|o| (o.id, o.side, o.price, o.prev, o.next));
        let index = self.price_to_index(price);

        if prev != NULL_HANDLE {
            self.arena.get(prev).update(|o| o.next = next);
        } else {
            self.levels_mut(side)[index as usize].head = next;
        }
        if next != NULL_HANDLE {
            self.arena.get(next).update(|o| o.prev = prev);
        } else {
            self.levels_mut(side)[index as usize].tail = prev;
        }
        self.arena.get(handle).update(|o| {
            o.prev = NULL_HANDLE;
            o.next = NULL_HANDLE;
        });

        if self.levels_mut(side)[index as usize].is_empty() {
            self.clear_bit(side, index);
        }
        self.order_index.remove(&id);
    }

    /// The resting handle at the head (oldest order) of `side`'s best level.
    pub fn best_handle(&self, side: Side) -> Option<Handle> {
        let index = match side {
            Side::Buy => self.best_bid()?,
            Side::Sell => self.best_ask()?,
        };
        let level = match side {
            Side::Buy => &self.bids[index as usize],
            Side::Sell => &self.asks[index as usize],
        };
        (level.head != NULL_HANDLE).then_some(level.head)
    }

    pub fn arena(&self) -> &Arc<OrderArena> {
        &self.arena
    }

    /// Renders each non-empty level as `price: total_quantity` from best to worst, per side.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("ASKS (best -> worst):\n");
        for index in 0..MAX_PRICE_LEVELS as u64 {
            let level = self.asks[index as usize];
            if level.is_empty() {
                continue;
            }
            out.push_str(&self.render_level(index, level));
        }
        out.push_str("BIDS (best -> worst):\n");
        for index in (0..MAX_PRICE_LEVELS as u64).rev() {
            let level = self.bids[index as usize];
            if level.is_empty() {
                continue;
            }
            out.push_str(&self.render_level(index, level));
        }
        out
    }

    fn render_level(&self, index: u64, level: PriceLevel) -> String {
        let mut total: u64 = 0;
        let mut cursor = level.head;
        while cursor != NULL_HANDLE {
            let (qty, next) = self.arena.get(cursor).read(|o: &Order| (o.remaining_quantity, o.next));
            total += qty as u64;
            cursor = next;
        }
        format!("  {:.2}: {}\n", self.index_to_price(index) as f64 / 100.0, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::Order;

    fn new_book() -> OrderBook {
        OrderBook::new(Arc::new(OrderArena::new(64)))
    }

    #[test]
    fn best_bid_ask_track_insert_and_remove() {
        let mut book = new_book();
        let arena = book.arena().clone();
        let h1 = arena.allocate(Order::new_limit(1, 1, Side::Buy, 11000, 10, 0)).unwrap();
        book.add_order(h1);
        assert_eq!(book.best_bid_price(), Some(11000));

        let h2 = arena.allocate(Order::new_limit(2, 1, Side::Buy, 11050, 10, 1)).unwrap();
        book.add_order(h2);
        assert_eq!(book.best_bid_price(), Some(11050), "higher bid price should win");

        book.remove_order(h2);
        assert_eq!(book.best_bid_price(), Some(11000), "best bid should rescan down after removal");
    }

    #[test]
    fn fifo_order_within_a_level() {
        let mut book = new_book();
        let arena = book.arena().clone();
        let h1 = arena.allocate(Order::new_limit(1, 1, Side::Sell, 11000, 10, 0)).unwrap();
        let h2 = arena.allocate(Order::new_limit(2, 1, Side::Sell, 11000, 10, 1)).unwrap();
        book.add_order(h1);
        book.add_order(h2);
        assert_eq!(book.best_handle(Side::Sell), Some(h1), "earlier order keeps time priority");
        book.remove_order(h1);
        assert_eq!(book.best_handle(Side::Sell), Some(h2));
    }
}
