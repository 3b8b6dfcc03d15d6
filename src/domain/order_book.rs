// ============================================================================
// Order Book Domain Model
// ============================================================================

use std::collections::{BTreeMap, VecDeque};

use super::{RestingOrder, Side};
use crate::numeric::Price;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Price Level
// ============================================================================

/// FIFO queue of resting orders at a single price.
///
/// Invariant: non-empty while present in a [`BookSide`]. The deque supports
/// O(1) pop-front and push-front, which is exactly what the matching loop
/// needs for consuming heads and re-queuing partial fills.
#[derive(Debug, Clone, Default)]
pub struct PriceLevel {
    orders: VecDeque<RestingOrder>,
}

impl PriceLevel {
    pub fn new() -> Self {
        Self {
            orders: VecDeque::new(),
        }
    }

    /// Append a newly arrived resting order behind all earlier arrivals.
    pub fn push_back(&mut self, order: RestingOrder) {
        self.orders.push_back(order);
    }

    /// Re-insert a partially filled resting order ahead of all later
    /// arrivals, restoring its original time priority.
    pub fn push_front(&mut self, order: RestingOrder) {
        self.orders.push_front(order);
    }

    /// Remove and return the order with the highest time priority.
    pub fn pop_front(&mut self) -> Option<RestingOrder> {
        self.orders.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Sum of remaining quantities at this level.
    pub fn total_quantity(&self) -> u64 {
        self.orders.iter().map(|o| o.quantity).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RestingOrder> {
        self.orders.iter()
    }
}

// ============================================================================
// Book Side
// ============================================================================

/// One side (bids or asks) of the book: a price-ordered collection of
/// [`PriceLevel`]s.
///
/// The BTreeMap keeps prices totally ordered, so the best price is the
/// last key for bids and the first key for asks. A price appears as a key
/// iff its level is non-empty.
#[derive(Debug, Clone)]
pub struct BookSide {
    side: Side,
    levels: BTreeMap<Price, PriceLevel>,
}

impl BookSide {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Highest bid / lowest ask, or `None` if the side is empty.
    pub fn best_price(&self) -> Option<Price> {
        match self.side {
            Side::Buy => self.levels.keys().next_back().copied(),
            Side::Sell => self.levels.keys().next().copied(),
        }
    }

    /// Append a resting order at `price`, creating the level if absent.
    ///
    /// Relative order of all previously resting orders is untouched.
    pub fn insert(&mut self, price: Price, order: RestingOrder) {
        self.levels.entry(price).or_default().push_back(order);
    }

    /// Remove and return the queue head at `price`.
    ///
    /// The price entry is deleted as soon as its queue becomes empty, so an
    /// empty level is never observable.
    pub fn pop_front(&mut self, price: Price) -> Option<RestingOrder> {
        let level = self.levels.get_mut(&price)?;
        let order = level.pop_front();
        if level.is_empty() {
            self.levels.remove(&price);
        }
        order
    }

    /// Re-insert a partially filled resting order at the front of its level.
    pub fn push_front(&mut self, price: Price, order: RestingOrder) {
        self.levels.entry(price).or_default().push_front(order);
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Number of distinct price levels.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Total resting order count across all levels.
    pub fn order_count(&self) -> usize {
        self.levels.values().map(PriceLevel::len).sum()
    }

    /// Iterate `(price, resting order)` pairs from best to worst price,
    /// FIFO within each level.
    pub fn iter(&self) -> Box<dyn Iterator<Item = (Price, &RestingOrder)> + '_> {
        match self.side {
            Side::Buy => Box::new(
                self.levels
                    .iter()
                    .rev()
                    .flat_map(|(price, level)| level.iter().map(move |o| (*price, o))),
            ),
            Side::Sell => Box::new(
                self.levels
                    .iter()
                    .flat_map(|(price, level)| level.iter().map(move |o| (*price, o))),
            ),
        }
    }

    /// Aggregated `(price, quantity)` levels from best to worst, at most
    /// `num_levels` deep.
    pub fn aggregated_levels(&self, num_levels: usize) -> Vec<(Price, u64)> {
        let iter: Box<dyn Iterator<Item = (&Price, &PriceLevel)>> = match self.side {
            Side::Buy => Box::new(self.levels.iter().rev()),
            Side::Sell => Box::new(self.levels.iter()),
        };

        iter.take(num_levels)
            .map(|(price, level)| (*price, level.total_quantity()))
            .collect()
    }
}

// ============================================================================
// Book Snapshot
// ============================================================================

/// Immutable snapshot of both sides of the book, best price first.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BookSnapshot {
    /// Bid levels (price, quantity), highest price first
    pub bids: Vec<(Price, u64)>,
    /// Ask levels (price, quantity), lowest price first
    pub asks: Vec<(Price, u64)>,
}

impl BookSnapshot {
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first().map(|(price, _)| *price)
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first().map(|(price, _)| *price)
    }

    /// Ask minus bid; `None` when either side is empty.
    pub fn spread(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => ask.checked_sub(bid).ok(),
            _ => None,
        }
    }
}
