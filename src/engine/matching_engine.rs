// ============================================================================
// Matching Engine
// Core business logic for order routing and matching
// ============================================================================

use crate::domain::{BookSide, BookSnapshot, ExecutionLog, Order, OrderKind, Side, Trade};
use crate::interfaces::{EventHandler, NoOpEventHandler, OrderEvent};
use crate::numeric::Price;
use smallvec::SmallVec;
use std::sync::Arc;

/// Terminal state of one processed order.
///
/// A resting order produced here may later be consumed by a future
/// incoming order; that consumption belongs to the future order's outcome,
/// not this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Limit order rested without generating any trade
    Rested,
    /// Aggressor fully consumed (for a market order this includes the case
    /// where an unfilled remainder was dropped against an exhausted book)
    Filled,
    /// Limit aggressor traded, then rested its remainder
    PartiallyFilledRested,
    /// Market order discarded against an empty opposite side
    DiscardedNoLiquidity,
}

/// Does the opposite side's best price satisfy the incoming limit price?
fn prices_cross(side: Side, limit: Price, book_price: Price) -> bool {
    match side {
        Side::Buy => book_price <= limit,
        Side::Sell => book_price >= limit,
    }
}

/// Single-instrument matching engine with strict price-time priority.
///
/// Owns both sides of the book and the execution log for the lifetime of
/// the run; no other component holds references into book internals.
/// Processing is strictly sequential: `process` takes `&mut self` and the
/// multi-step pop/push-front sequence in the matching loop must never be
/// interleaved with another mutation.
pub struct MatchingEngine {
    bids: BookSide,
    asks: BookSide,
    log: ExecutionLog,
    event_handler: Arc<dyn EventHandler>,
}

impl MatchingEngine {
    pub fn new() -> Self {
        Self::with_event_handler(Arc::new(NoOpEventHandler))
    }

    pub fn with_event_handler(event_handler: Arc<dyn EventHandler>) -> Self {
        Self {
            bids: BookSide::new(Side::Buy),
            asks: BookSide::new(Side::Sell),
            log: ExecutionLog::new(),
            event_handler,
        }
    }

    /// Route one validated order through the book.
    ///
    /// Market orders either sweep the opposite side or are discarded when
    /// it is empty. Limit orders rest directly unless they cross, in which
    /// case they enter the matching loop and rest any remainder.
    pub fn process(&mut self, order: Order) -> ProcessOutcome {
        self.event_handler.on_event(OrderEvent::OrderReceived {
            time: order.time.clone(),
            client_id: order.client_id.clone(),
        });

        match order.kind {
            OrderKind::Market => {
                if self.opposite_side(order.side).is_empty() {
                    self.event_handler.on_event(OrderEvent::OrderDiscarded {
                        time: order.time.clone(),
                        client_id: order.client_id.clone(),
                    });
                    return ProcessOutcome::DiscardedNoLiquidity;
                }
                self.match_incoming(&order)
            },
            OrderKind::Limit => {
                let crossing = self
                    .opposite_side(order.side)
                    .best_price()
                    .is_some_and(|best| prices_cross(order.side, order.price, best));

                if !crossing {
                    self.own_side_mut(order.side)
                        .insert(order.price, order.to_resting(order.quantity));
                    self.event_handler.on_event(OrderEvent::OrderRested {
                        time: order.time.clone(),
                        client_id: order.client_id.clone(),
                        price: order.price,
                        quantity: order.quantity,
                    });
                    return ProcessOutcome::Rested;
                }
                self.match_incoming(&order)
            },
        }
    }

    /// The matching loop: consume the opposite side best-price-first, FIFO
    /// within each level, until the aggressor is filled or stops crossing.
    fn match_incoming(&mut self, order: &Order) -> ProcessOutcome {
        let mut remaining = order.quantity;
        let mut trades: SmallVec<[Trade; 4]> = SmallVec::new();

        let opposite = match order.side {
            Side::Buy => &mut self.asks,
            Side::Sell => &mut self.bids,
        };

        while remaining > 0 {
            let Some(best) = opposite.best_price() else {
                break;
            };
            if order.is_limit_order() && !prices_cross(order.side, order.price, best) {
                break;
            }
            let Some(resting) = opposite.pop_front(best) else {
                break;
            };

            // Execution always happens at the resting order's price.
            let fill_quantity = remaining.min(resting.quantity);

            // Client ordering contract: resting (passive) client first for
            // a limit aggressor, aggressor first for a market aggressor.
            let trade = match order.kind {
                OrderKind::Limit => Trade::new(
                    order.time.clone(),
                    resting.client_id.clone(),
                    order.client_id.clone(),
                    best,
                    fill_quantity,
                ),
                OrderKind::Market => Trade::new(
                    order.time.clone(),
                    order.client_id.clone(),
                    resting.client_id.clone(),
                    best,
                    fill_quantity,
                ),
            };
            trades.push(trade);

            if resting.quantity > fill_quantity {
                // Partial fill of the head: the reduced remainder goes back
                // to the front of its level, keeping its time priority.
                opposite.push_front(best, resting.with_quantity(resting.quantity - fill_quantity));
                remaining = 0;
            } else {
                remaining -= resting.quantity;
            }
        }

        for trade in trades {
            self.event_handler
                .on_event(OrderEvent::OrderMatched {
                    trade: trade.clone(),
                });
            self.log.append(trade);
        }

        if remaining == 0 {
            self.event_handler.on_event(OrderEvent::OrderFilled {
                time: order.time.clone(),
                client_id: order.client_id.clone(),
            });
            ProcessOutcome::Filled
        } else if order.is_limit_order() {
            self.own_side_mut(order.side)
                .insert(order.price, order.to_resting(remaining));
            self.event_handler.on_event(OrderEvent::OrderPartiallyFilled {
                time: order.time.clone(),
                client_id: order.client_id.clone(),
                price: order.price,
                rested_quantity: remaining,
            });
            ProcessOutcome::PartiallyFilledRested
        } else {
            // Market orders never rest: the remainder is dropped, the fills
            // already taken stand.
            self.event_handler.on_event(OrderEvent::OrderFilled {
                time: order.time.clone(),
                client_id: order.client_id.clone(),
            });
            ProcessOutcome::Filled
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn bids(&self) -> &BookSide {
        &self.bids
    }

    pub fn asks(&self) -> &BookSide {
        &self.asks
    }

    pub fn execution_log(&self) -> &ExecutionLog {
        &self.log
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.best_price()
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.best_price()
    }

    /// Aggregated view of both sides, at most `depth` levels each.
    pub fn snapshot(&self, depth: usize) -> BookSnapshot {
        BookSnapshot {
            bids: self.bids.aggregated_levels(depth),
            asks: self.asks.aggregated_levels(depth),
        }
    }

    // ========================================================================
    // Private methods
    // ========================================================================

    fn opposite_side(&self, side: Side) -> &BookSide {
        match side {
            Side::Buy => &self.asks,
            Side::Sell => &self.bids,
        }
    }

    fn own_side_mut(&mut self, side: Side) -> &mut BookSide {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MatchingEngine {
    fn clone(&self) -> Self {
        Self {
            bids: self.bids.clone(),
            asks: self.asks.clone(),
            log: self.log.clone(),
            event_handler: Arc::clone(&self.event_handler),
        }
    }
}


#[cfg(test)]
mod properties {
    use super::*;
    use proptest::prelude::*;

    const PRICES: [&str; 5] = ["9.50", "9.75", "10.00", "10.25", "10.50"];

    #[derive(Debug, Clone)]
    struct OrderSpec {
        buy: bool,
        market: bool,
        quantity: u64,
        price_idx: usize,
    }

    fn order_spec() -> impl Strategy<Value = OrderSpec> {
        (any::<bool>(), prop::bool::weighted(0.25), 1u64..20, 0usize..PRICES.len()).prop_map(
            |(buy, market, quantity, price_idx)| OrderSpec {
                buy,
                market,
                quantity,
                price_idx,
            },
        )
    }

    fn run_orders(specs: &[OrderSpec]) -> MatchingEngine {
        let mut engine = MatchingEngine::new();
        for (i, spec) in specs.iter().enumerate() {
            let side = if spec.buy { Side::Buy } else { Side::Sell };
            let kind = if spec.market {
                OrderKind::Market
            } else {
                OrderKind::Limit
            };
            let client = if spec.market {
                format!("M{}", i)
            } else {
                format!("L{}", i)
            };
            let order = Order::new(
                (i + 1).to_string(),
                client,
                side,
                spec.quantity,
                kind,
                PRICES[spec.price_idx].parse().unwrap(),
            );
            engine.process(order);
        }
        engine
    }

    proptest! {
        #[test]
        fn prop_book_never_crosses(specs in prop::collection::vec(order_spec(), 0..60)) {
            let mut engine = MatchingEngine::new();
            for (i, spec) in specs.iter().enumerate() {
                let side = if spec.buy { Side::Buy } else { Side::Sell };
                let kind = if spec.market { OrderKind::Market } else { OrderKind::Limit };
                let order = Order::new(
                    (i + 1).to_string(),
                    format!("C{}", i),
                    side,
                    spec.quantity,
                    kind,
                    PRICES[spec.price_idx].parse().unwrap(),
                );
                engine.process(order);

                // A limit order that would cross is always matched, never
                // left resting against a crossing book.
                if let (Some(bid), Some(ask)) = (engine.best_bid(), engine.best_ask()) {
                    prop_assert!(bid < ask);
                }
            }
        }

        #[test]
        fn prop_quantity_conservation(specs in prop::collection::vec(order_spec(), 0..60)) {
            let engine = run_orders(&specs);

            let submitted: u64 = specs.iter().map(|s| s.quantity).sum();
            let executed: u64 = engine.execution_log().iter().map(|t| t.quantity).sum();
            let resting: u64 = engine.bids().iter().map(|(_, o)| o.quantity).sum::<u64>()
                + engine.asks().iter().map(|(_, o)| o.quantity).sum::<u64>();

            // Each executed unit consumes one unit from each of two orders;
            // the rest either sits in the book or was dropped (markets).
            prop_assert!(executed * 2 + resting <= submitted);

            // No resting order ever holds zero quantity
            for (_, order) in engine.bids().iter().chain(engine.asks().iter()) {
                prop_assert!(order.quantity > 0);
            }
        }

        #[test]
        fn prop_market_orders_never_rest(specs in prop::collection::vec(order_spec(), 0..60)) {
            let engine = run_orders(&specs);

            for (_, order) in engine.bids().iter().chain(engine.asks().iter()) {
                prop_assert!(
                    !order.client_id.starts_with('M'),
                    "market order {} found resting",
                    order.client_id
                );
            }
        }

        #[test]
        fn prop_deterministic_replay(specs in prop::collection::vec(order_spec(), 0..60)) {
            let first = run_orders(&specs);
            let second = run_orders(&specs);

            prop_assert_eq!(first.execution_log().as_slice(), second.execution_log().as_slice());
            prop_assert_eq!(first.snapshot(usize::MAX).bids, second.snapshot(usize::MAX).bids);
            prop_assert_eq!(first.snapshot(usize::MAX).asks, second.snapshot(usize::MAX).asks);
        }

        #[test]
        fn prop_time_priority_within_level(quantities in prop::collection::vec(1u64..10, 1..8)) {
            // All resting at one price; one market order consumes them in
            // strict arrival order.
            let mut engine = MatchingEngine::new();
            for (i, quantity) in quantities.iter().enumerate() {
                engine.process(Order::new(
                    (i + 1).to_string(),
                    format!("C{}", i),
                    Side::Buy,
                    *quantity,
                    OrderKind::Limit,
                    "10.00".parse().unwrap(),
                ));
            }

            let total: u64 = quantities.iter().sum();
            engine.process(Order::new(
                "99",
                "SELLER",
                Side::Sell,
                total,
                OrderKind::Market,
                Price::ZERO,
            ));

            let counterparties: Vec<String> = engine
                .execution_log()
                .iter()
                .map(|t| t.client2.clone())
                .collect();
            let expected: Vec<String> =
                (0..quantities.len()).map(|i| format!("C{}", i)).collect();
            prop_assert_eq!(counterparties, expected);
            prop_assert!(engine.bids().is_empty());
        }
    }
}
