// ============================================================================
// Matchbook Library
// Deterministic single-instrument order matching with price-time priority
// ============================================================================

//! # Matchbook
//!
//! A deterministic, single-instrument order-matching core.
//!
//! ## Features
//!
//! - **Strict price-time priority**: best price first, ties broken by
//!   arrival order, partial fills keep their original priority
//! - **Limit and market orders**: limit remainders rest in the book,
//!   market orders never rest
//! - **Append-only execution log** in exact trade-generation order
//! - **Line-oriented session layer** for text input/output
//!
//! ## Example
//!
//! ```rust
//! use matchbook::prelude::*;
//!
//! let mut engine = MatchingEngine::new();
//!
//! let sell = Order::new("1", "seller", Side::Sell, 10, OrderKind::Limit,
//!     "10.00".parse().unwrap());
//! assert_eq!(engine.process(sell), ProcessOutcome::Rested);
//!
//! let buy = Order::new("2", "buyer", Side::Buy, 4, OrderKind::Limit,
//!     "10.00".parse().unwrap());
//! assert_eq!(engine.process(buy), ProcessOutcome::Filled);
//!
//! let trade = &engine.execution_log().as_slice()[0];
//! assert_eq!(trade.to_string(), "2 seller buyer 10.00 4");
//! ```

pub mod domain;
pub mod engine;
pub mod interfaces;
pub mod numeric;
pub mod session;

// Re-exports for convenience
pub mod prelude {
    pub use crate::domain::{
        BookSide, BookSnapshot, ExecutionLog, Order, OrderKind, PriceLevel, RawOrder,
        RejectReason, RestingOrder, Side, Trade,
    };
    pub use crate::engine::{MatchingEngine, ProcessOutcome};
    pub use crate::interfaces::{EventHandler, LoggingEventHandler, NoOpEventHandler, OrderEvent};
    pub use crate::session::SessionError;
}

#[cfg(test)]
mod integration_tests {
    use super::prelude::*;
    use crate::numeric::Price;

    fn price(s: &str) -> Price {
        s.parse().unwrap()
    }

    fn limit(time: &str, client: &str, side: Side, quantity: u64, p: &str) -> Order {
        Order::new(time, client, side, quantity, OrderKind::Limit, price(p))
    }

    #[test]
    fn test_end_to_end_matching() {
        let mut engine = MatchingEngine::new();

        assert_eq!(
            engine.process(limit("1", "C1", Side::Buy, 10, "10.00")),
            ProcessOutcome::Rested
        );
        assert_eq!(
            engine.process(limit("2", "C2", Side::Sell, 5, "10.00")),
            ProcessOutcome::Filled
        );
        assert_eq!(
            engine.process(limit("3", "C3", Side::Sell, 10, "9.00")),
            ProcessOutcome::PartiallyFilledRested
        );

        let lines: Vec<String> = engine
            .execution_log()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(lines, vec!["2 C1 C2 10.00 5", "3 C1 C3 10.00 5"]);

        // C3's unfilled 5 rests as the new best ask at its own price
        let snapshot = engine.snapshot(10);
        assert_eq!(snapshot.bids, vec![]);
        assert_eq!(snapshot.asks, vec![(price("9.00"), 5)]);
    }

    #[test]
    fn test_aggressor_sweeps_multiple_levels_in_price_order() {
        let mut engine = MatchingEngine::new();
        engine.process(limit("1", "A", Side::Sell, 1, "10.20"));
        engine.process(limit("2", "B", Side::Sell, 1, "10.10"));
        engine.process(limit("3", "C", Side::Sell, 1, "10.30"));

        engine.process(limit("4", "BUYER", Side::Buy, 3, "10.30"));

        let fills: Vec<(String, String)> = engine
            .execution_log()
            .iter()
            .map(|t| (t.client1.clone(), t.price.to_string()))
            .collect();
        assert_eq!(
            fills,
            vec![
                ("B".to_string(), "10.10".to_string()),
                ("A".to_string(), "10.20".to_string()),
                ("C".to_string(), "10.30".to_string()),
            ]
        );
        assert!(engine.asks().is_empty());
        assert!(engine.bids().is_empty());
    }

    #[test]
    fn test_session_round_trip() {
        let input = "5\n\
                     1 C1 b 5 l 10.00\n\
                     2 C2 b 5 l 10.00\n\
                     3 BAD q 5 l 10.00\n\
                     4 S1 s 7 m 0\n\
                     5 S2 s 4 l 9.90\n";

        let mut engine = MatchingEngine::new();
        let mut output = Vec::new();
        crate::session::run(&mut engine, input.as_bytes(), &mut output).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "4 S1 C1 10.00 5\n4 S1 C2 10.00 2\n5 C2 S2 10.00 3\n"
        );

        // S2's last unit rests on the ask side after eating C2's remainder
        let snapshot = engine.snapshot(10);
        assert_eq!(snapshot.bids, vec![]);
        assert_eq!(snapshot.asks, vec![(price("9.90"), 1)]);
    }
}
