// ============================================================================
// Event Handler Interface
// Defines the contract for observing order lifecycle and trade events
// ============================================================================

use crate::domain::Trade;
use crate::numeric::Price;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Events emitted by the matching engine, one terminal event per order
/// after the initial `OrderReceived`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrderEvent {
    /// Order entered the engine
    OrderReceived { time: String, client_id: String },

    /// Limit order rested without matching
    OrderRested {
        time: String,
        client_id: String,
        price: Price,
        quantity: u64,
    },

    /// Order matched against a resting order, trade generated
    OrderMatched { trade: Trade },

    /// Aggressor fully consumed (a market aggressor may have had an
    /// unfilled remainder dropped when the opposite side ran out)
    OrderFilled { time: String, client_id: String },

    /// Limit aggressor partially filled; remainder rested
    OrderPartiallyFilled {
        time: String,
        client_id: String,
        price: Price,
        rested_quantity: u64,
    },

    /// Market order discarded against an empty opposite side
    OrderDiscarded { time: String, client_id: String },
}

/// Event handler trait for processing matching engine events
/// Implementations can handle logging, metrics, notifications, etc.
pub trait EventHandler {
    /// Handle an order event
    fn on_event(&self, event: OrderEvent);

    /// Batch event handler (optional optimization)
    fn on_events(&self, events: Vec<OrderEvent>) {
        for event in events {
            self.on_event(event);
        }
    }
}

/// No-op event handler for testing and benchmarks
pub struct NoOpEventHandler;

impl EventHandler for NoOpEventHandler {
    fn on_event(&self, _event: OrderEvent) {
        // Do nothing
    }
}

/// Logging event handler
///
/// Discards are warnings per the error-handling contract; everything else
/// is debug-level noise.
pub struct LoggingEventHandler;

impl EventHandler for LoggingEventHandler {
    fn on_event(&self, event: OrderEvent) {
        match event {
            OrderEvent::OrderDiscarded { time, client_id } => {
                tracing::warn!(
                    time = %time,
                    client_id = %client_id,
                    "market order discarded, opposite side is empty"
                );
            },
            event => tracing::debug!("matching engine event: {:?}", event),
        }
    }
}
