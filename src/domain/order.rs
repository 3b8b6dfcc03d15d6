// ============================================================================
// Order Domain Model
// ============================================================================

use crate::numeric::Price;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The side an incoming order matches against.
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrderKind {
    /// Carries a binding price; rests in the book if not fully executed
    Limit,
    /// Executes against the best available opposite prices; never rests
    Market,
}

// ============================================================================
// Orders
// ============================================================================

/// A validated incoming order.
///
/// Immutable once constructed: a partial fill never mutates an `Order`,
/// it produces a reduced [`RestingOrder`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Order {
    /// Arrival marker, opaque to the engine beyond being carried into trades
    pub time: String,
    pub client_id: String,
    pub side: Side,
    pub quantity: u64,
    pub kind: OrderKind,
    /// Meaningful only for limit orders; parsed but ignored for market orders
    pub price: Price,
}

impl Order {
    pub fn new(
        time: impl Into<String>,
        client_id: impl Into<String>,
        side: Side,
        quantity: u64,
        kind: OrderKind,
        price: Price,
    ) -> Self {
        Self {
            time: time.into(),
            client_id: client_id.into(),
            side,
            quantity,
            kind,
            price,
        }
    }

    pub fn is_market_order(&self) -> bool {
        matches!(self.kind, OrderKind::Market)
    }

    pub fn is_limit_order(&self) -> bool {
        matches!(self.kind, OrderKind::Limit)
    }

    /// The resting form of this order for `quantity` units.
    pub fn to_resting(&self, quantity: u64) -> RestingOrder {
        RestingOrder {
            time: self.time.clone(),
            client_id: self.client_id.clone(),
            quantity,
        }
    }
}

/// An unfilled limit order (or its remainder) sitting at one price level.
///
/// Invariant: `quantity > 0`. A fully consumed resting order is removed
/// from the book, never stored with zero quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RestingOrder {
    pub time: String,
    pub client_id: String,
    pub quantity: u64,
}

impl RestingOrder {
    pub fn new(time: impl Into<String>, client_id: impl Into<String>, quantity: u64) -> Self {
        Self {
            time: time.into(),
            client_id: client_id.into(),
            quantity,
        }
    }

    /// A copy of this resting order with a reduced quantity, keeping its
    /// original arrival time (and therefore its time priority).
    pub fn with_quantity(&self, quantity: u64) -> Self {
        Self {
            time: self.time.clone(),
            client_id: self.client_id.clone(),
            quantity,
        }
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Why a raw order was discarded before reaching the matching core.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RejectReason {
    /// Quantity was zero or negative
    NonPositiveQuantity(i64),
    /// Side token was not "b" or "s"
    UnknownSide(String),
    /// Kind token was not "l" or "m"
    UnknownKind(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NonPositiveQuantity(q) => {
                write!(f, "quantity must be positive, got {}", q)
            },
            RejectReason::UnknownSide(token) => write!(f, "unknown side token {:?}", token),
            RejectReason::UnknownKind(token) => write!(f, "unknown order kind token {:?}", token),
        }
    }
}

impl std::error::Error for RejectReason {}

/// A decoded but not yet validated input record.
///
/// Side and kind are still raw tokens; quantity may be non-positive.
/// [`RawOrder::validate`] is the only path from here into the engine.
#[derive(Debug, Clone)]
pub struct RawOrder {
    pub time: String,
    pub client_id: String,
    pub side: String,
    pub quantity: i64,
    pub kind: String,
    pub price: Price,
}

impl RawOrder {
    /// Validate the raw record into an [`Order`].
    ///
    /// Rejection is recoverable by design: the caller logs the reason and
    /// continues with the next input record.
    pub fn validate(self) -> Result<Order, RejectReason> {
        if self.quantity <= 0 {
            return Err(RejectReason::NonPositiveQuantity(self.quantity));
        }

        let side = match self.side.as_str() {
            "b" => Side::Buy,
            "s" => Side::Sell,
            _ => return Err(RejectReason::UnknownSide(self.side)),
        };

        let kind = match self.kind.as_str() {
            "l" => OrderKind::Limit,
            "m" => OrderKind::Market,
            _ => return Err(RejectReason::UnknownKind(self.kind)),
        };

        Ok(Order {
            time: self.time,
            client_id: self.client_id,
            side,
            quantity: self.quantity as u64,
            kind,
            price: self.price,
        })
    }
}
