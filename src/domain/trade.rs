// ============================================================================
// Trade Domain Model
// ============================================================================

use crate::numeric::{NumericError, NumericResult, Price};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One execution between an aggressing order and a resting order.
///
/// `time` is the aggressor's arrival marker; `price` is always the resting
/// order's price. The client ordering follows the engine's contract: for a
/// limit aggressor `client1` is the resting client, for a market aggressor
/// `client1` is the aggressor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Trade {
    pub time: String,
    pub client1: String,
    pub client2: String,
    pub price: Price,
    pub quantity: u64,
}

impl Trade {
    pub fn new(
        time: impl Into<String>,
        client1: impl Into<String>,
        client2: impl Into<String>,
        price: Price,
        quantity: u64,
    ) -> Self {
        Self {
            time: time.into(),
            client1: client1.into(),
            client2: client2.into(),
            price,
            quantity,
        }
    }

    /// Notional value of the trade (price × quantity).
    ///
    /// Returns a Result because the multiplication can overflow.
    pub fn notional_value(&self) -> NumericResult<Price> {
        let quantity = i64::try_from(self.quantity).map_err(|_| NumericError::Overflow)?;
        self.price.checked_mul_int(quantity)
    }
}

impl fmt::Display for Trade {
    /// The output-line form: `Time Client1 Client2 Price Quantity` with the
    /// price rendered with exactly 2 fractional digits.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.time, self.client1, self.client2, self.price, self.quantity
        )
    }
}

// ============================================================================
// Execution Log
// ============================================================================

/// Append-only record of all trades, in the exact order they were
/// generated. No deduplication, no reordering: trades from one aggressor
/// appear consecutively in counterparty-match order.
#[derive(Debug, Clone, Default)]
pub struct ExecutionLog {
    trades: Vec<Trade>,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self { trades: Vec::new() }
    }

    pub fn append(&mut self, trade: Trade) {
        self.trades.push(trade);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trade> {
        self.trades.iter()
    }

    pub fn as_slice(&self) -> &[Trade] {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}
