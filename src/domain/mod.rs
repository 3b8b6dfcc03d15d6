// ============================================================================
// Domain Models Module
// Contains all core domain entities and value objects
// ============================================================================

pub mod order;
pub mod order_book;
pub mod trade;

pub use order::{Order, OrderKind, RawOrder, RejectReason, RestingOrder, Side};
pub use order_book::{BookSide, BookSnapshot, PriceLevel};
pub use trade::{ExecutionLog, Trade};
