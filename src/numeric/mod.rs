// ============================================================================
// Numeric Module
// Fixed-point arithmetic for exact price handling
// ============================================================================
//
// This module provides:
// - FixedDecimal<D>: Fixed-point decimal with compile-time precision
// - NumericError: Error types for arithmetic operations
// - Price: 2-decimal alias used throughout the book
//
// Design principles:
// - No floating-point operations
// - All arithmetic returns Result (no panics)
// - Exact integer representation (i64), so Price is a total-order map key

mod errors;
mod fixed_decimal;

pub use errors::{NumericError, NumericResult};
pub use fixed_decimal::{FixedDecimal, Price};
