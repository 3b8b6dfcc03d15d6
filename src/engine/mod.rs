// ============================================================================
// Engine Module
// Contains the core matching engine business logic
// ============================================================================

mod matching_engine;

pub use matching_engine::{MatchingEngine, ProcessOutcome};
