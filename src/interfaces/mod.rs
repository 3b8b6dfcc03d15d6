// ============================================================================
// Interfaces Module
// Contracts between the engine core and its collaborators
// ============================================================================

mod event_handler;

pub use event_handler::{EventHandler, LoggingEventHandler, NoOpEventHandler, OrderEvent};
