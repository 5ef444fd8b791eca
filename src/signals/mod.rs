// =============================================================================
// Signals Module
// =============================================================================
//
// Turns the latest indicated row into a BUY / SELL / HOLD decision.

pub mod threshold;

pub use threshold::evaluate_signal;
