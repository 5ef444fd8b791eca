// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators used by the
// signal pipeline.  Every column is returned aligned with its input and uses
// `Option` for warm-up rows, so callers are forced to handle insufficient
// history instead of reading it as zero.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
