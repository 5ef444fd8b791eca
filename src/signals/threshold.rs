// =============================================================================
// Threshold Signal — MACD / RSI / Bollinger confluence
// =============================================================================
//
// Rules, first match wins:
//   BUY  — macd > 0, rsi < 40, close at or below the lower band
//   SELL — macd < 0, rsi > 60, close at or above the upper band
//   HOLD — everything else, including any rule whose inputs are missing
// =============================================================================

use crate::types::{IndicatedRecord, Signal};

pub const BUY_RSI_BELOW: f64 = 40.0;
pub const SELL_RSI_ABOVE: f64 = 60.0;

/// Map one indicated row to a [`Signal`].
///
/// Pure and total: missing or NaN inputs make a rule fail to match, so the
/// result falls through to [`Signal::Hold`].
pub fn evaluate_signal(record: &IndicatedRecord) -> Signal {
    if is_buy(record).unwrap_or(false) {
        Signal::Buy
    } else if is_sell(record).unwrap_or(false) {
        Signal::Sell
    } else {
        Signal::Hold
    }
}

fn is_buy(r: &IndicatedRecord) -> Option<bool> {
    let macd = r.macd?;
    let rsi = r.rsi_14?;
    let lower = r.bollinger_lower?;
    Some(macd > 0.0 && rsi < BUY_RSI_BELOW && r.adj_close <= lower)
}

fn is_sell(r: &IndicatedRecord) -> Option<bool> {
    let macd = r.macd?;
    let rsi = r.rsi_14?;
    let upper = r.bollinger_upper?;
    Some(macd < 0.0 && rsi > SELL_RSI_ABOVE && r.adj_close >= upper)
}
