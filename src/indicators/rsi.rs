// =============================================================================
// Relative Strength Index (RSI) — Wilder's Smoothing
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — Compute price changes from consecutive closes.  The first row has
//          no predecessor and contributes a change of 0.
// Step 2 — Split each change into a gain (max(d, 0)) and a loss (max(-d, 0)).
// Step 3 — Apply Wilder's smoothing (alpha = 1 / period), seeded by the first
//          gain / loss:
//            avg_t = avg_{t-1} + (x_t - avg_{t-1}) / period
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS), or 100 when avg_loss is zero.
//
// The first `period - 1` rows are `None`.
// =============================================================================

use super::ema::exponential_mean;

/// Compute the RSI column for the given `closes` and `period`.
///
/// The result has one element per close.
///
/// # Edge cases
/// - `period == 0` => every element is `None`
/// - `closes.len() < period` => every element is `None`
/// - Average loss of zero (no down moves, or no moves at all) => 100.0
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; closes.len()];
    }

    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());
    let mut prev: Option<f64> = None;
    for &close in closes {
        let delta = prev.map_or(0.0, |p| close - p);
        gains.push(Some(delta.max(0.0)));
        losses.push(Some((-delta).max(0.0)));
        prev = Some(close);
    }

    let alpha = 1.0 / period as f64;
    let avg_gain = exponential_mean(&gains, alpha, period);
    let avg_loss = exponential_mean(&losses, alpha, period);

    avg_gain
        .into_iter()
        .zip(avg_loss)
        .map(|(g, l)| rsi_from_averages(g?, l?))
        .collect()
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// Returns `None` when the result is non-finite.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rsi = if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    if rsi.is_finite() {
        Some(rsi)
    } else {
        None
    }
}
