// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   alpha  = 2 / (period + 1)
//   EMA_t  = close_t * alpha + EMA_{t-1} * (1 - alpha)
//
// The recurrence is seeded with the first available value, not with an SMA of
// the first `period` closes.  The first `period - 1` outputs are still masked
// as `None` so that a young EMA is never mistaken for a settled one.
// =============================================================================

/// Exponentially weighted mean over a column that may contain gaps.
///
/// * The first `Some` value seeds the average.
/// * `None` inputs leave the average untouched and do not count towards
///   `min_periods`.
/// * An output is `Some` once at least `min_periods` values have been seen.
///
/// Returns a vector of the same length as `values`.
pub fn exponential_mean(values: &[Option<f64>], alpha: f64, min_periods: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    let mut mean: Option<f64> = None;
    let mut seen = 0usize;

    for value in values {
        if let Some(x) = *value {
            seen += 1;
            mean = Some(match mean {
                None => x,
                Some(prev) => prev + alpha * (x - prev),
            });
        }
        out.push(if seen >= min_periods.max(1) { mean } else { None });
    }

    out
}

/// Compute the EMA column for `closes` with look-back `period`.
///
/// The result is aligned with `closes`: index `i` holds the EMA as of close
/// `i`, or `None` for the first `period - 1` closes.
///
/// # Edge cases
/// - `period == 0` => every element is `None`
/// - `closes.len() < period` => every element is `None`
pub fn calculate_ema(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; closes.len()];
    }
    let values: Vec<Option<f64>> = closes.iter().copied().map(Some).collect();
    ema_of(&values, period)
}

/// EMA of an already-sparse column (e.g. a MACD line with a warm-up gap).
pub fn ema_of(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }
    let alpha = 2.0 / (period as f64 + 1.0);
    exponential_mean(values, alpha, period)
}
