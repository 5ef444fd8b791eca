// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================

/// Trailing arithmetic mean of `closes` over `period` values, inclusive of the
/// current one.  Aligned with `closes`; the first `period - 1` entries are
/// `None`.
pub fn calculate_sma(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    rolling(closes, period, |window| {
        window.iter().sum::<f64>() / window.len() as f64
    })
}

/// Apply `f` to every full trailing window of `period` values.
pub(crate) fn rolling<F>(values: &[f64], period: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    if period == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                None
            } else {
                Some(f(&values[i + 1 - period..=i]))
            }
        })
        .collect()
}
