// =============================================================================
// Indicator Engine — full-history computation, windowed output
// =============================================================================
//
// Pipeline:
//   1. Compute SMA(20), Bollinger(20, 2), RSI(14), MACD(12, 26, 9) over the
//      entire series so early rows of the window are not distorted.
//   2. Zip the columns back onto the records.
//   3. Keep only rows dated within the trailing analysis window.
// =============================================================================

use chrono::{Duration, NaiveDate};

use crate::indicators::bollinger::calculate_bollinger;
use crate::indicators::macd::calculate_macd;
use crate::indicators::rsi::calculate_rsi;
use crate::indicators::sma::calculate_sma;
use crate::market_data::SeriesStore;
use crate::types::IndicatedRecord;

pub const SMA_PERIOD: usize = 20;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_STD: f64 = 2.0;
pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

/// Calendar days of output kept behind `as_of`.
pub const ANALYSIS_WINDOW_DAYS: i64 = 365;

/// Compute every indicator column over the whole store and return the rows
/// dated on or after `as_of - 365 days`.
///
/// Deterministic: the same store and `as_of` always yield identical output.
pub fn compute_indicators(store: &SeriesStore, as_of: NaiveDate) -> Vec<IndicatedRecord> {
    if store.is_empty() {
        return Vec::new();
    }

    let closes = store.closes();

    let sma = calculate_sma(&closes, SMA_PERIOD);
    let bands = calculate_bollinger(&closes, BOLLINGER_PERIOD, BOLLINGER_STD);
    let rsi = calculate_rsi(&closes, RSI_PERIOD);
    let macd = calculate_macd(&closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL);

    let cutoff = window_start(as_of);

    store
        .records()
        .iter()
        .enumerate()
        .filter(|(_, record)| record.date >= cutoff)
        .map(|(i, record)| IndicatedRecord {
            sma_20: sma[i],
            bollinger_upper: bands[i].map(|b| b.upper),
            bollinger_lower: bands[i].map(|b| b.lower),
            rsi_14: rsi[i],
            macd: macd[i].macd,
            macd_signal: macd[i].signal,
            macd_diff: macd[i].diff,
            ..IndicatedRecord::bare(record)
        })
        .collect()
}

/// First date included in the output window for `as_of`.
pub fn window_start(as_of: NaiveDate) -> NaiveDate {
    as_of - Duration::days(ANALYSIS_WINDOW_DAYS)
}
