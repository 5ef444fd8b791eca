// =============================================================================
// Shared types used across the tickerwatch pipeline
// =============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily observation for the watched ticker.
///
/// `date` is a naive calendar date: any exchange timezone has already been
/// resolved and dropped by the data source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub adj_close: f64,
    #[serde(default)]
    pub volume: u64,
}

impl PriceRecord {
    pub fn new(date: NaiveDate, adj_close: f64, volume: u64) -> Self {
        Self {
            date,
            adj_close,
            volume,
        }
    }

    /// A record is usable when its close is a finite, strictly positive price.
    pub fn is_valid(&self) -> bool {
        self.adj_close.is_finite() && self.adj_close > 0.0
    }
}

/// A [`PriceRecord`] extended with every indicator column.
///
/// Each indicator is `None` while it is still warming up.  Consumers must read
/// `None` as "insufficient history", never as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatedRecord {
    pub date: NaiveDate,
    pub adj_close: f64,
    pub volume: u64,
    pub sma_20: Option<f64>,
    pub bollinger_upper: Option<f64>,
    pub bollinger_lower: Option<f64>,
    pub rsi_14: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_diff: Option<f64>,
}

impl IndicatedRecord {
    /// A row with no indicator values yet.
    pub fn bare(record: &PriceRecord) -> Self {
        Self {
            date: record.date,
            adj_close: record.adj_close,
            volume: record.volume,
            sma_20: None,
            bollinger_upper: None,
            bollinger_lower: None,
            rsi_14: None,
            macd: None,
            macd_signal: None,
            macd_diff: None,
        }
    }
}

/// Normalise a user-typed ticker: trimmed and uppercased.  Returns `None` for
/// blank input.
pub fn normalize_ticker(raw: &str) -> Option<String> {
    let ticker = raw.trim().to_uppercase();
    if ticker.is_empty() {
        None
    } else {
        Some(ticker)
    }
}

/// Trading signal emitted once per poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Default for Signal {
    fn default() -> Self {
        Self::Hold
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Hold => write!(f, "HOLD"),
        }
    }
}
