use std::future::Future;

use chrono::NaiveDate;

use crate::error::MarketDataError;
use crate::types::PriceRecord;

/// Where daily price history comes from.
///
/// Implementations return records sorted by date with any timezone already
/// stripped.
pub trait MarketDataSource {
    /// Daily records for `ticker` between `start` and `end` inclusive.
    ///
    /// Fails with [`MarketDataError::DataUnavailable`] when nothing comes back.
    fn fetch_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Future<Output = Result<Vec<PriceRecord>, MarketDataError>> + Send;

    /// The most recent (0 to 2) daily records for `ticker`.
    ///
    /// An empty vector means "nothing new", not an error.
    fn fetch_live(
        &self,
        ticker: &str,
    ) -> impl Future<Output = Result<Vec<PriceRecord>, MarketDataError>> + Send;
}
