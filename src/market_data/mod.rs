pub mod series_store;
pub mod source;

pub use series_store::SeriesStore;
pub use source::MarketDataSource;
