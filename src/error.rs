use thiserror::Error;

/// Failures raised by a market data source.
#[derive(Debug, Error)]
pub enum MarketDataError {
    /// The source answered but had no rows for the symbol / range.
    #[error("no price data available for {ticker}")]
    DataUnavailable { ticker: String },

    #[error("data source returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Error object embedded in an otherwise well-formed response.
    #[error("data source error: {0}")]
    Api(String),

    #[error("malformed response: {0}")]
    Parse(String),
}
