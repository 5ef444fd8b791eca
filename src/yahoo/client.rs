// =============================================================================
// Yahoo Finance Chart Client — daily bars over the v8 chart endpoint
// =============================================================================
//
// History is requested with explicit `period1`/`period2` bounds; live data
// with `range=2d`.  Daily timestamps are shifted by the exchange GMT offset
// reported in the response before the calendar date is taken, so a record's
// date is the exchange's trading date regardless of where the bot runs.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration as DateDelta, NaiveDate, NaiveTime};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::error::MarketDataError;
use crate::market_data::MarketDataSource;
use crate::types::PriceRecord;

/// Yahoo rejects requests without a browser-looking agent.
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Yahoo Finance chart API client.
#[derive(Clone)]
pub struct YahooClient {
    base_url: String,
    client: reqwest::Client,
}

impl YahooClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Create a new `YahooClient`.
    ///
    /// # Arguments
    /// * `base_url` — e.g. `https://query1.finance.yahoo.com` (no trailing slash needed).
    /// * `timeout`  — per-request timeout applied by the HTTP client.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client")?;

        debug!(base_url = %base_url, "YahooClient initialised");

        Ok(Self { base_url, client })
    }

    fn chart_url(&self, ticker: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.base_url, ticker)
    }

    // -------------------------------------------------------------------------
    // Requests
    // -------------------------------------------------------------------------

    /// GET the chart endpoint with `query` and parse the daily records.
    async fn get_chart(
        &self,
        ticker: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<PriceRecord>, MarketDataError> {
        let resp = self.client.get(self.chart_url(ticker)).query(query).send().await?;

        let status = resp.status();
        let body = resp.text().await?;

        if status == reqwest::StatusCode::NOT_FOUND {
            // Unknown or delisted symbols come back as 404 with a chart error body.
            return Err(MarketDataError::DataUnavailable {
                ticker: ticker.to_string(),
            });
        }
        if !status.is_success() {
            warn!(%status, ticker, "chart request rejected");
            return Err(MarketDataError::Http {
                status: status.as_u16(),
                body,
            });
        }

        parse_chart(&body)
    }
}

impl MarketDataSource for YahooClient {
    #[instrument(skip(self), name = "yahoo::fetch_history")]
    async fn fetch_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceRecord>, MarketDataError> {
        let query = [
            ("period1", unix_midnight(start).to_string()),
            // period2 is exclusive; push it past `end` so that day is included.
            ("period2", unix_midnight(end + DateDelta::days(1)).to_string()),
            ("interval", "1d".to_string()),
            ("events", "div,split".to_string()),
            ("includeAdjustedClose", "true".to_string()),
        ];

        let records = self.get_chart(ticker, &query).await?;
        if records.is_empty() {
            return Err(MarketDataError::DataUnavailable {
                ticker: ticker.to_string(),
            });
        }

        debug!(ticker, count = records.len(), "history retrieved");
        Ok(records)
    }

    #[instrument(skip(self), name = "yahoo::fetch_live")]
    async fn fetch_live(&self, ticker: &str) -> Result<Vec<PriceRecord>, MarketDataError> {
        let query = [
            ("range", "2d".to_string()),
            ("interval", "1d".to_string()),
        ];

        match self.get_chart(ticker, &query).await {
            Ok(records) => {
                debug!(ticker, count = records.len(), "live bars retrieved");
                Ok(records)
            }
            // No rows in a two-day range just means the market has not printed yet.
            Err(MarketDataError::DataUnavailable { .. }) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

// =============================================================================
// Response parsing
// =============================================================================

/// Parse a v8 chart response body into sorted daily records.
///
/// * Adjusted close is used when the response carries it, plain close
///   otherwise.
/// * Rows without a positive close are skipped; a missing volume reads as 0.
pub fn parse_chart(body: &str) -> Result<Vec<PriceRecord>, MarketDataError> {
    let response: ChartResponse = serde_json::from_str(body)
        .map_err(|e| MarketDataError::Parse(format!("chart JSON: {e}")))?;

    if let Some(err) = response.chart.error {
        return Err(MarketDataError::Api(format!("{}: {}", err.code, err.description)));
    }

    let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|a| a.adjclose)
        .unwrap_or_default();

    let offset = result.meta.gmtoffset;
    let mut records = Vec::with_capacity(result.timestamp.len());

    for (i, &ts) in result.timestamp.iter().enumerate() {
        let Some(date) = ts
            .checked_add(offset)
            .and_then(|local| DateTime::from_timestamp(local, 0))
            .map(|dt| dt.date_naive())
        else {
            return Err(MarketDataError::Parse(format!("invalid timestamp {ts}")));
        };

        let close = adjclose
            .get(i)
            .copied()
            .flatten()
            .or_else(|| quote.close.get(i).copied().flatten());
        let volume = quote
            .volume
            .get(i)
            .copied()
            .flatten()
            .map(|v| v.max(0.0) as u64)
            .unwrap_or(0);

        match close {
            Some(close) => {
                let record = PriceRecord::new(date, close, volume);
                if record.is_valid() {
                    records.push(record);
                }
            }
            None => debug!(%date, "skipping bar without close"),
        }
    }

    records.sort_by_key(|r| r.date);
    Ok(records)
}

// Yahoo Finance chart response structures
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartApiError>,
}

#[derive(Debug, Deserialize)]
struct ChartApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: ChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Default, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
    #[serde(default)]
    adjclose: Vec<ChartAdjClose>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartAdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_adjusted_close_with_exchange_offset() {
        // 2024-01-02 14:30 UTC and 2024-01-03 14:30 UTC, New York offset -5h.
        let body = r#"{
            "chart": {
                "result": [{
                    "meta": { "symbol": "AAPL", "gmtoffset": -18000 },
                    "timestamp": [1704205800, 1704292200],
                    "indicators": {
                        "quote": [{ "close": [185.64, 184.25], "volume": [82488700, 58414500] }],
                        "adjclose": [{ "adjclose": [184.94, 183.55] }]
                    }
                }],
                "error": null
            }
        }"#;
        let records = parse_chart(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, d(2024, 1, 2));
        assert_eq!(records[1].date, d(2024, 1, 3));
        assert!((records[0].adj_close - 184.94).abs() < 1e-9);
        assert_eq!(records[1].volume, 58_414_500);
    }

    #[test]
    fn falls_back_to_close_without_adjclose() {
        let body = r#"{
            "chart": {
                "result": [{
                    "meta": { "gmtoffset": 0 },
                    "timestamp": [1704205800],
                    "indicators": { "quote": [{ "close": [185.64], "volume": [null] }] }
                }],
                "error": null
            }
        }"#;
        let records = parse_chart(body).unwrap();
        assert_eq!(records.len(), 1);
        assert!((records[0].adj_close - 185.64).abs() < 1e-9);
        assert_eq!(records[0].volume, 0);
    }

    #[test]
    fn skips_rows_without_close() {
        let body = r#"{
            "chart": {
                "result": [{
                    "meta": { "gmtoffset": 0 },
                    "timestamp": [1704205800, 1704292200],
                    "indicators": { "quote": [{ "close": [null, 10.0], "volume": [5, 6] }] }
                }],
                "error": null
            }
        }"#;
        let records = parse_chart(body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].volume, 6);
    }

    #[test]
    fn api_error_is_reported() {
        let body = r#"{
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
            }
        }"#;
        match parse_chart(body) {
            Err(MarketDataError::Api(msg)) => assert!(msg.contains("Not Found")),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn empty_result_is_empty_vec() {
        let body = r#"{ "chart": { "result": [], "error": null } }"#;
        assert!(parse_chart(body).unwrap().is_empty());
    }

    #[test]
    fn overflowing_timestamp_is_parse_error() {
        let body = format!(
            r#"{{
                "chart": {{
                    "result": [{{
                        "meta": {{ "gmtoffset": 3600 }},
                        "timestamp": [{}],
                        "indicators": {{ "quote": [{{ "close": [10.0], "volume": [1] }}] }}
                    }}],
                    "error": null
                }}
            }}"#,
            i64::MAX
        );
        assert!(matches!(parse_chart(&body), Err(MarketDataError::Parse(_))));
    }

    #[test]
    fn garbage_is_parse_error() {
        assert!(matches!(parse_chart("<html>"), Err(MarketDataError::Parse(_))));
    }

    #[test]
    fn chart_url_trims_trailing_slash() {
        let client = YahooClient::new("https://example.test/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.chart_url("MSFT"), "https://example.test/v8/finance/chart/MSFT");
    }

    // -------------------------------------------------------------------------
    // HTTP status handling against a local canned server
    // -------------------------------------------------------------------------

    const EMPTY_CHART: &str = r#"{ "chart": { "result": [], "error": null } }"#;
    const NOT_FOUND_CHART: &str = r#"{ "chart": { "result": null, "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" } } }"#;

    /// Serve `status` + `body` to every connection and return the base URL.
    async fn canned_server(status: &'static str, body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{addr}")
    }

    fn client_for(base_url: String) -> YahooClient {
        YahooClient::new(base_url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn empty_history_is_data_unavailable() {
        let client = client_for(canned_server("200 OK", EMPTY_CHART).await);
        let result = client.fetch_history("ACME", d(2024, 1, 1), d(2024, 6, 1)).await;
        match result {
            Err(MarketDataError::DataUnavailable { ticker }) => assert_eq!(ticker, "ACME"),
            other => panic!("expected DataUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_live_range_is_no_update() {
        let client = client_for(canned_server("200 OK", EMPTY_CHART).await);
        assert!(client.fetch_live("ACME").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn not_found_is_unavailable_for_history_and_empty_for_live() {
        let client = client_for(canned_server("404 Not Found", NOT_FOUND_CHART).await);

        let history = client.fetch_history("ZZZZ", d(2024, 1, 1), d(2024, 6, 1)).await;
        assert!(matches!(history, Err(MarketDataError::DataUnavailable { .. })));

        let live = client.fetch_live("ZZZZ").await.unwrap();
        assert!(live.is_empty());
    }

    #[tokio::test]
    async fn server_error_is_http_error() {
        let client = client_for(canned_server("503 Service Unavailable", "upstream down").await);

        match client.fetch_history("ACME", d(2024, 1, 1), d(2024, 6, 1)).await {
            Err(MarketDataError::Http { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "upstream down");
            }
            other => panic!("expected Http error, got {other:?}"),
        }
        assert!(matches!(
            client.fetch_live("ACME").await,
            Err(MarketDataError::Http { status: 503, .. })
        ));
    }

    #[test]
    fn midnight_timestamp() {
        assert_eq!(unix_midnight(d(1970, 1, 2)), 86_400);
    }
}
