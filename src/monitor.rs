// =============================================================================
// Live Monitor — poll, merge, recompute, evaluate
// =============================================================================
//
// One tick:
//   1. Fetch the latest daily bars (a failed fetch means "no update").
//   2. Merge them into the owned SeriesStore, replacing it.
//   3. Recompute indicators over the full history.
//   4. Evaluate the newest row inside the analysis window.
//
// `run` repeats the tick on a fixed interval until the stop signal fires.  A
// failing tick is logged and never ends the loop.
// =============================================================================

use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveDateTime};
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::analysis::compute_indicators;
use crate::market_data::{MarketDataSource, SeriesStore};
use crate::signals::evaluate_signal;
use crate::types::{IndicatedRecord, Signal};

/// Why a tick produced no signal.
#[derive(Debug, Error, PartialEq)]
pub enum TickError {
    #[error("no price records inside the analysis window ending {as_of}")]
    EmptyWindow { as_of: NaiveDate },
}

/// Outcome of one successful tick.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub timestamp: NaiveDateTime,
    pub ticker: String,
    pub signal: Signal,
    pub latest: IndicatedRecord,
    /// Records received from the live fetch.
    pub received: usize,
}

impl std::fmt::Display for TickReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} Signal: {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.ticker,
            self.signal
        )
    }
}

pub struct Monitor<S> {
    source: S,
    ticker: String,
    store: SeriesStore,
    poll_interval: Duration,
}

impl<S: MarketDataSource> Monitor<S> {
    pub fn new(source: S, ticker: impl Into<String>, store: SeriesStore, poll_interval: Duration) -> Self {
        Self {
            source,
            ticker: ticker.into(),
            store,
            poll_interval,
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &SeriesStore {
        &self.store
    }

    /// Run a single fetch → merge → recompute → evaluate pass as of `now`.
    pub async fn tick(&mut self, now: NaiveDateTime) -> Result<TickReport, TickError> {
        let incoming = match self.source.fetch_live(&self.ticker).await {
            Ok(records) => records,
            Err(e) => {
                warn!(ticker = %self.ticker, error = %e, "live fetch failed — no update this tick");
                Vec::new()
            }
        };

        self.store = self.store.merge(&incoming);

        let as_of = now.date();
        let indicated = compute_indicators(&self.store, as_of);
        let latest = indicated
            .last()
            .cloned()
            .ok_or(TickError::EmptyWindow { as_of })?;
        let signal = evaluate_signal(&latest);

        debug!(
            ticker = %self.ticker,
            date = %latest.date,
            close = latest.adj_close,
            macd = ?latest.macd,
            rsi = ?latest.rsi_14,
            lower = ?latest.bollinger_lower,
            upper = ?latest.bollinger_upper,
            "latest row evaluated"
        );

        Ok(TickReport {
            timestamp: now,
            ticker: self.ticker.clone(),
            signal,
            latest,
            received: incoming.len(),
        })
    }

    /// Poll until `stop` flips to `true` (or its sender is dropped), then
    /// return the final store.
    ///
    /// The first tick runs immediately; each later tick waits one interval.
    pub async fn run(mut self, mut stop: watch::Receiver<bool>) -> SeriesStore {
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            ticker = %self.ticker,
            interval_secs = self.poll_interval.as_secs_f64(),
            records = self.store.len(),
            "live monitoring started"
        );

        loop {
            if *stop.borrow() {
                break;
            }

            tokio::select! {
                biased;
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                    continue;
                }
                _ = interval.tick() => {}
            }

            match self.tick(Local::now().naive_local()).await {
                Ok(report) => {
                    println!("{report}");
                    info!(
                        ticker = %report.ticker,
                        signal = %report.signal,
                        date = %report.latest.date,
                        received = report.received,
                        "tick complete"
                    );
                }
                Err(e) => error!(ticker = %self.ticker, error = %e, "monitoring error"),
            }
        }

        info!(ticker = %self.ticker, records = self.store.len(), "monitoring stopped");
        self.store
    }
}
