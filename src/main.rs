// =============================================================================
// tickerwatch — Main Entry Point
// =============================================================================
//
// Startup is fatal on failure (no ticker, no history).  Once monitoring has
// begun, errors stay inside the poll loop and Ctrl+C ends it cleanly.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod analysis;
mod chart;
mod error;
mod indicators;
mod market_data;
mod monitor;
mod runtime_config;
mod signals;
mod types;
mod yahoo;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Duration, Local};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::analysis::compute_indicators;
use crate::market_data::{MarketDataSource, SeriesStore};
use crate::monitor::Monitor;
use crate::runtime_config::{RuntimeConfig, CONFIG_FILE};
use crate::yahoo::YahooClient;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = RuntimeConfig::load(CONFIG_FILE).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        let defaults = RuntimeConfig::default();
        if !Path::new(CONFIG_FILE).exists() {
            if let Err(e) = defaults.save(CONFIG_FILE) {
                warn!(error = %e, "Failed to write default config");
            }
        }
        defaults
    });
    config.apply_env(|key| std::env::var(key).ok());

    // ── 2. Ticker ────────────────────────────────────────────────────────
    let ticker = prompt_ticker().await?;
    println!("Initializing analysis for {ticker}...");

    // ── 3. Initial history ───────────────────────────────────────────────
    let client = YahooClient::new(config.base_url.clone(), config.request_timeout())?;

    let today = Local::now().date_naive();
    let start = today - Duration::days(config.history_days);
    let history = client
        .fetch_history(&ticker, start, today)
        .await
        .with_context(|| format!("failed to fetch price history for {ticker}"))?;

    let store = SeriesStore::from_records(history);
    info!(
        ticker = %ticker,
        records = store.len(),
        first = ?store.first_date(),
        last = ?store.last_date(),
        last_close = ?store.last().map(|r| r.adj_close),
        "history loaded"
    );

    // ── 4. Chart ─────────────────────────────────────────────────────────
    if config.render_chart {
        let indicated = compute_indicators(&store, today);
        let path = config.chart_path_for(&ticker);
        if let Err(e) = chart::render(&indicated, &ticker, store.volume_scale(), &path) {
            warn!(error = %e, "Chart rendering failed — continuing without chart");
        } else {
            println!("Chart written to {}", path.display());
        }
    }

    // ── 5. Live monitoring ───────────────────────────────────────────────
    println!("Starting live monitoring (Ctrl+C to exit)...");

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Shutdown signal received — stopping gracefully");
                let _ = stop_tx.send(true);
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for Ctrl+C; stop the process externally");
                // Keep the sender alive so the monitor does not read this as a stop.
                std::future::pending::<()>().await;
            }
        }
    });

    let monitor = Monitor::new(client, ticker, store, config.poll_interval());
    let final_store = monitor.run(stop_rx).await;

    println!("\nMonitoring stopped.");
    info!(records = final_store.len(), "tickerwatch shut down complete");
    Ok(())
}

/// Ask for a ticker on stdin.  Blank input or EOF is a startup error.
async fn prompt_ticker() -> Result<String> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"Enter stock ticker (e.g., AAPL): ").await?;
    stdout.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("failed to read ticker from stdin")?;

    types::normalize_ticker(&line).context("no ticker symbol entered")
}
