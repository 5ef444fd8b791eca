// =============================================================================
// Runtime Configuration — operational settings with atomic save
// =============================================================================
//
// Indicator parameters are fixed; only operational knobs live here (poll
// cadence, history lookback, data source endpoint, chart output).
//
// Loading order: defaults → `tickerwatch.json` → `TICKERWATCH_*` environment
// variables.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
// =============================================================================

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const CONFIG_FILE: &str = "tickerwatch.json";

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_history_days() -> i64 {
    730
}

fn default_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

// =============================================================================
// RuntimeConfig
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Seconds between live polls.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Calendar days of history fetched at startup.
    #[serde(default = "default_history_days")]
    pub history_days: i64,

    /// Chart API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Write the HTML chart after the initial fetch.
    #[serde(default = "default_true")]
    pub render_chart: bool,

    /// Where the chart goes.  `None` means `<TICKER>_chart.html` in the
    /// working directory.
    #[serde(default)]
    pub chart_path: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            history_days: default_history_days(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            render_chart: true,
            chart_path: None,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            poll_interval_secs = config.poll_interval_secs,
            history_days = config.history_days,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Persist the configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }

    /// Apply `TICKERWATCH_*` overrides read through `lookup`.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("TICKERWATCH_POLL_SECS") {
            match v.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.poll_interval_secs = secs,
                _ => warn!(value = %v, "ignoring invalid TICKERWATCH_POLL_SECS"),
            }
        }
        if let Some(v) = lookup("TICKERWATCH_HISTORY_DAYS") {
            match v.trim().parse::<i64>() {
                Ok(days) if days > 0 => self.history_days = days,
                _ => warn!(value = %v, "ignoring invalid TICKERWATCH_HISTORY_DAYS"),
            }
        }
        if let Some(v) = lookup("TICKERWATCH_BASE_URL") {
            if !v.trim().is_empty() {
                self.base_url = v.trim().to_string();
            }
        }
        if let Some(v) = lookup("TICKERWATCH_CHART_PATH") {
            if !v.trim().is_empty() {
                self.chart_path = Some(PathBuf::from(v.trim()));
            }
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn chart_path_for(&self, ticker: &str) -> PathBuf {
        self.chart_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{ticker}_chart.html")))
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.poll_interval_secs, 60);
        assert_eq!(cfg.history_days, 730);
        assert_eq!(cfg.base_url, "https://query1.finance.yahoo.com");
        assert!(cfg.render_chart);
        assert!(cfg.chart_path.is_none());
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, RuntimeConfig::default());
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "poll_interval_secs": 15, "render_chart": false }"#;
        let cfg: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.poll_interval_secs, 15);
        assert!(!cfg.render_chart);
        assert_eq!(cfg.history_days, 730);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let cfg = RuntimeConfig {
            poll_interval_secs: 5,
            chart_path: Some(PathBuf::from("out.html")),
            ..RuntimeConfig::default()
        };
        cfg.save(&path).unwrap();
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(RuntimeConfig::load(&path).unwrap(), cfg);
    }

    #[test]
    fn load_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(RuntimeConfig::load(dir.path().join("nope.json")).is_err());
    }

    #[test]
    fn env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TICKERWATCH_POLL_SECS", "30"),
            ("TICKERWATCH_HISTORY_DAYS", "not-a-number"),
            ("TICKERWATCH_CHART_PATH", " /tmp/c.html "),
        ]
        .into_iter()
        .collect();

        let mut cfg = RuntimeConfig::default();
        cfg.apply_env(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.poll_interval_secs, 30);
        assert_eq!(cfg.history_days, 730);
        assert_eq!(cfg.chart_path_for("AAPL"), PathBuf::from("/tmp/c.html"));
    }

    #[test]
    fn chart_path_defaults_to_ticker_name() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.chart_path_for("MSFT"), PathBuf::from("MSFT_chart.html"));
    }

    #[test]
    fn zero_interval_is_clamped() {
        let cfg = RuntimeConfig {
            poll_interval_secs: 0,
            ..RuntimeConfig::default()
        };
        assert_eq!(cfg.poll_interval(), Duration::from_secs(1));
    }
}
