// =============================================================================
// Chart Renderer — interactive HTML (Plotly.js) technical chart
// =============================================================================
//
// Layout:
//   upper panel (70%) — price, 20 SMA, Bollinger upper/lower (dashed)
//   lower panel (20%) — volume bars multiplied by `volume_scale`
// Both panels share the date axis; hover is unified across traces.
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tracing::info;

use crate::types::IndicatedRecord;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Build the Plotly figure (`{ data, layout }`) for `series`.
pub fn build_figure(series: &[IndicatedRecord], ticker: &str, volume_scale: f64) -> Value {
    let dates: Vec<String> = series.iter().map(|r| r.date.format("%Y-%m-%d").to_string()).collect();
    let column = |f: fn(&IndicatedRecord) -> Option<f64>| -> Vec<Option<f64>> {
        series.iter().map(f).collect()
    };

    let price: Vec<f64> = series.iter().map(|r| r.adj_close).collect();
    let volume: Vec<f64> = series.iter().map(|r| r.volume as f64 * volume_scale).collect();

    let data = json!([
        line_trace(&dates, json!(price), "Price", json!({ "color": "blue" })),
        line_trace(&dates, json!(column(|r| r.sma_20)), "20 SMA", json!({ "color": "orange" })),
        line_trace(
            &dates,
            json!(column(|r| r.bollinger_upper)),
            "Upper Band",
            json!({ "color": "green", "dash": "dash" }),
        ),
        line_trace(
            &dates,
            json!(column(|r| r.bollinger_lower)),
            "Lower Band",
            json!({ "color": "red", "dash": "dash" }),
        ),
        {
            "type": "bar",
            "x": dates,
            "y": volume,
            "name": "Volume",
            "marker": { "color": "grey" },
            "xaxis": "x2",
            "yaxis": "y2",
        },
    ]);

    let layout = json!({
        "title": { "text": format!("{ticker} Technical Analysis") },
        "hovermode": "x unified",
        "showlegend": true,
        "legend": { "orientation": "h", "yanchor": "bottom", "y": 1.02, "xanchor": "right", "x": 1 },
        "xaxis": { "anchor": "y", "matches": "x2", "showticklabels": false },
        "xaxis2": { "anchor": "y2" },
        "yaxis": { "domain": [0.23, 1.0] },
        "yaxis2": { "domain": [0.0, 0.2] },
    });

    json!({ "data": data, "layout": layout })
}

fn line_trace(dates: &[String], y: Value, name: &str, line: Value) -> Value {
    json!({
        "type": "scatter",
        "mode": "lines",
        "x": dates,
        "y": y,
        "name": name,
        "line": line,
        "xaxis": "x",
        "yaxis": "y",
    })
}

/// Wrap a figure in a standalone HTML document.
pub fn render_html(figure: &Value, ticker: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{ticker} Technical Analysis</title>
<script src="{PLOTLY_CDN}"></script>
</head>
<body>
<div id="chart" style="width:100%;height:95vh;"></div>
<script>
const figure = {figure};
Plotly.newPlot("chart", figure.data, figure.layout, {{ responsive: true }});
</script>
</body>
</html>
"#
    )
}

/// Render `series` to an HTML file at `path` and return the path written.
pub fn render(
    series: &[IndicatedRecord],
    ticker: &str,
    volume_scale: f64,
    path: impl AsRef<Path>,
) -> Result<PathBuf> {
    let path = path.as_ref();
    let figure = build_figure(series, ticker, volume_scale);
    let html = render_html(&figure, ticker);

    std::fs::write(path, html)
        .with_context(|| format!("failed to write chart to {}", path.display()))?;

    info!(path = %path.display(), rows = series.len(), "chart rendered");
    Ok(path.to_path_buf())
}
