//! Run artifacts written to an output directory.
//!
//! Four files per run: `trades.json`, `trades.csv`, `equity.json`,
//! `summary.json`. The CSV prints a non-finite profit factor as `inf`,
//! the JSON degrades it to `null`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::config::RunId;
use crate::metrics::PerformanceMetrics;
use crate::runner::BacktestResult;

#[derive(Debug, Serialize)]
struct Summary<'a> {
    run_id: &'a RunId,
    coin: &'a str,
    initial_capital: f64,
    final_capital: f64,
    metrics: &'a PerformanceMetrics,
}

pub fn write_artifacts(dir: impl AsRef<Path>, result: &BacktestResult) -> Result<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    write_json(dir.join("trades.json"), &result.output.trades)?;
    write_json(dir.join("equity.json"), &result.output.equity_curve)?;
    write_json(
        dir.join("summary.json"),
        &Summary {
            run_id: &result.run_id,
            coin: &result.config.coin,
            initial_capital: result.output.initial_capital,
            final_capital: result.output.final_capital,
            metrics: &result.metrics,
        },
    )?;

    let csv_path = dir.join("trades.csv");
    let mut writer = csv::Writer::from_path(&csv_path)
        .with_context(|| format!("creating {}", csv_path.display()))?;
    for trade in &result.output.trades {
        writer.serialize(trade)?;
    }
    writer.flush()?;

    info!(dir = %dir.display(), trades = result.output.trades.len(), "artifacts written");
    Ok(())
}

fn write_json(path: impl AsRef<Path>, value: &impl Serialize) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use crate::runner;
    use scalplab_core::data::{MarketDataFeed, SyntheticFeed};

    #[test]
    fn writes_all_four_artifacts() {
        let feed = SyntheticFeed::new(5);
        let candles = feed.fetch_candles("BTC", "1m", 300);
        let result = runner::run(&RunConfig::new("BTC"), &candles).unwrap();

        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path(), &result).unwrap();

        for name in ["trades.json", "trades.csv", "equity.json", "summary.json"] {
            assert!(dir.path().join(name).exists(), "missing {name}");
        }
        let summary = fs::read_to_string(dir.path().join("summary.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&summary).unwrap();
        assert_eq!(parsed["coin"], "BTC");
        assert!(parsed["metrics"]["trade_count"].is_number());
    }
}
