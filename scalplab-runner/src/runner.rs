//! Single-run orchestration: candles in, result out.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use scalplab_core::domain::Candle;
use scalplab_core::sim::{Backtester, RunOutput};

use crate::config::{RunConfig, RunId};
use crate::metrics::PerformanceMetrics;

/// The full record of one run: reproducible config, raw output, metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub run_id: RunId,
    pub config: RunConfig,
    pub output: RunOutput,
    pub metrics: PerformanceMetrics,
}

/// Keep candles whose timestamp falls inside the configured date range.
/// Both bounds are inclusive whole days in UTC.
pub fn filter_by_date(
    candles: &[Candle],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<Candle> {
    candles
        .iter()
        .filter(|c| {
            let Some(date) = DateTime::<Utc>::from_timestamp(c.time, 0).map(|d| d.date_naive())
            else {
                return false;
            };
            if let Some(start) = start {
                if date < start {
                    return false;
                }
            }
            if let Some(end) = end {
                if date > end {
                    return false;
                }
            }
            true
        })
        .copied()
        .collect()
}

pub fn run(config: &RunConfig, candles: &[Candle]) -> Result<BacktestResult> {
    let run_id = config.run_id();
    info!(run_id = %run_id, coin = %config.coin, bars = candles.len(), "run start");

    let candles = filter_by_date(candles, config.start_date, config.end_date);
    if candles.is_empty() {
        bail!("no candles in the configured date range");
    }

    let backtester = Backtester::new(config.effective_strategy());
    let output = backtester
        .run(&config.coin, &candles)
        .with_context(|| format!("backtest for {}", config.coin))?;
    let metrics = PerformanceMetrics::compute(&output.trades, &output.equity_curve);

    info!(
        run_id = %run_id,
        trades = metrics.trade_count,
        winrate = metrics.winrate,
        pnl = metrics.total_pnl,
        "run done"
    );

    Ok(BacktestResult {
        run_id,
        config: config.clone(),
        output,
        metrics,
    })
}
