//! Parameter sweeps across the entry and stop knobs.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use scalplab_core::domain::Candle;

use crate::config::{RunConfig, RunId};
use crate::runner;

/// The grid: one run per combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamGrid {
    pub quality_thresholds: Vec<f64>,
    pub max_sl_percents: Vec<f64>,
    pub trailing_activations: Vec<f64>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            quality_thresholds: vec![75.0, 82.0, 88.0],
            max_sl_percents: vec![0.6, 0.8, 1.0],
            trailing_activations: vec![0.6, 0.8, 1.0],
        }
    }
}

impl ParamGrid {
    pub fn len(&self) -> usize {
        self.quality_thresholds.len() * self.max_sl_percents.len() * self.trailing_activations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Materialize one config per grid point, base config cloned each
    /// time so runs stay independent.
    pub fn expand(&self, base: &RunConfig) -> Vec<RunConfig> {
        let mut configs = Vec::with_capacity(self.len());
        for &quality in &self.quality_thresholds {
            for &max_sl in &self.max_sl_percents {
                for &trailing in &self.trailing_activations {
                    let mut config = base.clone();
                    config.quality_threshold = Some(quality);
                    config.strategy.sl_tp.max_sl_percent = max_sl;
                    config.strategy.stops.trailing_activation = trailing;
                    configs.push(config);
                }
            }
        }
        configs
    }
}

/// One sweep row: the knobs plus the headline numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepRow {
    pub run_id: RunId,
    pub quality_threshold: f64,
    pub max_sl_percent: f64,
    pub trailing_activation: f64,
    pub trades: usize,
    pub winrate: f64,
    pub profit_factor: f64,
    pub sharpe: f64,
    pub total_pnl: f64,
}

/// Run the whole grid in parallel, best total PnL first. Grid points
/// that fail (for example an empty date range) are dropped.
pub fn run_sweep(base: &RunConfig, grid: &ParamGrid, candles: &[Candle]) -> Vec<SweepRow> {
    let configs = grid.expand(base);
    info!(runs = configs.len(), coin = %base.coin, "sweep start");

    let mut rows: Vec<SweepRow> = configs
        .par_iter()
        .filter_map(|config| {
            let result = runner::run(config, candles).ok()?;
            Some(SweepRow {
                run_id: result.run_id,
                quality_threshold: config
                    .quality_threshold
                    .unwrap_or(config.strategy.entry.quality_threshold),
                max_sl_percent: config.strategy.sl_tp.max_sl_percent,
                trailing_activation: config.strategy.stops.trailing_activation,
                trades: result.metrics.trade_count,
                winrate: result.metrics.winrate,
                profit_factor: result.metrics.profit_factor,
                sharpe: result.metrics.sharpe,
                total_pnl: result.metrics.total_pnl,
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total_pnl
            .partial_cmp(&a.total_pnl)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    info!(rows = rows.len(), "sweep done");
    rows
}
