//! Serializable run configuration.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use scalplab_core::config::StrategyConfig;

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

/// Everything needed to reproduce a run: the coin, the window, the
/// capital, and the full strategy configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub coin: String,
    pub interval: String,
    /// Backtest start date (inclusive), in UTC.
    pub start_date: Option<NaiveDate>,
    /// Backtest end date (inclusive), in UTC.
    pub end_date: Option<NaiveDate>,
    pub initial_capital: f64,
    /// Overrides `strategy.entry.quality_threshold` when set.
    pub quality_threshold: Option<f64>,
    pub strategy: StrategyConfig,
}

impl RunConfig {
    pub fn new(coin: &str) -> Self {
        Self {
            coin: coin.to_string(),
            interval: "1m".to_string(),
            start_date: None,
            end_date: None,
            initial_capital: 10_000.0,
            quality_threshold: None,
            strategy: StrategyConfig::default(),
        }
    }

    /// Deterministic hash ID for this configuration. Two identical
    /// configs share a RunId, so results can be cached or deduplicated.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("RunConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }

    /// The strategy config with run-level overrides applied.
    pub fn effective_strategy(&self) -> StrategyConfig {
        let mut strategy = self.strategy.clone();
        strategy.backtest.initial_capital = self.initial_capital;
        if let Some(threshold) = self.quality_threshold {
            strategy.entry.quality_threshold = threshold;
        }
        strategy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_id_is_deterministic() {
        let a = RunConfig::new("BTC");
        let b = RunConfig::new("BTC");
        assert_eq!(a.run_id(), b.run_id());
    }

    #[test]
    fn run_id_changes_with_config() {
        let a = RunConfig::new("BTC");
        let mut b = RunConfig::new("BTC");
        b.quality_threshold = Some(90.0);
        assert_ne!(a.run_id(), b.run_id());
    }

    #[test]
    fn overrides_apply() {
        let mut cfg = RunConfig::new("BTC");
        cfg.initial_capital = 50_000.0;
        cfg.quality_threshold = Some(88.0);
        let strategy = cfg.effective_strategy();
        assert_eq!(strategy.backtest.initial_capital, 50_000.0);
        assert_eq!(strategy.entry.quality_threshold, 88.0);
    }
}
