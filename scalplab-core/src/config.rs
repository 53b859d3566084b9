//! Immutable strategy configuration.
//!
//! One `StrategyConfig` value is built up front (defaults, or defaults
//! overlaid with a TOML file) and passed by shared reference into every
//! component. Nothing mutates it after construction; parameter sweeps
//! clone and modify their own copy.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub indicators: IndicatorConfig,
    pub thresholds: SignalThresholds,
    pub sl_tp: SlTpConfig,
    pub stops: StopConfig,
    pub entry: EntryConfig,
    pub quality: QualityWeights,
    pub risk: RiskConfig,
    pub backtest: BacktestCosts,
    pub book: BookConfig,
}

impl StrategyConfig {
    pub fn from_toml(path: &Path) -> Result<StrategyConfig, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let cfg: StrategyConfig = toml::from_str(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sl_tp.min_sl_percent <= 0.0 || self.sl_tp.max_sl_percent < self.sl_tp.min_sl_percent
        {
            return Err(ConfigError::Invalid(
                "sl_tp: require 0 < min_sl_percent <= max_sl_percent".into(),
            ));
        }
        if self.entry.context_min_checks > 6 {
            return Err(ConfigError::Invalid(
                "entry.context_min_checks must be at most 6".into(),
            ));
        }
        if self.quality.total() <= 0.0 {
            return Err(ConfigError::Invalid(
                "quality weights must sum to a positive value".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.risk.base_risk) {
            return Err(ConfigError::Invalid(
                "risk.base_risk must be a fraction in [0, 1)".into(),
            ));
        }
        if self.backtest.initial_capital <= 0.0 {
            return Err(ConfigError::Invalid(
                "backtest.initial_capital must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Lookback periods for the indicator library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub ema_short: usize,
    pub ema_long: usize,
    pub bollinger_period: usize,
    pub bollinger_std: f64,
    pub atr_period: usize,
    pub stochastic_period: usize,
    pub williams_period: usize,
    pub cci_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            ema_short: 20,
            ema_long: 50,
            bollinger_period: 20,
            bollinger_std: 2.0,
            atr_period: 14,
            stochastic_period: 7,
            williams_period: 7,
            cci_period: 10,
        }
    }
}

/// Vote-rule trigger levels for the signal engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalThresholds {
    pub rsi_oversold_strong: f64,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub rsi_overbought_strong: f64,
    pub stochastic_oversold: f64,
    pub stochastic_overbought: f64,
    pub williams_oversold: f64,
    pub williams_overbought: f64,
    pub cci_extreme: f64,
    /// Percent imbalance over the top book levels to count as order flow.
    pub order_flow_imbalance: f64,
    /// Stronger percent imbalance worth a dedicated vote.
    pub book_imbalance: f64,
    /// Squeeze when 20-bar close range falls below this multiple of ATR%.
    pub squeeze_ratio: f64,
    pub volatility_low: f64,
    pub volatility_high: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            rsi_oversold_strong: 30.0,
            rsi_oversold: 40.0,
            rsi_overbought: 60.0,
            rsi_overbought_strong: 70.0,
            stochastic_oversold: 20.0,
            stochastic_overbought: 80.0,
            williams_oversold: -80.0,
            williams_overbought: -20.0,
            cci_extreme: 100.0,
            order_flow_imbalance: 10.0,
            book_imbalance: 15.0,
            squeeze_ratio: 0.5,
            volatility_low: 0.3,
            volatility_high: 0.8,
        }
    }
}

/// Stop-loss and take-profit geometry. Percents are of entry price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlTpConfig {
    pub min_sl_percent: f64,
    pub max_sl_percent: f64,
    /// SL distance = clamp(ATR% * sl_atr_factor, min, max).
    pub sl_atr_factor: f64,
    pub tp1_percent: f64,
    pub tp2_percent: f64,
    pub tp3_percent: f64,
    /// Single-TP variant: tp = max(min_risk_reward * sl, tp_floor_percent).
    pub min_risk_reward: f64,
    pub tp_floor_percent: f64,
    /// Fractions of original size closed at each ladder level.
    pub tp_fractions: [f64; 3],
}

impl Default for SlTpConfig {
    fn default() -> Self {
        Self {
            min_sl_percent: 0.3,
            max_sl_percent: 0.8,
            sl_atr_factor: 1.2,
            tp1_percent: 1.0,
            tp2_percent: 1.8,
            tp3_percent: 2.5,
            min_risk_reward: 1.5,
            tp_floor_percent: 1.2,
            tp_fractions: [0.5, 0.3, 0.2],
        }
    }
}

/// Trailing stop, break-even and time-stop behavior. Activation levels
/// are unrealized PnL percents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StopConfig {
    pub trailing_activation: f64,
    /// Fraction (percent) of the max-profit watermark the trail locks in.
    pub trailing_percent: f64,
    pub break_even_activation: f64,
    pub time_stop_minutes: f64,
    /// Positions under this PnL% after `time_stop_minutes` are cut.
    pub time_stop_min_profit: f64,
}

impl Default for StopConfig {
    fn default() -> Self {
        Self {
            trailing_activation: 0.8,
            trailing_percent: 50.0,
            break_even_activation: 0.5,
            time_stop_minutes: 15.0,
            time_stop_min_profit: 0.2,
        }
    }
}

/// Entry-gate thresholds (stage one) and the context-validation quorum
/// (stage two).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryConfig {
    pub quality_threshold: f64,
    pub min_volume_ratio: f64,
    /// Max spread as a percent of mid.
    pub max_spread_percent: f64,
    pub min_atr_percent: f64,
    pub max_atr_percent: f64,
    /// How many of the six context checks must align (out of 6).
    pub context_min_checks: usize,
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            quality_threshold: 82.0,
            min_volume_ratio: 2.5,
            max_spread_percent: 0.03,
            min_atr_percent: 0.5,
            max_atr_percent: 1.2,
            context_min_checks: 5,
        }
    }
}

/// Weight table for the six quality dimensions. Scores are renormalized
/// against `total()`, so any positive table yields a 0-100 score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityWeights {
    pub confluence: f64,
    pub volume: f64,
    pub spread: f64,
    pub volatility: f64,
    pub book: f64,
    pub levels: f64,
}

impl QualityWeights {
    pub fn total(&self) -> f64 {
        self.confluence + self.volume + self.spread + self.volatility + self.book + self.levels
    }
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            confluence: 40.0,
            volume: 15.0,
            spread: 10.0,
            volatility: 10.0,
            book: 10.0,
            levels: 15.0,
        }
    }
}

/// Portfolio-level risk gates and position sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub max_positions: usize,
    /// Fraction of balance risked per trade before multipliers.
    pub base_risk: f64,
    pub max_daily_drawdown: f64,
    pub max_position_heat: f64,
    /// Cap on a single position as a fraction of capital.
    pub max_position_percent: f64,
    pub min_notional: f64,
    pub winrate_increase_threshold: f64,
    pub winrate_decrease_threshold: f64,
    pub consecutive_losses_threshold: u32,
    pub correlation_veto: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_positions: 3,
            base_risk: 0.01,
            max_daily_drawdown: 0.03,
            max_position_heat: 0.05,
            max_position_percent: 0.05,
            min_notional: 10.0,
            winrate_increase_threshold: 0.60,
            winrate_decrease_threshold: 0.50,
            consecutive_losses_threshold: 3,
            correlation_veto: 0.70,
        }
    }
}

/// Simulator cost model and loop bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestCosts {
    pub initial_capital: f64,
    pub taker_fee: f64,
    pub maker_fee: f64,
    /// Fill slippage as a fraction of price, charged against the trader.
    pub slippage: f64,
    pub prefer_maker: bool,
    /// Bars scanned forward for an exit before a forced TIMEOUT close.
    pub lookahead_bars: usize,
    pub min_candles: usize,
    /// Warm-up offset = max(50, warmup_fraction * len).
    pub warmup_fraction: f64,
}

impl Default for BacktestCosts {
    fn default() -> Self {
        Self {
            initial_capital: 10_000.0,
            taker_fee: 0.00035,
            maker_fee: 0.0001,
            slippage: 0.0002,
            prefer_maker: false,
            lookahead_bars: 100,
            min_candles: 100,
            warmup_fraction: 0.05,
        }
    }
}

/// Order-book analyzer tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    pub depth: usize,
    /// Levels per side used for the imbalance measure.
    pub imbalance_levels: usize,
    /// Wall = level size above this multiple of the trailing-5 average.
    pub wall_multiplier: f64,
    /// Walls farther than this fraction from price are ignored.
    pub wall_max_distance: f64,
    pub iceberg_detection: bool,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            depth: 50,
            imbalance_levels: 10,
            wall_multiplier: 1.5,
            wall_max_distance: 0.01,
            iceberg_detection: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        StrategyConfig::default().validate().unwrap();
    }

    #[test]
    fn default_quality_weights_sum_to_100() {
        assert!((QualityWeights::default().total() - 100.0).abs() < 1e-12);
    }

    #[test]
    fn inverted_sl_bounds_rejected() {
        let mut cfg = StrategyConfig::default();
        cfg.sl_tp.min_sl_percent = 1.0;
        cfg.sl_tp.max_sl_percent = 0.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_toml_overlays_defaults() {
        let cfg: StrategyConfig = toml::from_str(
            r#"
            [entry]
            quality_threshold = 75.0

            [sl_tp]
            max_sl_percent = 1.0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.entry.quality_threshold, 75.0);
        assert_eq!(cfg.entry.min_volume_ratio, 2.5);
        assert_eq!(cfg.sl_tp.max_sl_percent, 1.0);
        assert_eq!(cfg.indicators.rsi_period, 14);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let cfg = StrategyConfig::default();
        let text = toml::to_string(&cfg).unwrap();
        let back: StrategyConfig = toml::from_str(&text).unwrap();
        assert_eq!(cfg, back);
    }
}
