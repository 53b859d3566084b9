//! Volatility regime classification.

use serde::{Deserialize, Serialize};

use crate::domain::Candle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    Unknown,
    Low,
    Normal,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityRegime {
    pub regime: Regime,
    /// ATR as a percent of price.
    pub atr_percent: f64,
    /// Very narrow 20-bar close range relative to ATR; breakout setup.
    pub squeeze: bool,
}

impl Default for VolatilityRegime {
    fn default() -> Self {
        VolatilityRegime {
            regime: Regime::Unknown,
            atr_percent: 0.0,
            squeeze: false,
        }
    }
}

/// Classify by ATR%: below `low_threshold` is low, above `high_threshold`
/// is high. Squeeze when the 20-bar close range is under `squeeze_ratio`
/// of ATR%. Zero ATR or price reads Unknown.
pub fn volatility_regime(
    atr: f64,
    price: f64,
    candles: &[Candle],
    low_threshold: f64,
    high_threshold: f64,
    squeeze_ratio: f64,
) -> VolatilityRegime {
    if atr == 0.0 || price == 0.0 {
        return VolatilityRegime::default();
    }

    let atr_percent = atr / price * 100.0;

    let squeeze = if candles.len() >= 20 {
        let closes = &candles[candles.len() - 20..];
        let max = closes.iter().map(|c| c.close).fold(f64::NEG_INFINITY, f64::max);
        let min = closes.iter().map(|c| c.close).fold(f64::INFINITY, f64::min);
        let range_percent = (max - min) / price * 100.0;
        range_percent < atr_percent * squeeze_ratio
    } else {
        false
    };

    let regime = if atr_percent < low_threshold {
        Regime::Low
    } else if atr_percent < high_threshold {
        Regime::Normal
    } else {
        Regime::High
    };

    VolatilityRegime {
        regime,
        atr_percent,
        squeeze,
    }
}
