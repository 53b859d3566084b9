//! Technical indicator library.
//!
//! One file per indicator. Everything here is a pure function over candle
//! or price slices; insufficient history yields the indicator's neutral
//! default instead of an error, so the signal engine degrades instead of
//! failing mid-stream. The engine enforces its own minimum-history gate
//! on top.

pub mod atr;
pub mod bollinger;
pub mod cci;
pub mod divergence;
pub mod ema;
pub mod macd;
pub mod momentum;
pub mod patterns;
pub mod price_action;
pub mod rsi;
pub mod stochastic;
pub mod volatility;
pub mod volume_profile;
pub mod vwap;
pub mod williams_r;

pub use atr::atr;
pub use bollinger::{bollinger, Bollinger};
pub use cci::cci;
pub use divergence::{divergence, Divergence, DivergenceKind};
pub use ema::{ema, EmaState};
pub use macd::{macd, Macd};
pub use momentum::{momentum, Momentum};
pub use patterns::{candlestick_patterns, Pattern, PatternHit, Strength};
pub use price_action::{price_action, PaKind, PaSignal};
pub use rsi::{rsi, rsi_series};
pub use stochastic::{stochastic, Stochastic};
pub use volatility::{volatility_regime, Regime, VolatilityRegime};
pub use volume_profile::{volume_profile, VolumeProfile};
pub use vwap::vwap;
pub use williams_r::williams_r;

use crate::domain::Candle;

/// Recent-volume surge ratio: the last 5 candles' volume against five
/// bars of the trailing-20 average. Below 20 candles the ratio is 0 so
/// the entry gate fails closed.
pub fn volume_ratio(candles: &[Candle]) -> f64 {
    if candles.len() < 20 {
        return 0.0;
    }
    let recent: f64 = candles[candles.len() - 5..].iter().map(|c| c.volume).sum();
    let avg: f64 = candles[candles.len() - 20..]
        .iter()
        .map(|c| c.volume)
        .sum::<f64>()
        / 20.0;
    if avg > 0.0 {
        recent / (avg * 5.0)
    } else {
        0.0
    }
}

pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}
