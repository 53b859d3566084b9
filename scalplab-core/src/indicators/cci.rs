//! Commodity Channel Index.

use crate::domain::Candle;

/// CCI over the trailing window with the conventional 0.015 scaling.
/// Shorter history, or zero mean deviation, reads the neutral 0.
pub fn cci(candles: &[Candle], period: usize) -> f64 {
    if period == 0 || candles.len() < period {
        return 0.0;
    }

    let recent = &candles[candles.len() - period..];
    let typical: Vec<f64> = recent.iter().map(|c| c.typical_price()).collect();
    let sma = typical.iter().sum::<f64>() / period as f64;
    let mean_deviation = typical.iter().map(|tp| (tp - sma).abs()).sum::<f64>() / period as f64;

    if mean_deviation == 0.0 {
        return 0.0;
    }
    (typical[typical.len() - 1] - sma) / (0.015 * mean_deviation)
}
