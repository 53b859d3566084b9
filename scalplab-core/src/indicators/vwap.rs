//! Volume-weighted average price.

use crate::domain::Candle;

/// Close-weighted VWAP over all provided candles (intraday usage: the
/// caller passes the session's candles). Zero total volume falls back to
/// the last close; an empty slice reads 0.
pub fn vwap(candles: &[Candle]) -> f64 {
    if candles.is_empty() {
        return 0.0;
    }

    let total_volume: f64 = candles.iter().map(|c| c.volume).sum();
    if total_volume == 0.0 {
        return candles[candles.len() - 1].close;
    }

    let weighted: f64 = candles.iter().map(|c| c.close * c.volume).sum();
    weighted / total_volume
}
