//! Williams %R.

use crate::domain::Candle;

/// Williams %R over the trailing window, in [-100, 0]. Shorter history
/// (or a degenerate flat window) reads the neutral -50.
pub fn williams_r(candles: &[Candle], period: usize) -> f64 {
    if period == 0 || candles.len() < period {
        return -50.0;
    }

    let recent = &candles[candles.len() - period..];
    let high = recent
        .iter()
        .map(|c| c.high)
        .fold(f64::NEG_INFINITY, f64::max);
    let low = recent.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    let close = recent[recent.len() - 1].close;

    if high == low {
        return -50.0;
    }
    (high - close) / (high - low) * -100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::fixtures::{flat_candles, trending_candles};

    #[test]
    fn short_history_is_neutral() {
        assert_eq!(williams_r(&flat_candles(3, 100.0), 7), -50.0);
    }

    #[test]
    fn uptrend_reads_near_zero() {
        let v = williams_r(&trending_candles(30, 100.0, 1.0), 7);
        assert!(v > -15.0);
    }

    #[test]
    fn downtrend_reads_near_minus_100() {
        let v = williams_r(&trending_candles(30, 200.0, -1.0), 7);
        assert!(v < -85.0);
    }

    #[test]
    fn bounded() {
        let v = williams_r(&trending_candles(40, 100.0, 0.2), 7);
        assert!((-100.0..=0.0).contains(&v));
    }
}
