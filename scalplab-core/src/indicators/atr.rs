//! Average True Range.

use crate::domain::Candle;

/// Mean of the last `period` true ranges. Needs `period + 1` candles for
/// a full window; fewer returns 0 (neutral: volatility gates fail
/// closed).
pub fn atr(candles: &[Candle], period: usize) -> f64 {
    if period == 0 || candles.len() < period + 1 {
        return 0.0;
    }

    let mut true_ranges = Vec::with_capacity(candles.len() - 1);
    for w in candles.windows(2) {
        let prev_close = w[0].close;
        let c = &w[1];
        let tr = (c.high - c.low)
            .max((c.high - prev_close).abs())
            .max((c.low - prev_close).abs());
        true_ranges.push(tr);
    }

    let tail = &true_ranges[true_ranges.len() - period..];
    tail.iter().sum::<f64>() / period as f64
}
