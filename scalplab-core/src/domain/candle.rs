//! OHLCV candle, the unit of market history.
//!
//! Timestamps are epoch seconds. Feeds that speak millisecond timestamps
//! or string-encoded numbers normalize before constructing a `Candle`
//! (see `data::wire`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Structural validity: finite fields, high is the max, low is the min,
    /// volume non-negative. Insane candles are dropped at the feed boundary.
    pub fn is_sane(&self) -> bool {
        let finite = self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite();
        finite
            && self.high >= self.low
            && self.high >= self.open.max(self.close)
            && self.low <= self.open.min(self.close)
            && self.volume >= 0.0
            && self.low > 0.0
    }

    /// Body of the candle as a fraction of its full range. Zero-range
    /// candles report 0.
    pub fn body_ratio(&self) -> f64 {
        let range = self.high - self.low;
        if range <= 0.0 {
            return 0.0;
        }
        (self.close - self.open).abs() / range
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Typical price used by VWAP, CCI and the volume profile.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

/// Minutes elapsed between two candles' open times.
pub fn minutes_between(earlier: i64, later: i64) -> f64 {
    (later - earlier) as f64 / 60.0
}
