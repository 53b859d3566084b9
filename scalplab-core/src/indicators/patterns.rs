//! Candlestick pattern detection over the last few bars.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{Candle, Signal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pattern {
    Doji,
    Hammer,
    HangingMan,
    BullishEngulfing,
    BearishEngulfing,
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Pattern::Doji => "Doji",
            Pattern::Hammer => "Hammer",
            Pattern::HangingMan => "Hanging Man",
            Pattern::BullishEngulfing => "Bullish Engulfing",
            Pattern::BearishEngulfing => "Bearish Engulfing",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Medium,
    Strong,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternHit {
    pub pattern: Pattern,
    pub signal: Signal,
    pub strength: Strength,
}

/// Patterns on the last one or two candles. Fewer than 3 candles yields
/// nothing.
pub fn candlestick_patterns(candles: &[Candle]) -> Vec<PatternHit> {
    if candles.len() < 3 {
        return Vec::new();
    }

    let mut hits = Vec::new();
    let curr = &candles[candles.len() - 1];
    let prev = &candles[candles.len() - 2];

    // Doji: body under 10% of the range
    let body = (curr.close - curr.open).abs();
    let range = curr.high - curr.low;
    if range > 0.0 && body / range < 0.1 {
        hits.push(PatternHit {
            pattern: Pattern::Doji,
            signal: Signal::Neutral,
            strength: Strength::Medium,
        });
    }

    // Hammer / hanging man: long lower shadow, tiny upper shadow
    let lower_shadow = curr.open.min(curr.close) - curr.low;
    let upper_shadow = curr.high - curr.open.max(curr.close);
    if lower_shadow > body * 2.0 && upper_shadow < body * 0.5 {
        if curr.is_bullish() {
            hits.push(PatternHit {
                pattern: Pattern::Hammer,
                signal: Signal::Buy,
                strength: Strength::Strong,
            });
        } else {
            hits.push(PatternHit {
                pattern: Pattern::HangingMan,
                signal: Signal::Sell,
                strength: Strength::Medium,
            });
        }
    }

    // Engulfing: current body swallows the previous opposite body by 10%
    let prev_body = (prev.close - prev.open).abs();
    let curr_body = (curr.close - curr.open).abs();
    if prev.is_bearish()
        && curr.is_bullish()
        && curr.open < prev.close
        && curr.close > prev.open
        && curr_body > prev_body * 1.1
    {
        hits.push(PatternHit {
            pattern: Pattern::BullishEngulfing,
            signal: Signal::Buy,
            strength: Strength::Strong,
        });
    }
    if prev.is_bullish()
        && curr.is_bearish()
        && curr.open > prev.close
        && curr.close < prev.open
        && curr_body > prev_body * 1.1
    {
        hits.push(PatternHit {
            pattern: Pattern::BearishEngulfing,
            signal: Signal::Sell,
            strength: Strength::Strong,
        });
    }

    hits
}
