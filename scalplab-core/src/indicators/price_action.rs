//! Raw price-action signals over the last few bars.

use serde::{Deserialize, Serialize};

use super::patterns::Strength;
use crate::domain::{Candle, Signal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaKind {
    Breakout,
    Reversal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaSignal {
    pub kind: PaKind,
    pub signal: Signal,
    pub strength: Strength,
}

/// Breakouts of the last 3 bars' range and 2-down-then-up (or mirror)
/// reversals. Needs at least 5 candles.
pub fn price_action(candles: &[Candle], price: f64) -> Vec<PaSignal> {
    if candles.len() < 5 {
        return Vec::new();
    }

    let mut signals = Vec::new();
    let recent = &candles[candles.len() - 5..];
    let last3 = &recent[2..];

    let high3 = last3.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
    let low3 = last3.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);

    if price > high3 {
        signals.push(PaSignal {
            kind: PaKind::Breakout,
            signal: Signal::Buy,
            strength: Strength::Strong,
        });
    }
    if price < low3 {
        signals.push(PaSignal {
            kind: PaKind::Breakout,
            signal: Signal::Sell,
            strength: Strength::Strong,
        });
    }

    let closes: Vec<f64> = recent.iter().map(|c| c.close).collect();
    let last = &recent[4];
    if closes[2] > closes[3] && closes[3] > closes[4] && last.is_bullish() {
        signals.push(PaSignal {
            kind: PaKind::Reversal,
            signal: Signal::Buy,
            strength: Strength::Medium,
        });
    }
    if closes[2] < closes[3] && closes[3] < closes[4] && last.is_bearish() {
        signals.push(PaSignal {
            kind: PaKind::Reversal,
            signal: Signal::Sell,
            strength: Strength::Medium,
        });
    }

    signals
}
