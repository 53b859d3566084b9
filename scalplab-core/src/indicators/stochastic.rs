//! Stochastic oscillator.

use serde::{Deserialize, Serialize};

use crate::domain::Candle;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stochastic {
    pub k: f64,
    pub d: f64,
}

impl Default for Stochastic {
    fn default() -> Self {
        Stochastic { k: 50.0, d: 50.0 }
    }
}

/// %K over the trailing window and %D as the 3-bar mean of %K. Shorter
/// history reads the neutral {50, 50}; with too little history for a %K
/// series, %D equals %K.
pub fn stochastic(candles: &[Candle], period: usize) -> Stochastic {
    if period == 0 || candles.len() < period {
        return Stochastic::default();
    }

    let k = percent_k(&candles[candles.len() - period..]);

    let d = if candles.len() >= period + 2 {
        let mut k_values = Vec::with_capacity(candles.len() - period);
        for i in period..candles.len() {
            k_values.push(percent_k(&candles[i - period..=i]));
        }
        let tail = &k_values[k_values.len().saturating_sub(3)..];
        tail.iter().sum::<f64>() / tail.len() as f64
    } else {
        k
    };

    Stochastic { k, d }
}

fn percent_k(window: &[Candle]) -> f64 {
    let low = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    let high = window
        .iter()
        .map(|c| c.high)
        .fold(f64::NEG_INFINITY, f64::max);
    let close = window[window.len() - 1].close;
    if high == low {
        50.0
    } else {
        (close - low) / (high - low) * 100.0
    }
}
