//! Momentum, velocity and acceleration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Momentum {
    /// Absolute price change over the lookback.
    pub momentum: f64,
    /// Change as a percent of the lookback-start price.
    pub momentum_percent: f64,
    /// Bar-over-bar rate of change, percent.
    pub velocity: f64,
    /// Change of velocity between the last two bars, percent.
    pub acceleration: f64,
}

/// Micro-structure momentum over the last `period` prices. Shorter
/// history reads all zeros.
pub fn momentum(prices: &[f64], period: usize) -> Momentum {
    if period == 0 || prices.len() < period {
        return Momentum::default();
    }

    let n = prices.len();
    let start = prices[n - period];
    let raw = prices[n - 1] - start;
    let percent = if start > 0.0 { raw / start * 100.0 } else { 0.0 };

    let velocity = if period >= 2 && n >= 2 && prices[n - 2] > 0.0 {
        (prices[n - 1] - prices[n - 2]) / prices[n - 2] * 100.0
    } else {
        0.0
    };

    let acceleration = if period >= 3 && n >= 3 && prices[n - 3] > 0.0 {
        let prev_velocity = (prices[n - 2] - prices[n - 3]) / prices[n - 3] * 100.0;
        velocity - prev_velocity
    } else {
        0.0
    };

    Momentum {
        momentum: raw,
        momentum_percent: percent,
        velocity,
        acceleration,
    }
}
