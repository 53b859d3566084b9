//! MACD with a streamed signal line.

use serde::{Deserialize, Serialize};

use super::ema::{ema, EmaState};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macd {
    pub value: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// MACD line (fast EMA − slow EMA), signal line (EMA of the MACD series
/// over a trailing window of up to 50 bars) and histogram.
///
/// The per-bar MACD series comes from two streaming EMA accumulators run
/// once over the full history, so the whole thing is a single pass.
/// Shorter history than `slow` returns all zeros.
pub fn macd(prices: &[f64], fast: usize, slow: usize, signal: usize) -> Macd {
    if prices.len() < slow {
        return Macd::default();
    }

    let mut fast_state = EmaState::new(fast);
    let mut slow_state = EmaState::new(slow);
    // Signal line only looks at the trailing window of the MACD series.
    let start = slow.max(prices.len().saturating_sub(50));
    let mut series = Vec::with_capacity(prices.len() - start);
    let mut line = 0.0;

    for (i, &p) in prices.iter().enumerate() {
        let f = fast_state.update(p);
        let s = slow_state.update(p);
        if let (Some(f), Some(s)) = (f, s) {
            line = f - s;
            if i + 1 > start {
                series.push(line);
            }
        }
    }

    let signal_line = if series.len() >= signal {
        ema(&series, signal)
    } else if !series.is_empty() {
        series.iter().sum::<f64>() / series.len() as f64
    } else {
        0.0
    };

    Macd {
        value: line,
        signal: signal_line,
        histogram: line - signal_line,
    }
}
