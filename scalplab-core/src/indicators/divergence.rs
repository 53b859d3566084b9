//! Price/RSI divergence.

use serde::{Deserialize, Serialize};

use crate::domain::Signal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DivergenceKind {
    Bullish,
    Bearish,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Divergence {
    pub kind: DivergenceKind,
    pub signal: Signal,
}

/// Compares the last 5 bars against the 5 before them. Bullish: price
/// makes a lower low while RSI makes a higher low. Bearish: price makes a
/// higher high while RSI makes a lower high. Needs 10 aligned samples of
/// both series.
pub fn divergence(prices: &[f64], rsi_values: &[f64]) -> Option<Divergence> {
    if prices.len() < 10 || rsi_values.len() < 10 {
        return None;
    }

    let recent_prices = &prices[prices.len() - 5..];
    let recent_rsi = &rsi_values[rsi_values.len() - 5..];
    let prev_prices = &prices[prices.len() - 10..prices.len() - 5];
    let prev_rsi = &rsi_values[rsi_values.len() - 10..rsi_values.len() - 5];

    let price_rising = recent_prices[4] > recent_prices[0];
    let rsi_rising = recent_rsi[4] > recent_rsi[0];

    if !price_rising && rsi_rising {
        let lower_low = min(recent_prices) < min(prev_prices);
        let higher_rsi_low = min(recent_rsi) > min(prev_rsi);
        if lower_low && higher_rsi_low {
            return Some(Divergence {
                kind: DivergenceKind::Bullish,
                signal: Signal::Buy,
            });
        }
    }

    if price_rising && !rsi_rising {
        let higher_high = max(recent_prices) > max(prev_prices);
        let lower_rsi_high = max(recent_rsi) < max(prev_rsi);
        if higher_high && lower_rsi_high {
            return Some(Divergence {
                kind: DivergenceKind::Bearish,
                signal: Signal::Sell,
            });
        }
    }

    None
}

fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}
