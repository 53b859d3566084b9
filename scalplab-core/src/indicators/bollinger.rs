//! Bollinger bands.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bollinger {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl Bollinger {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Bands at `middle ± std_dev * sigma` over the trailing period, with the
/// sample standard deviation (n−1). The lower band is floored at 0.
/// Shorter history collapses all bands onto the last price.
pub fn bollinger(prices: &[f64], period: usize, std_dev: f64) -> Bollinger {
    if period == 0 || prices.len() < period {
        let p = prices.last().copied().unwrap_or(0.0);
        return Bollinger {
            upper: p,
            middle: p,
            lower: p,
        };
    }

    let recent = &prices[prices.len() - period..];
    let middle = recent.iter().sum::<f64>() / period as f64;
    let variance = if period > 1 {
        recent.iter().map(|p| (p - middle).powi(2)).sum::<f64>() / (period - 1) as f64
    } else {
        0.0
    };
    let sigma = variance.sqrt();

    Bollinger {
        upper: middle + std_dev * sigma,
        middle,
        lower: (middle - std_dev * sigma).max(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_history_collapses_on_price() {
        let b = bollinger(&[100.0, 101.0], 20, 2.0);
        assert_eq!(b.upper, 101.0);
        assert_eq!(b.lower, 101.0);
    }

    #[test]
    fn flat_series_has_zero_width() {
        let b = bollinger(&[100.0; 30], 20, 2.0);
        assert!(b.width() < 1e-12);
        assert_eq!(b.middle, 100.0);
    }

    #[test]
    fn bands_straddle_the_mean() {
        let prices: Vec<f64> = (0..30)
            .map(|i| 100.0 + (i as f64 * 0.8).sin() * 2.0)
            .collect();
        let b = bollinger(&prices, 20, 2.0);
        assert!(b.upper > b.middle);
        assert!(b.lower < b.middle);
    }

    #[test]
    fn lower_band_never_negative() {
        let prices = vec![0.5, 4.0, 0.2, 5.0, 0.1, 6.0, 0.3, 4.5, 0.2, 5.5];
        let b = bollinger(&prices, 10, 2.0);
        assert!(b.lower >= 0.0);
    }
}
