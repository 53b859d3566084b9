//! Exponential moving average with SMA seeding.

/// EMA over the full slice: seeded with the simple average of the first
/// `period` values, multiplier 2/(period+1). Shorter history returns the
/// last price (or 0 for an empty slice).
pub fn ema(prices: &[f64], period: usize) -> f64 {
    if period == 0 || prices.len() < period {
        return prices.last().copied().unwrap_or(0.0);
    }
    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut value = prices[..period].iter().sum::<f64>() / period as f64;
    for &p in &prices[period..] {
        value = p * multiplier + value * (1.0 - multiplier);
    }
    value
}

/// Streaming EMA accumulator. Feeding prices one at a time produces the
/// same values as `ema` over the growing prefix.
#[derive(Debug, Clone)]
pub struct EmaState {
    period: usize,
    multiplier: f64,
    seed: Vec<f64>,
    value: Option<f64>,
}

impl EmaState {
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
            multiplier: 2.0 / (period.max(1) as f64 + 1.0),
            seed: Vec::with_capacity(period),
            value: None,
        }
    }

    /// Push one price; returns the EMA once seeded.
    pub fn update(&mut self, price: f64) -> Option<f64> {
        match self.value {
            Some(v) => {
                let next = price * self.multiplier + v * (1.0 - self.multiplier);
                self.value = Some(next);
                Some(next)
            }
            None => {
                self.seed.push(price);
                if self.seed.len() == self.period {
                    let sma = self.seed.iter().sum::<f64>() / self.period as f64;
                    self.value = Some(sma);
                    Some(sma)
                } else {
                    None
                }
            }
        }
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }
}
