//! Relative Strength Index, Wilder smoothing.

/// RSI over the tail of `prices`. Fewer than `period + 1` prices returns
/// the neutral 50.
///
/// Seeding: simple average of gains/losses across the last `period`
/// changes, then the Wilder recursion `avg = (avg*(p-1) + v) / p` over
/// the final `period - 1` changes. Clamped to [0, 100]; a window with no
/// losses reads 100, a dead-flat window reads 50 via zero-gain handling.
pub fn rsi(prices: &[f64], period: usize) -> f64 {
    if period == 0 || prices.len() < period + 1 {
        return 50.0;
    }

    let n = prices.len();
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in n - period..n {
        let change = prices[i] - prices[i - 1];
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss += -change;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;

    for i in n - period + 1..n {
        let change = prices[i] - prices[i - 1];
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
    }

    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            return 50.0;
        }
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}

/// Streaming RSI series in one pass over the whole history.
///
/// Indices before `period` are NaN (warm-up); from `period` onward the
/// Wilder averages are carried forward bar by bar, so divergence
/// detection gets a full history without per-prefix recomputation.
pub fn rsi_series(prices: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; prices.len()];
    if period == 0 || prices.len() < period + 1 {
        return out;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let change = prices[i] - prices[i - 1];
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss += -change;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    out[period] = point(avg_gain, avg_loss);

    for i in period + 1..prices.len() {
        let change = prices[i] - prices[i - 1];
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
        out[i] = point(avg_gain, avg_loss);
    }
    out
}

fn point(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            return 50.0;
        }
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}
