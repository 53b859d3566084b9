//! Signal quality score.
//!
//! Six weighted dimensions produce a 0-100 score. The weight table is
//! configurable; sub-scores are expressed as fractions of their dimension
//! weight and the total is renormalized against the table sum, so a
//! custom table still maps onto [0, 100]. The score is symmetric: a SELL
//! setup mirrored from a BUY setup scores identically.

use crate::config::QualityWeights;

pub struct QualityInputs<'a> {
    pub buy_votes: u32,
    pub sell_votes: u32,
    pub macd_histogram: f64,
    pub ema_short: f64,
    pub ema_long: f64,
    pub price: f64,
    pub volume_ratio: f64,
    /// Percent of mid.
    pub spread_percent: f64,
    /// ATR as a fraction of price.
    pub atr_fraction: f64,
    /// Signed percent, positive favoring bids.
    pub book_imbalance: f64,
    pub supports: &'a [f64],
    pub resistances: &'a [f64],
}

pub fn signal_quality(inputs: &QualityInputs<'_>, w: &QualityWeights) -> f64 {
    let mut score = 0.0;
    let buying = inputs.buy_votes > inputs.sell_votes;

    // 1. Confluence: vote margin plus trend alignment, half weight each
    let diff = inputs.buy_votes.abs_diff(inputs.sell_votes);
    let margin_frac = if diff >= 5 {
        0.5
    } else if diff >= 4 {
        0.375
    } else if diff >= 3 {
        0.25
    } else if diff >= 2 {
        0.125
    } else {
        0.0
    };
    score += margin_frac * w.confluence;

    let trend_frac = if buying {
        if inputs.price > inputs.ema_short
            && inputs.ema_short > inputs.ema_long
            && inputs.macd_histogram > 0.0
        {
            0.5
        } else if inputs.price > inputs.ema_short {
            0.25
        } else {
            0.0
        }
    } else if inputs.price < inputs.ema_short
        && inputs.ema_short < inputs.ema_long
        && inputs.macd_histogram < 0.0
    {
        0.5
    } else if inputs.price < inputs.ema_short {
        0.25
    } else {
        0.0
    };
    score += trend_frac * w.confluence;

    // 2. Volume surge
    let volume_frac = if inputs.volume_ratio >= 3.0 {
        1.0
    } else if inputs.volume_ratio >= 2.5 {
        2.0 / 3.0
    } else if inputs.volume_ratio >= 2.0 {
        1.0 / 3.0
    } else {
        0.0
    };
    score += volume_frac * w.volume;

    // 3. Spread tightness
    let spread_frac = if inputs.spread_percent <= 0.02 {
        1.0
    } else if inputs.spread_percent <= 0.03 {
        0.5
    } else {
        0.0
    };
    score += spread_frac * w.spread;

    // 4. Volatility sweet spot
    let vol_frac = if (0.005..=0.01).contains(&inputs.atr_fraction) {
        1.0
    } else if (0.004..=0.012).contains(&inputs.atr_fraction) {
        0.5
    } else {
        0.0
    };
    score += vol_frac * w.volatility;

    // 5. Book imbalance aligned with the direction
    let imb = inputs.book_imbalance;
    let book_frac = if imb.abs() >= 20.0 {
        let aligned = (imb > 0.0 && buying) || (imb < 0.0 && !buying);
        if aligned {
            1.0
        } else {
            0.0
        }
    } else if imb.abs() >= 15.0 {
        0.5
    } else {
        0.0
    };
    score += book_frac * w.book;

    // 6. Proximity to a key level on the trade side
    let level_side = if buying {
        inputs.supports
    } else {
        inputs.resistances
    };
    let mut level_frac = 0.0;
    if inputs.price > 0.0 {
        for &level in level_side.iter().take(2) {
            if level <= 0.0 {
                continue;
            }
            let distance = (inputs.price - level).abs() / inputs.price;
            if distance <= 0.003 {
                level_frac = 1.0;
                break;
            } else if distance <= 0.005 {
                level_frac = 2.0 / 3.0;
                break;
            }
        }
    }
    score += level_frac * w.levels;

    let total = w.total();
    if total <= 0.0 {
        return 0.0;
    }
    (score / total * 100.0).min(100.0)
}
