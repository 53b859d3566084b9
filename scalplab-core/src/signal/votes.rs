//! The voting rules behind signal direction.
//!
//! Each rule inspects one indicator family and adds 0-3 votes to the buy
//! or sell side with a human-readable reason. The final direction is a
//! strict-majority read: ties are NEUTRAL.

use crate::book::{BookAnalysis, WallSide};
use crate::config::SignalThresholds;
use crate::domain::{Confidence, Signal};
use crate::indicators::{
    Divergence, Macd, Momentum, PaSignal, PatternHit, Regime, Stochastic, Strength,
    VolatilityRegime,
};
use crate::levels::KeyLevels;

pub struct VoteInputs<'a> {
    pub rsi: f64,
    pub macd: &'a Macd,
    pub ema_short: f64,
    pub ema_long: f64,
    pub price: f64,
    pub bollinger_upper: f64,
    pub bollinger_lower: f64,
    pub order_flow: f64,
    pub book: &'a BookAnalysis,
    pub volatility: &'a VolatilityRegime,
    pub levels: &'a KeyLevels,
    pub patterns: &'a [PatternHit],
    pub divergence: Option<Divergence>,
    pub momentum: &'a Momentum,
    pub stochastic: &'a Stochastic,
    pub williams_r: f64,
    pub cci: f64,
    pub price_action: &'a [PaSignal],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoteTally {
    pub buy: u32,
    pub sell: u32,
    pub reasons: Vec<String>,
}

impl VoteTally {
    /// Strict majority; a tie is NEUTRAL.
    pub fn signal(&self) -> Signal {
        if self.buy > self.sell {
            Signal::Buy
        } else if self.sell > self.buy {
            Signal::Sell
        } else {
            Signal::Neutral
        }
    }

    /// Winning count normalized against 12 possible aligned votes.
    pub fn strength(&self) -> f64 {
        match self.signal() {
            Signal::Buy => (self.buy as f64 / 12.0).min(1.0),
            Signal::Sell => (self.sell as f64 / 12.0).min(1.0),
            Signal::Neutral => 0.5,
        }
    }

    pub fn confidence(&self) -> Confidence {
        let diff = self.buy.abs_diff(self.sell);
        if diff >= 3 {
            Confidence::High
        } else if diff >= 2 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

pub fn cast_votes(inputs: &VoteInputs<'_>, th: &SignalThresholds) -> VoteTally {
    let mut t = VoteTally::default();
    let price = inputs.price;

    // RSI extremes: strong reads are worth two votes
    if inputs.rsi < th.rsi_oversold_strong {
        vote(&mut t, Signal::Buy, 2, format!("RSI {:.1} oversold", inputs.rsi));
    } else if inputs.rsi < th.rsi_oversold {
        vote(&mut t, Signal::Buy, 1, format!("RSI {:.1} mildly oversold", inputs.rsi));
    } else if inputs.rsi > th.rsi_overbought_strong {
        vote(&mut t, Signal::Sell, 2, format!("RSI {:.1} overbought", inputs.rsi));
    } else if inputs.rsi > th.rsi_overbought {
        vote(&mut t, Signal::Sell, 1, format!("RSI {:.1} mildly overbought", inputs.rsi));
    }

    // MACD: histogram and line agreeing
    if inputs.macd.histogram > 0.0 && inputs.macd.value > inputs.macd.signal {
        vote(&mut t, Signal::Buy, 1, "MACD bullish (positive histogram)".into());
    } else if inputs.macd.histogram < 0.0 && inputs.macd.value < inputs.macd.signal {
        vote(&mut t, Signal::Sell, 1, "MACD bearish (negative histogram)".into());
    }

    // EMA cross
    if inputs.ema_short > inputs.ema_long {
        vote(&mut t, Signal::Buy, 1, "short EMA above long EMA".into());
    } else if inputs.ema_short < inputs.ema_long {
        vote(&mut t, Signal::Sell, 1, "short EMA below long EMA".into());
    }

    // Price vs both EMAs
    if price > inputs.ema_short && price > inputs.ema_long {
        vote(&mut t, Signal::Buy, 1, "price above both EMAs".into());
    } else if price < inputs.ema_short && price < inputs.ema_long {
        vote(&mut t, Signal::Sell, 1, "price below both EMAs".into());
    }

    // Bollinger band touch
    if price < inputs.bollinger_lower {
        vote(&mut t, Signal::Buy, 1, "price below lower Bollinger band".into());
    } else if price > inputs.bollinger_upper {
        vote(&mut t, Signal::Sell, 1, "price above upper Bollinger band".into());
    }

    // Order flow imbalance over the top levels
    if inputs.order_flow > th.order_flow_imbalance {
        vote(&mut t, Signal::Buy, 1, format!("order flow +{:.1}% (bid pressure)", inputs.order_flow));
    } else if inputs.order_flow < -th.order_flow_imbalance {
        vote(&mut t, Signal::Sell, 1, format!("order flow {:.1}% (ask pressure)", inputs.order_flow));
    }

    // Walls just beyond price
    if let Some(wall) = inputs.book.wall {
        match wall.side {
            WallSide::Support if price <= wall.price * 1.002 => {
                vote(&mut t, Signal::Buy, 2, format!("support wall at {:.2}", wall.price));
            }
            WallSide::Resistance if price >= wall.price * 0.998 => {
                vote(&mut t, Signal::Sell, 2, format!("resistance wall at {:.2}", wall.price));
            }
            _ => {}
        }
    }

    // Stronger standing book imbalance
    if inputs.book.imbalance > th.book_imbalance {
        vote(&mut t, Signal::Buy, 1, format!("book imbalance +{:.1}%", inputs.book.imbalance));
    } else if inputs.book.imbalance < -th.book_imbalance {
        vote(&mut t, Signal::Sell, 1, format!("book imbalance {:.1}%", inputs.book.imbalance));
    }

    // Volatility context: reasons only, no directional vote
    if inputs.volatility.squeeze {
        t.reasons.push("volatility squeeze, breakout setup".into());
    }
    match inputs.volatility.regime {
        Regime::High => t.reasons.push("high volatility regime".into()),
        Regime::Low => t.reasons.push("low volatility regime, consolidation".into()),
        _ => {}
    }

    // Key levels within 0.2% of price
    for &support in inputs.levels.supports.iter().take(2) {
        if price <= support * 1.002 && price >= support * 0.998 {
            vote(&mut t, Signal::Buy, 1, format!("at key support {support:.2}"));
        }
    }
    for &resistance in inputs.levels.resistances.iter().take(2) {
        if price >= resistance * 0.998 && price <= resistance * 1.002 {
            vote(&mut t, Signal::Sell, 1, format!("at key resistance {resistance:.2}"));
        }
    }

    // Candlestick patterns
    for hit in inputs.patterns {
        let weight = if hit.strength == Strength::Strong { 2 } else { 1 };
        match hit.signal {
            Signal::Buy => vote(&mut t, Signal::Buy, weight, format!("{} pattern", hit.pattern)),
            Signal::Sell => vote(&mut t, Signal::Sell, weight, format!("{} pattern", hit.pattern)),
            Signal::Neutral => t.reasons.push(format!("{} pattern (indecision)", hit.pattern)),
        }
    }

    // Divergence is the strongest single input
    if let Some(d) = inputs.divergence {
        match d.signal {
            Signal::Buy => vote(&mut t, Signal::Buy, 3, "bullish price/RSI divergence".into()),
            Signal::Sell => vote(&mut t, Signal::Sell, 3, "bearish price/RSI divergence".into()),
            Signal::Neutral => {}
        }
    }

    // Momentum and acceleration
    let m = inputs.momentum;
    if m.momentum_percent > 0.5 && m.velocity > 0.1 {
        vote(&mut t, Signal::Buy, 1, format!("strong bullish momentum ({:.2}%)", m.momentum_percent));
    } else if m.momentum_percent < -0.5 && m.velocity < -0.1 {
        vote(&mut t, Signal::Sell, 1, format!("strong bearish momentum ({:.2}%)", m.momentum_percent));
    }
    if m.acceleration > 0.05 {
        vote(&mut t, Signal::Buy, 1, "upward acceleration".into());
    } else if m.acceleration < -0.05 {
        vote(&mut t, Signal::Sell, 1, "downward acceleration".into());
    }

    // Stochastic: extremes worth two, mid-range crosses worth one
    let s = inputs.stochastic;
    if s.k < th.stochastic_oversold && s.d < th.stochastic_oversold {
        vote(&mut t, Signal::Buy, 2, format!("stochastic oversold (K {:.1}, D {:.1})", s.k, s.d));
    } else if s.k > th.stochastic_overbought && s.d > th.stochastic_overbought {
        vote(&mut t, Signal::Sell, 2, format!("stochastic overbought (K {:.1}, D {:.1})", s.k, s.d));
    } else if s.k > s.d && s.k < 50.0 {
        vote(&mut t, Signal::Buy, 1, "stochastic bullish cross".into());
    } else if s.k < s.d && s.k > 50.0 {
        vote(&mut t, Signal::Sell, 1, "stochastic bearish cross".into());
    }

    // Williams %R extremes
    if inputs.williams_r < th.williams_oversold {
        vote(&mut t, Signal::Buy, 2, format!("Williams %R oversold ({:.1})", inputs.williams_r));
    } else if inputs.williams_r > th.williams_overbought {
        vote(&mut t, Signal::Sell, 2, format!("Williams %R overbought ({:.1})", inputs.williams_r));
    }

    // CCI: extremes and mild directional drift
    if inputs.cci < -th.cci_extreme {
        vote(&mut t, Signal::Buy, 1, format!("CCI oversold ({:.1})", inputs.cci));
    } else if inputs.cci > th.cci_extreme {
        vote(&mut t, Signal::Sell, 1, format!("CCI overbought ({:.1})", inputs.cci));
    } else if inputs.cci > 0.0 && inputs.cci < 50.0 {
        vote(&mut t, Signal::Buy, 1, format!("CCI bullish ({:.1})", inputs.cci));
    } else if inputs.cci < 0.0 && inputs.cci > -50.0 {
        vote(&mut t, Signal::Sell, 1, format!("CCI bearish ({:.1})", inputs.cci));
    }

    // Raw price action
    for pa in inputs.price_action {
        let weight = if pa.strength == Strength::Strong { 2 } else { 1 };
        match pa.signal {
            Signal::Buy => vote(&mut t, Signal::Buy, weight, format!("price action {:?} (bullish)", pa.kind)),
            Signal::Sell => vote(&mut t, Signal::Sell, weight, format!("price action {:?} (bearish)", pa.kind)),
            Signal::Neutral => {}
        }
    }

    t
}

fn vote(t: &mut VoteTally, side: Signal, weight: u32, reason: String) {
    match side {
        Signal::Buy => t.buy += weight,
        Signal::Sell => t.sell += weight,
        Signal::Neutral => {}
    }
    t.reasons.push(reason);
}
