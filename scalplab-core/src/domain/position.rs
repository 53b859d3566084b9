//! Open-position state.
//!
//! A `Position` carries everything the risk manager mutates while a trade
//! is live: the ratcheting stop, the three-level take-profit ladder with
//! fill flags, the max-profit watermark and the trailing / break-even
//! activation latches. Sizes are USD notional.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// +1 for long, -1 for short; used wherever PnL math needs a sign.
    pub fn direction(&self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TpLevel {
    pub price: f64,
    pub filled: bool,
}

impl TpLevel {
    pub fn new(price: f64) -> Self {
        Self {
            price,
            filled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub coin: String,
    pub side: Side,
    pub entry_price: f64,
    /// Remaining USD notional. Partial take-profit fills reduce this.
    pub size: f64,
    /// Original notional at entry, before any partial fills.
    pub initial_size: f64,
    pub stop_loss: f64,
    pub initial_stop_loss: f64,
    pub take_profits: [TpLevel; 3],
    pub entry_time: i64,
    pub signal_quality: f64,
    /// Best unrealized PnL percent seen so far (watermark for trailing).
    pub max_profit: f64,
    pub trailing_active: bool,
    pub break_even_active: bool,
    pub entry_fee: f64,
    pub entry_slippage: f64,
}

impl Position {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        coin: &str,
        side: Side,
        entry_price: f64,
        size: f64,
        stop_loss: f64,
        take_profits: [f64; 3],
        entry_time: i64,
        signal_quality: f64,
        entry_fee: f64,
        entry_slippage: f64,
    ) -> Self {
        Self {
            coin: coin.to_string(),
            side,
            entry_price,
            size,
            initial_size: size,
            stop_loss,
            initial_stop_loss: stop_loss,
            take_profits: take_profits.map(TpLevel::new),
            entry_time,
            signal_quality,
            max_profit: 0.0,
            trailing_active: false,
            break_even_active: false,
            entry_fee,
            entry_slippage,
        }
    }

    /// Unrealized PnL as a signed fraction of entry price.
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.side.direction() * (price - self.entry_price) / self.entry_price
    }

    /// Ratchet the stop toward profit. Returns true if the stop moved.
    /// Longs only raise, shorts only lower; a candidate on the wrong side
    /// of the current stop is ignored, so repeated application with the
    /// same candidate is a no-op.
    pub fn tighten_stop(&mut self, candidate: f64) -> bool {
        let improved = match self.side {
            Side::Long => candidate > self.stop_loss,
            Side::Short => candidate < self.stop_loss,
        };
        if improved {
            self.stop_loss = candidate;
        }
        improved
    }

    /// Whether `price` has pierced the current stop for this side.
    pub fn stop_hit(&self, price: f64) -> bool {
        match self.side {
            Side::Long => price <= self.stop_loss,
            Side::Short => price >= self.stop_loss,
        }
    }

    /// First unfilled ladder level reached by `price`, if any.
    pub fn next_tp_hit(&self, price: f64) -> Option<usize> {
        self.take_profits.iter().position(|tp| {
            !tp.filled
                && match self.side {
                    Side::Long => price >= tp.price,
                    Side::Short => price <= tp.price,
                }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_at(entry: f64, stop: f64) -> Position {
        Position {
            coin: "BTC".into(),
            side: Side::Long,
            entry_price: entry,
            size: 1_000.0,
            initial_size: 1_000.0,
            stop_loss: stop,
            initial_stop_loss: stop,
            take_profits: [
                TpLevel::new(entry * 1.01),
                TpLevel::new(entry * 1.018),
                TpLevel::new(entry * 1.025),
            ],
            entry_time: 0,
            signal_quality: 85.0,
            max_profit: 0.0,
            trailing_active: false,
            break_even_active: false,
            entry_fee: 0.35,
            entry_slippage: 0.2,
        }
    }

    #[test]
    fn long_stop_only_rises() {
        let mut p = long_at(100.0, 99.0);
        assert!(p.tighten_stop(99.5));
        assert!(!p.tighten_stop(99.2));
        assert_eq!(p.stop_loss, 99.5);
    }

    #[test]
    fn short_stop_only_falls() {
        let mut p = long_at(100.0, 101.0);
        p.side = Side::Short;
        assert!(p.tighten_stop(100.5));
        assert!(!p.tighten_stop(100.8));
        assert_eq!(p.stop_loss, 100.5);
    }

    #[test]
    fn tighten_is_idempotent() {
        let mut p = long_at(100.0, 99.0);
        p.tighten_stop(99.6);
        let stop = p.stop_loss;
        assert!(!p.tighten_stop(99.6));
        assert_eq!(p.stop_loss, stop);
    }

    #[test]
    fn unrealized_pnl_signs() {
        let p = long_at(100.0, 99.0);
        assert!(p.unrealized_pnl(101.0) > 0.0);
        let mut s = long_at(100.0, 101.0);
        s.side = Side::Short;
        assert!(s.unrealized_pnl(101.0) < 0.0);
    }

    #[test]
    fn tp_ladder_fills_in_order() {
        let mut p = long_at(100.0, 99.0);
        assert_eq!(p.next_tp_hit(101.0), Some(0));
        p.take_profits[0].filled = true;
        assert_eq!(p.next_tp_hit(101.0), None);
        assert_eq!(p.next_tp_hit(101.9), Some(1));
    }
}
