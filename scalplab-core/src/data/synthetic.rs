//! Seeded random-walk feed for tests and demos.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::MarketDataFeed;
use crate::domain::{Candle, OrderBookSnapshot, PriceLevel};

/// Deterministic synthetic market: same seed and coin, same history.
#[derive(Debug, Clone)]
pub struct SyntheticFeed {
    seed: u64,
    base_price: f64,
    /// Per-bar return stddev as a fraction, e.g. 0.004.
    volatility: f64,
}

impl SyntheticFeed {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            base_price: 100.0,
            volatility: 0.004,
        }
    }

    pub fn with_market(seed: u64, base_price: f64, volatility: f64) -> Self {
        Self {
            seed,
            base_price,
            volatility,
        }
    }

    fn rng_for(&self, coin: &str) -> StdRng {
        // Fold the coin into the seed so each coin walks its own path.
        let mut seed = self.seed;
        for b in coin.bytes() {
            seed = seed.wrapping_mul(31).wrapping_add(b as u64);
        }
        StdRng::seed_from_u64(seed)
    }

    fn interval_seconds(interval: &str) -> i64 {
        match interval {
            "1m" => 60,
            "5m" => 300,
            "15m" => 900,
            "1h" => 3_600,
            _ => 60,
        }
    }
}

impl MarketDataFeed for SyntheticFeed {
    fn fetch_candles(&self, coin: &str, interval: &str, limit: usize) -> Vec<Candle> {
        let mut rng = self.rng_for(coin);
        let step = Self::interval_seconds(interval);
        let mut price = self.base_price;
        let mut candles = Vec::with_capacity(limit);
        for i in 0..limit {
            let drift: f64 = rng.gen_range(-1.0..1.0) * self.volatility;
            let open = price;
            let close = open * (1.0 + drift);
            let wick = open.max(close) * rng.gen_range(0.0..self.volatility / 2.0);
            let volume = rng.gen_range(500.0..2_000.0);
            candles.push(Candle {
                time: i as i64 * step,
                open,
                high: open.max(close) + wick,
                low: (open.min(close) - wick).max(f64::MIN_POSITIVE),
                close,
                volume,
            });
            price = close;
        }
        candles
    }

    fn fetch_order_book(&self, coin: &str) -> OrderBookSnapshot {
        let mut rng = self.rng_for(coin);
        let mid = self.base_price;
        let tick = mid * 0.0001;
        let mut bids = Vec::with_capacity(20);
        let mut asks = Vec::with_capacity(20);
        for i in 0..20 {
            bids.push(PriceLevel {
                price: mid - tick * (i + 1) as f64,
                size: rng.gen_range(1.0..50.0),
            });
            asks.push(PriceLevel {
                price: mid + tick * (i + 1) as f64,
                size: rng.gen_range(1.0..50.0),
            });
        }
        OrderBookSnapshot { bids, asks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_a_seed() {
        let feed = SyntheticFeed::new(7);
        let a = feed.fetch_candles("BTC", "1m", 50);
        let b = feed.fetch_candles("BTC", "1m", 50);
        assert_eq!(a, b);
    }

    #[test]
    fn coins_walk_different_paths() {
        let feed = SyntheticFeed::new(7);
        let btc = feed.fetch_candles("BTC", "1m", 50);
        let eth = feed.fetch_candles("ETH", "1m", 50);
        assert_ne!(btc, eth);
    }

    #[test]
    fn candles_are_sane() {
        let feed = SyntheticFeed::new(42);
        for candle in feed.fetch_candles("BTC", "5m", 200) {
            assert!(candle.is_sane(), "bad candle: {candle:?}");
        }
        let c = feed.fetch_candles("BTC", "5m", 3);
        assert_eq!(c[1].time - c[0].time, 300);
    }

    #[test]
    fn book_straddles_the_mid() {
        let feed = SyntheticFeed::new(42);
        let book = feed.fetch_order_book("BTC");
        assert_eq!(book.bids.len(), 20);
        let best_bid = book.best_bid().unwrap();
        let best_ask = book.best_ask().unwrap();
        assert!(best_bid < best_ask);
    }
}
