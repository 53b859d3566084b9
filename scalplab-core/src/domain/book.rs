//! Canonical order-book types.
//!
//! `PriceLevel` is the one shape the rest of the crate sees. Wire feeds
//! deliver levels as `{px, sz}` objects, `{price, size}` objects or
//! `[price, size]` pairs; all of that tolerance lives in `data::wire`,
//! which normalizes into these types at the boundary.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: f64,
    pub size: f64,
}

impl PriceLevel {
    pub fn notional(&self) -> f64 {
        self.price * self.size
    }
}

/// Bids and asks ordered best-to-worst (bids descending, asks ascending).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

impl OrderBookSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() || self.asks.is_empty()
    }

    pub fn best_bid(&self) -> Option<f64> {
        self.bids.first().map(|l| l.price)
    }

    pub fn best_ask(&self) -> Option<f64> {
        self.asks.first().map(|l| l.price)
    }

    /// Mid price when both sides are present and uncrossed.
    pub fn mid(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(b), Some(a)) if a > b => Some((a + b) / 2.0),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(price: f64, size: f64) -> PriceLevel {
        PriceLevel { price, size }
    }

    #[test]
    fn empty_book_has_no_mid() {
        assert!(OrderBookSnapshot::empty().mid().is_none());
    }

    #[test]
    fn crossed_book_has_no_mid() {
        let book = OrderBookSnapshot {
            bids: vec![level(101.0, 1.0)],
            asks: vec![level(100.0, 1.0)],
        };
        assert!(book.mid().is_none());
    }

    #[test]
    fn mid_of_valid_book() {
        let book = OrderBookSnapshot {
            bids: vec![level(99.0, 2.0)],
            asks: vec![level(101.0, 1.0)],
        };
        assert_eq!(book.mid(), Some(100.0));
    }
}
