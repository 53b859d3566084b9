//! Exchange wire formats, normalized at the boundary.
//!
//! Hyperliquid sends OHLCV fields as decimal strings with millisecond
//! timestamps, and book levels in three shapes depending on the endpoint:
//! `{px, sz}` objects, `{price, size}` objects, or `[price, size]` pairs.
//! Everything is converted to the canonical domain types here; nothing
//! past this module sees a wire shape. Unparseable levels are dropped
//! rather than failing the whole snapshot.

use serde::Deserialize;

use crate::domain::{Candle, OrderBookSnapshot, PriceLevel};

/// A number that may arrive as a JSON number or a decimal string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireNum {
    Num(f64),
    Text(String),
}

impl WireNum {
    pub fn value(&self) -> Option<f64> {
        match self {
            WireNum::Num(v) => Some(*v),
            WireNum::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireCandle {
    /// Hyperliquid: millisecond `t`, string-encoded OHLCV.
    Exchange {
        t: i64,
        o: WireNum,
        h: WireNum,
        l: WireNum,
        c: WireNum,
        #[serde(default)]
        v: Option<WireNum>,
    },
    /// Already-canonical shape, as written by our own recorders.
    Canonical(Candle),
}

impl WireCandle {
    pub fn normalize(&self) -> Option<Candle> {
        match self {
            WireCandle::Exchange { t, o, h, l, c, v } => Some(Candle {
                time: t / 1000,
                open: o.value()?,
                high: h.value()?,
                low: l.value()?,
                close: c.value()?,
                volume: v.as_ref().and_then(WireNum::value).unwrap_or(0.0),
            }),
            WireCandle::Canonical(candle) => Some(*candle),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireLevel {
    Keyed { px: WireNum, sz: WireNum },
    Named { price: WireNum, size: WireNum },
    Pair(WireNum, WireNum),
}

impl WireLevel {
    pub fn normalize(&self) -> Option<PriceLevel> {
        let (price, size) = match self {
            WireLevel::Keyed { px, sz } => (px.value()?, sz.value()?),
            WireLevel::Named { price, size } => (price.value()?, size.value()?),
            WireLevel::Pair(price, size) => (price.value()?, size.value()?),
        };
        if price > 0.0 && size >= 0.0 {
            Some(PriceLevel { price, size })
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireBook {
    /// Hyperliquid l2Book: `levels: [bids, asks]`.
    Levels { levels: Vec<Vec<WireLevel>> },
    Split {
        bids: Vec<WireLevel>,
        asks: Vec<WireLevel>,
    },
}

impl WireBook {
    pub fn normalize(&self) -> OrderBookSnapshot {
        let (bids, asks) = match self {
            WireBook::Levels { levels } => {
                let bids = levels.first().map(Vec::as_slice).unwrap_or(&[]);
                let asks = levels.get(1).map(Vec::as_slice).unwrap_or(&[]);
                (bids, asks)
            }
            WireBook::Split { bids, asks } => (bids.as_slice(), asks.as_slice()),
        };
        OrderBookSnapshot {
            bids: bids.iter().filter_map(WireLevel::normalize).collect(),
            asks: asks.iter().filter_map(WireLevel::normalize).collect(),
        }
    }
}

/// Parse a JSON array of candles, dropping any malformed entry.
pub fn parse_candles(raw: &str) -> Result<Vec<Candle>, serde_json::Error> {
    let wire: Vec<WireCandle> = serde_json::from_str(raw)?;
    Ok(wire.iter().filter_map(WireCandle::normalize).collect())
}

pub fn parse_book(raw: &str) -> Result<OrderBookSnapshot, serde_json::Error> {
    let wire: WireBook = serde_json::from_str(raw)?;
    Ok(wire.normalize())
}
