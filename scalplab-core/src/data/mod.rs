//! Market data boundary.
//!
//! `MarketDataFeed` is the seam between the analysis core and wherever
//! candles actually come from. Failures stay on this side of the seam:
//! a feed returns empty data, never an error, so the core always sees
//! the same shapes.

pub mod synthetic;
pub mod wire;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use crate::domain::{Candle, OrderBookSnapshot};

pub use synthetic::SyntheticFeed;
pub use wire::{parse_book, parse_candles};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed io: {0}")]
    Io(#[from] std::io::Error),
    #[error("feed decode: {0}")]
    Decode(#[from] serde_json::Error),
}

pub trait MarketDataFeed {
    /// Most recent `limit` candles, oldest first. Empty on any failure.
    fn fetch_candles(&self, coin: &str, interval: &str, limit: usize) -> Vec<Candle>;

    /// Current depth snapshot. Empty on any failure.
    fn fetch_order_book(&self, coin: &str) -> OrderBookSnapshot;
}

/// Load a candle file directly, for CLI paths given explicitly.
pub fn load_candles(path: impl AsRef<Path>) -> Result<Vec<Candle>, FeedError> {
    let raw = fs::read_to_string(path)?;
    Ok(parse_candles(&raw)?)
}

pub fn load_book(path: impl AsRef<Path>) -> Result<OrderBookSnapshot, FeedError> {
    let raw = fs::read_to_string(path)?;
    Ok(parse_book(&raw)?)
}

/// Recorded history on disk: `<dir>/<COIN>_<interval>.json` for candles
/// and `<dir>/<COIN>_book.json` for depth.
#[derive(Debug, Clone)]
pub struct JsonFileFeed {
    dir: PathBuf,
}

impl JsonFileFeed {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn read(&self, name: &str) -> Option<String> {
        let path = self.dir.join(name);
        match fs::read_to_string(&path) {
            Ok(raw) => Some(raw),
            Err(err) => {
                warn!(path = %path.display(), %err, "feed file unreadable");
                None
            }
        }
    }
}

impl MarketDataFeed for JsonFileFeed {
    fn fetch_candles(&self, coin: &str, interval: &str, limit: usize) -> Vec<Candle> {
        let Some(raw) = self.read(&format!("{coin}_{interval}.json")) else {
            return Vec::new();
        };
        match parse_candles(&raw) {
            Ok(mut candles) => {
                if candles.len() > limit {
                    candles.drain(..candles.len() - limit);
                }
                candles
            }
            Err(err) => {
                warn!(coin, %err, "candle file malformed");
                Vec::new()
            }
        }
    }

    fn fetch_order_book(&self, coin: &str) -> OrderBookSnapshot {
        let Some(raw) = self.read(&format!("{coin}_book.json")) else {
            return OrderBookSnapshot::empty();
        };
        match parse_book(&raw) {
            Ok(book) => book,
            Err(err) => {
                warn!(coin, %err, "book file malformed");
                OrderBookSnapshot::empty()
            }
        }
    }
}
