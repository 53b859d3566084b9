//! Order-book microstructure analysis.
//!
//! Works over the canonical `OrderBookSnapshot`; a missing or degenerate
//! book yields `BookAnalysis::neutral()` so the signal engine degrades to
//! candle-only analysis instead of failing.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::config::BookConfig;
use crate::domain::{OrderBookSnapshot, PriceLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallSide {
    Support,
    Resistance,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub price: f64,
    pub size: f64,
    pub side: WallSide,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidityZone {
    pub price: f64,
    pub liquidity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookAnalysis {
    pub spread_abs: f64,
    /// Spread as a percent of the best bid.
    pub spread_percent: f64,
    /// Depth-weighted bid/ask imbalance over the top levels, percent in
    /// [-100, 100]; positive favors bids.
    pub imbalance: f64,
    pub bid_ask_ratio: f64,
    /// Total volume across the measured levels.
    pub liquidity_depth: f64,
    /// Closest significant wall within range of price, if any.
    pub wall: Option<Wall>,
    /// Top bid walls by size (prices), at most 3.
    pub support_walls: Vec<f64>,
    /// Top ask walls by size (prices), at most 3.
    pub resistance_walls: Vec<f64>,
    pub liquidity_zones: Vec<LiquidityZone>,
    pub iceberg: bool,
    pub best_bid: f64,
    pub best_ask: f64,
}

impl BookAnalysis {
    /// The do-nothing analysis used when no usable book is available.
    pub fn neutral() -> Self {
        BookAnalysis {
            bid_ask_ratio: 1.0,
            ..Default::default()
        }
    }
}

struct WallCandidate {
    price: f64,
    size: f64,
    distance: f64,
}

pub fn analyze_book(book: &OrderBookSnapshot, price: f64, cfg: &BookConfig) -> BookAnalysis {
    if book.is_empty() || price <= 0.0 {
        return BookAnalysis::neutral();
    }

    let best_bid = book.bids[0].price;
    let best_ask = book.asks[0].price;
    let spread_abs = best_ask - best_bid;
    let spread_percent = if best_bid > 0.0 {
        spread_abs / best_bid * 100.0
    } else {
        0.0
    };

    let bid_walls = find_walls(&book.bids, cfg, |level| price - level);
    let ask_walls = find_walls(&book.asks, cfg, |level| level - price);

    let wall = closest_wall(&bid_walls, &ask_walls, price, cfg.wall_max_distance);

    let mut support_walls: Vec<&WallCandidate> = bid_walls.iter().collect();
    support_walls.sort_by(|a, b| b.size.partial_cmp(&a.size).unwrap_or(std::cmp::Ordering::Equal));
    let support_walls: Vec<f64> = support_walls.iter().take(3).map(|w| w.price).collect();

    let mut resistance_walls: Vec<&WallCandidate> = ask_walls.iter().collect();
    resistance_walls
        .sort_by(|a, b| b.size.partial_cmp(&a.size).unwrap_or(std::cmp::Ordering::Equal));
    let resistance_walls: Vec<f64> = resistance_walls.iter().take(3).map(|w| w.price).collect();

    let bid_vol: f64 = top_volume(&book.bids, cfg.imbalance_levels);
    let ask_vol: f64 = top_volume(&book.asks, cfg.imbalance_levels);
    let total = bid_vol + ask_vol;
    let imbalance = if total > 0.0 {
        (bid_vol - ask_vol) / total * 100.0
    } else {
        0.0
    };
    let bid_ask_ratio = if ask_vol > 0.0 { bid_vol / ask_vol } else { 1.0 };

    BookAnalysis {
        spread_abs,
        spread_percent,
        imbalance,
        bid_ask_ratio,
        liquidity_depth: total,
        wall,
        support_walls,
        resistance_walls,
        liquidity_zones: liquidity_zones(book),
        iceberg: cfg.iceberg_detection && iceberg(book),
        best_bid,
        best_ask,
    }
}

fn top_volume(levels: &[PriceLevel], n: usize) -> f64 {
    levels.iter().take(n).map(|l| l.size).sum()
}

/// Walls: a level more than `wall_multiplier` times the average of the 5
/// levels before it (and of non-dust size).
fn find_walls<F>(levels: &[PriceLevel], cfg: &BookConfig, distance: F) -> Vec<WallCandidate>
where
    F: Fn(f64) -> f64,
{
    let mut walls = Vec::new();
    for (i, level) in levels.iter().take(cfg.depth).enumerate() {
        if level.size <= 0.0 || level.price <= 0.0 {
            continue;
        }
        let avg = if i > 0 {
            let prev = &levels[i.saturating_sub(5)..i];
            prev.iter().map(|l| l.size).sum::<f64>() / prev.len() as f64
        } else {
            level.size
        };
        if level.size > avg * cfg.wall_multiplier && level.size > 0.01 {
            walls.push(WallCandidate {
                price: level.price,
                size: level.size,
                distance: distance(level.price),
            });
        }
    }
    walls
}

fn closest_wall(
    bid_walls: &[WallCandidate],
    ask_walls: &[WallCandidate],
    price: f64,
    max_distance: f64,
) -> Option<Wall> {
    let nearest = |walls: &[WallCandidate]| -> Option<(f64, f64, f64)> {
        walls
            .iter()
            .min_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal))
            .map(|w| (w.price, w.size, w.distance))
    };

    let mut best: Option<Wall> = None;
    let mut best_distance = f64::INFINITY;

    if let Some((p, s, d)) = nearest(bid_walls) {
        if d < price * max_distance {
            best = Some(Wall {
                price: p,
                size: s,
                side: WallSide::Support,
            });
            best_distance = d;
        }
    }
    if let Some((p, s, d)) = nearest(ask_walls) {
        if d < price * max_distance && d < best_distance {
            best = Some(Wall {
                price: p,
                size: s,
                side: WallSide::Resistance,
            });
        }
    }
    best
}

/// Coarse price buckets (nearest 10) over the top 15 levels of each side;
/// buckets holding over 1.5x the average size are liquidity zones.
fn liquidity_zones(book: &OrderBookSnapshot) -> Vec<LiquidityZone> {
    let mut clusters: HashMap<i64, f64> = HashMap::new();
    for level in book.bids.iter().take(15).chain(book.asks.iter().take(15)) {
        let bucket = ((level.price / 10.0).round() * 10.0) as i64;
        if bucket > 0 {
            *clusters.entry(bucket).or_insert(0.0) += level.size;
        }
    }
    if clusters.is_empty() {
        return Vec::new();
    }

    let avg = clusters.values().sum::<f64>() / clusters.len() as f64;
    let mut zones: Vec<LiquidityZone> = clusters
        .into_iter()
        .filter(|(_, liq)| *liq > avg * 1.5)
        .map(|(price, liquidity)| LiquidityZone {
            price: price as f64,
            liquidity,
        })
        .collect();
    zones.sort_by(|a, b| b.liquidity.partial_cmp(&a.liquidity).unwrap_or(std::cmp::Ordering::Equal));
    zones
}

/// Iceberg heuristic: 5 consecutive levels whose sizes (rounded to 2dp)
/// take at most 2 distinct values, on either side of the top 20.
fn iceberg(book: &OrderBookSnapshot) -> bool {
    let suspicious = |levels: &[PriceLevel]| -> bool {
        let sizes: Vec<i64> = levels
            .iter()
            .take(20)
            .map(|l| (l.size * 100.0).round() as i64)
            .collect();
        if sizes.len() < 5 {
            return false;
        }
        sizes.windows(5).any(|w| {
            let distinct: HashSet<i64> = w.iter().copied().collect();
            distinct.len() <= 2
        })
    };
    suspicious(&book.bids) || suspicious(&book.asks)
}
