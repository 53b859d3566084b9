//! Support/resistance key levels.
//!
//! Blends swing points, the volume profile, consolidation zones,
//! multi-touch levels and pivot ladders, then clusters everything within
//! an ATR-scaled tolerance and keeps the five levels nearest price on
//! each side.

pub mod pivots;
pub mod swings;

pub use pivots::{pivot_points, CamarillaLadder, PivotLadder, PivotSet};
pub use swings::{swing_highs, swing_lows, SwingPoint};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::Candle;
use crate::indicators::{atr, volume_profile, VolumeProfile};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationZone {
    pub price: f64,
    /// Volume concentration relative to the average bucket, capped at 3.
    pub strength: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyLevels {
    /// Below price, nearest first, at most 5.
    pub supports: Vec<f64>,
    /// Above price, nearest first, at most 5.
    pub resistances: Vec<f64>,
    pub psychological: Vec<f64>,
    pub pivots: PivotSet,
    pub consolidation_zones: Vec<ConsolidationZone>,
    pub profile: VolumeProfile,
    /// Clustering tolerance used: max(0.5 * ATR, 0.1% of price).
    pub tolerance: f64,
}

const MIN_CANDLES: usize = 50;

pub fn identify_key_levels(candles: &[Candle], price: f64, atr_period: usize) -> KeyLevels {
    if candles.len() < MIN_CANDLES || price <= 0.0 {
        return KeyLevels::default();
    }

    let atr_value = atr(candles, atr_period);
    let tolerance = (atr_value * 0.5).max(price * 0.001);

    let highs = cluster_swings(swing_highs(candles, tolerance), tolerance);
    let lows = cluster_swings(swing_lows(candles, tolerance), tolerance);

    let recent = &candles[candles.len().saturating_sub(100)..];
    let consolidation_zones = consolidation(recent, tolerance);
    let profile = volume_profile(recent);
    let touches = multi_touch_levels(recent, tolerance);
    let pivots = pivot_points(&candles[candles.len() - 1]);
    let psychological = psychological_levels(price);

    // Candidate supports: swing lows, VAL/POC, touch levels, pivot supports
    let mut supports: Vec<f64> = Vec::new();
    for &low in &lows {
        if low < price && low > price * 0.9 {
            supports.push(low);
        }
    }
    for v in [profile.val, profile.poc] {
        if v > 0.0 && v < price {
            supports.push(v);
        }
    }
    for &t in &touches {
        if t < price && t > price * 0.9 {
            supports.push(t);
        }
    }
    for s in [
        pivots.classic.s1,
        pivots.classic.s2,
        pivots.fibonacci.s1,
        pivots.fibonacci.s2,
        pivots.camarilla.s1,
        pivots.camarilla.s2,
    ] {
        if s > 0.0 && s < price {
            supports.push(s);
        }
    }

    // Candidate resistances: mirror of the above
    let mut resistances: Vec<f64> = Vec::new();
    for &high in &highs {
        if high > price && high < price * 1.1 {
            resistances.push(high);
        }
    }
    for v in [profile.vah, profile.poc] {
        if v > 0.0 && v > price {
            resistances.push(v);
        }
    }
    for &t in &touches {
        if t > price && t < price * 1.1 {
            resistances.push(t);
        }
    }
    for r in [
        pivots.classic.r1,
        pivots.classic.r2,
        pivots.fibonacci.r1,
        pivots.fibonacci.r2,
        pivots.camarilla.r1,
        pivots.camarilla.r2,
    ] {
        if r > price {
            resistances.push(r);
        }
    }

    KeyLevels {
        supports: cluster_and_rank(supports, price, tolerance),
        resistances: cluster_and_rank(resistances, price, tolerance),
        psychological,
        pivots,
        consolidation_zones,
        profile,
        tolerance,
    }
}

/// Merge swing points within tolerance, keeping the strongest of each
/// cluster.
fn cluster_swings(mut points: Vec<SwingPoint>, tolerance: f64) -> Vec<f64> {
    if points.is_empty() {
        return Vec::new();
    }
    points.sort_by(|a, b| a.price.partial_cmp(&b.price).unwrap_or(std::cmp::Ordering::Equal));

    let mut out = Vec::new();
    let mut cluster: Vec<SwingPoint> = vec![points[0]];
    for p in points.into_iter().skip(1) {
        if (p.price - cluster[0].price).abs() <= tolerance {
            cluster.push(p);
        } else {
            out.push(strongest(&cluster));
            cluster = vec![p];
        }
    }
    out.push(strongest(&cluster));
    out
}

fn strongest(cluster: &[SwingPoint]) -> f64 {
    cluster
        .iter()
        .max_by(|a, b| a.strength.partial_cmp(&b.strength).unwrap_or(std::cmp::Ordering::Equal))
        .map(|p| p.price)
        .unwrap_or(0.0)
}

/// Volume-bucketed consolidation zones, strongest 5.
fn consolidation(candles: &[Candle], bucket_size: f64) -> Vec<ConsolidationZone> {
    if bucket_size <= 0.0 {
        return Vec::new();
    }

    let mut buckets: HashMap<i64, f64> = HashMap::new();
    for c in candles {
        for price in [c.high, c.low, c.close] {
            let key = (price / bucket_size).round() as i64;
            *buckets.entry(key).or_insert(0.0) += c.volume;
        }
    }
    if buckets.is_empty() {
        return Vec::new();
    }

    let avg = buckets.values().sum::<f64>() / buckets.len() as f64;
    if avg <= 0.0 {
        return Vec::new();
    }

    let mut zones: Vec<ConsolidationZone> = buckets
        .into_iter()
        .filter(|(_, vol)| *vol > avg * 1.5)
        .map(|(key, vol)| ConsolidationZone {
            price: key as f64 * bucket_size,
            strength: (vol / avg).min(3.0),
        })
        .collect();
    zones.sort_by(|a, b| b.strength.partial_cmp(&a.strength).unwrap_or(std::cmp::Ordering::Equal));
    zones.truncate(5);
    zones
}

/// Prices whose rounded highs/lows were touched at least 3 times.
fn multi_touch_levels(candles: &[Candle], tolerance: f64) -> Vec<f64> {
    if tolerance <= 0.0 {
        return Vec::new();
    }
    let mut touches: HashMap<i64, u32> = HashMap::new();
    for c in candles {
        for price in [c.high, c.low] {
            let key = (price / tolerance).round() as i64;
            *touches.entry(key).or_insert(0) += 1;
        }
    }
    touches
        .into_iter()
        .filter(|(_, n)| *n >= 3)
        .map(|(key, _)| key as f64 * tolerance)
        .collect()
}

/// Round levels near the current price, scaled to its magnitude.
fn psychological_levels(price: f64) -> Vec<f64> {
    let round_base = if price >= 1000.0 {
        100.0
    } else if price >= 100.0 {
        10.0
    } else if price >= 10.0 {
        1.0
    } else {
        0.1
    };

    let rounded = (price / round_base).round() * round_base;
    let mut levels = Vec::new();
    for i in -3i32..=3 {
        let level = rounded + i as f64 * round_base;
        if level > 0.0 && (level - price).abs() <= price * 0.1 {
            levels.push(level);
        }
    }
    levels.truncate(3);
    levels
}

/// Final merge within tolerance (averaging neighbours), then sort by
/// distance to price and keep the top 5.
fn cluster_and_rank(mut levels: Vec<f64>, price: f64, tolerance: f64) -> Vec<f64> {
    if levels.is_empty() {
        return Vec::new();
    }
    levels.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut clustered = Vec::new();
    let mut current = levels[0];
    for &level in &levels[1..] {
        if (level - current).abs() <= tolerance {
            current = (current + level) / 2.0;
        } else {
            clustered.push(current);
            current = level;
        }
    }
    clustered.push(current);

    clustered.sort_by(|a, b| {
        (a - price)
            .abs()
            .partial_cmp(&(b - price).abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    clustered.truncate(5);
    clustered
}
