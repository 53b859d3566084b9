//! Swing high/low detection with touch-count strength.

use crate::domain::Candle;

/// A swing point: price, bar index and a [0, 1] strength blending touch
/// count with relative volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingPoint {
    pub price: f64,
    pub index: usize,
    pub strength: f64,
}

const SWING_PERIOD: usize = 3;

/// Swing highs: a bar high strictly above the `SWING_PERIOD` bars on each
/// side. Nearby highs within `tolerance` count as touches and raise the
/// strength, as does above-average local volume.
pub fn swing_highs(candles: &[Candle], tolerance: f64) -> Vec<SwingPoint> {
    swings(candles, tolerance, true)
}

pub fn swing_lows(candles: &[Candle], tolerance: f64) -> Vec<SwingPoint> {
    swings(candles, tolerance, false)
}

fn swings(candles: &[Candle], tolerance: f64, highs: bool) -> Vec<SwingPoint> {
    let n = candles.len();
    if n <= SWING_PERIOD * 2 {
        return Vec::new();
    }

    let extreme = |c: &Candle| if highs { c.high } else { c.low };
    let mut out = Vec::new();

    for i in SWING_PERIOD..n - SWING_PERIOD {
        let level = extreme(&candles[i]);
        let mut is_swing = true;
        let mut touches = 1u32;

        for j in i - SWING_PERIOD..i {
            let other = extreme(&candles[j]);
            let beats = if highs { other >= level } else { other <= level };
            if beats {
                is_swing = false;
                break;
            }
            if (other - level).abs() <= tolerance {
                touches += 1;
            }
        }
        if is_swing {
            for j in i + 1..(i + SWING_PERIOD + 1).min(n) {
                let other = extreme(&candles[j]);
                let beats = if highs { other >= level } else { other <= level };
                if beats {
                    is_swing = false;
                    break;
                }
                if (other - level).abs() <= tolerance {
                    touches += 1;
                }
            }
        }

        if is_swing {
            let lo = i.saturating_sub(10);
            let hi = (i + 10).min(n);
            let local_max_volume = candles[lo..hi]
                .iter()
                .map(|c| c.volume)
                .fold(1.0f64, f64::max);
            let volume_strength = candles[i].volume / local_max_volume;
            let strength = (touches as f64 * 0.3 + volume_strength * 0.7).min(1.0);
            out.push(SwingPoint {
                price: level,
                index: i,
                strength,
            });
        }
    }

    out
}
