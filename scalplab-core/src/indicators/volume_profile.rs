//! Volume profile: point of control and value area.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::Candle;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeProfile {
    /// Price with the most traded volume.
    pub poc: f64,
    /// Value area high (70% of volume).
    pub vah: f64,
    /// Value area low.
    pub val: f64,
}

/// Profile over the last 50 candles, bucketing volume at whole-number
/// closes. Fewer than 20 candles reads all zeros.
pub fn volume_profile(candles: &[Candle]) -> VolumeProfile {
    if candles.len() < 20 {
        return VolumeProfile::default();
    }

    let recent = &candles[candles.len().saturating_sub(50)..];
    let mut buckets: HashMap<i64, f64> = HashMap::new();
    for c in recent {
        *buckets.entry(c.close.round() as i64).or_insert(0.0) += c.volume;
    }

    let mut sorted: Vec<(i64, f64)> = buckets.into_iter().collect();
    // volume descending, price as tie-break for determinism
    sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0)));

    let poc = sorted[0].0 as f64;
    let total: f64 = sorted.iter().map(|(_, v)| v).sum();
    let value_area = total * 0.7;

    let mut cum = 0.0;
    let mut cut = 0;
    for (i, (_, vol)) in sorted.iter().enumerate() {
        cum += vol;
        if cum >= value_area {
            cut = i;
            break;
        }
    }

    let area: Vec<f64> = sorted[..=cut].iter().map(|(p, _)| *p as f64).collect();
    let vah = area.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let val = area.iter().copied().fold(f64::INFINITY, f64::min);

    VolumeProfile { poc, vah, val }
}
