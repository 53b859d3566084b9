//! Pivot points computed off the last candle.

use serde::{Deserialize, Serialize};

use crate::domain::Candle;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PivotLadder {
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
    pub s1: f64,
    pub s2: f64,
    pub s3: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CamarillaLadder {
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
    pub r4: f64,
    pub s1: f64,
    pub s2: f64,
    pub s3: f64,
    pub s4: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PivotSet {
    pub pivot: f64,
    pub classic: PivotLadder,
    pub fibonacci: PivotLadder,
    pub camarilla: CamarillaLadder,
}

/// Classic, Fibonacci and Camarilla pivots from a single bar.
pub fn pivot_points(last: &Candle) -> PivotSet {
    let high = last.high;
    let low = last.low;
    let close = last.close;

    let pivot = (high + low + close) / 3.0;
    let range = high - low;

    let classic = PivotLadder {
        r1: 2.0 * pivot - low,
        r2: pivot + range,
        r3: high + 2.0 * (pivot - low),
        s1: 2.0 * pivot - high,
        s2: pivot - range,
        s3: low - 2.0 * (high - pivot),
    };

    let fibonacci = PivotLadder {
        r1: pivot + 0.382 * range,
        r2: pivot + 0.618 * range,
        r3: pivot + range,
        s1: pivot - 0.382 * range,
        s2: pivot - 0.618 * range,
        s3: pivot - range,
    };

    let camarilla = CamarillaLadder {
        r1: close + range * 1.1 / 12.0,
        r2: close + range * 1.1 / 6.0,
        r3: close + range * 1.1 / 4.0,
        r4: close + range * 1.1 / 2.0,
        s1: close - range * 1.1 / 12.0,
        s2: close - range * 1.1 / 6.0,
        s3: close - range * 1.1 / 4.0,
        s4: close - range * 1.1 / 2.0,
    };

    PivotSet {
        pivot,
        classic,
        fibonacci,
        camarilla,
    }
}
