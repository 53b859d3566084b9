//! Two-stage entry gate.
//!
//! Stage one is a set of hard numeric filters; stage two is a
//! cross-validation quorum over six directional context checks.
//! Rejections are structured data, not errors: the backtester counts them
//! by variant for rejection-frequency analytics.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::EntryConfig;
use crate::domain::Signal;
use crate::indicators::{Macd, Stochastic};

/// Why a signal was not taken. `key()` is the stable analytics bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryRejection {
    Quality { score: f64, threshold: f64 },
    Volume { ratio: f64, min: f64 },
    Spread { percent: f64, max: f64 },
    Volatility { atr_percent: f64, min: f64, max: f64 },
    PositionOpen,
    Capital,
    Context { passed: usize, required: usize },
}

impl EntryRejection {
    pub fn key(&self) -> &'static str {
        match self {
            EntryRejection::Quality { .. } => "quality",
            EntryRejection::Volume { .. } => "volume",
            EntryRejection::Spread { .. } => "spread",
            EntryRejection::Volatility { .. } => "volatility",
            EntryRejection::PositionOpen => "position_open",
            EntryRejection::Capital => "capital",
            EntryRejection::Context { .. } => "context",
        }
    }
}

impl fmt::Display for EntryRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryRejection::Quality { score, threshold } => {
                write!(f, "quality {score:.1} below threshold {threshold:.1}")
            }
            EntryRejection::Volume { ratio, min } => {
                write!(f, "volume ratio {ratio:.2} below minimum {min:.2}")
            }
            EntryRejection::Spread { percent, max } => {
                write!(f, "spread {percent:.4}% above {max:.4}%")
            }
            EntryRejection::Volatility { atr_percent, min, max } => {
                write!(f, "ATR {atr_percent:.3}% outside [{min:.2}%, {max:.2}%]")
            }
            EntryRejection::PositionOpen => f.write_str("position already open"),
            EntryRejection::Capital => f.write_str("insufficient capital"),
            EntryRejection::Context { passed, required } => {
                write!(f, "context checks {passed}/6, need {required}")
            }
        }
    }
}

/// The six context checks, recorded for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContextChecks {
    pub rsi_ok: bool,
    pub trend_ok: bool,
    pub macd_ok: bool,
    pub stochastic_ok: bool,
    pub williams_ok: bool,
    pub volume_ok: bool,
}

impl ContextChecks {
    pub fn passed(&self) -> usize {
        [
            self.rsi_ok,
            self.trend_ok,
            self.macd_ok,
            self.stochastic_ok,
            self.williams_ok,
            self.volume_ok,
        ]
        .iter()
        .filter(|&&b| b)
        .count()
    }
}

/// Directional cross-validation: a BUY must not already look overbought,
/// must have trend backing, and so on; SELL mirrors every check.
pub fn validate_context(
    signal: Signal,
    rsi: f64,
    ema_short: f64,
    ema_long: f64,
    price: f64,
    macd: &Macd,
    stochastic: &Stochastic,
    williams_r: f64,
    volume_ratio: f64,
) -> ContextChecks {
    match signal {
        Signal::Buy | Signal::Neutral => ContextChecks {
            rsi_ok: rsi < 55.0,
            trend_ok: price > ema_long || ema_short > ema_long,
            macd_ok: macd.histogram > -0.5,
            stochastic_ok: stochastic.k < 75.0,
            williams_ok: williams_r > -30.0,
            volume_ok: volume_ratio >= 2.0,
        },
        Signal::Sell => ContextChecks {
            rsi_ok: rsi > 45.0,
            trend_ok: price < ema_long || ema_short < ema_long,
            macd_ok: macd.histogram < 0.5,
            stochastic_ok: stochastic.k > 25.0,
            williams_ok: williams_r < -70.0,
            volume_ok: volume_ratio >= 2.0,
        },
    }
}

pub struct EntryInputs<'a> {
    pub signal: Signal,
    pub quality: f64,
    pub volume_ratio: f64,
    /// Percent of mid.
    pub spread_percent: f64,
    /// ATR as a fraction of price.
    pub atr_fraction: f64,
    pub position_open: bool,
    pub capital_available: bool,
    pub rsi: f64,
    pub ema_short: f64,
    pub ema_long: f64,
    pub price: f64,
    pub macd: &'a Macd,
    pub stochastic: &'a Stochastic,
    pub williams_r: f64,
}

/// Run both stages; `Ok(())` means take the trade.
pub fn evaluate_entry(inputs: &EntryInputs<'_>, cfg: &EntryConfig) -> Result<(), EntryRejection> {
    if inputs.quality < cfg.quality_threshold {
        return Err(EntryRejection::Quality {
            score: inputs.quality,
            threshold: cfg.quality_threshold,
        });
    }
    if inputs.volume_ratio < cfg.min_volume_ratio {
        return Err(EntryRejection::Volume {
            ratio: inputs.volume_ratio,
            min: cfg.min_volume_ratio,
        });
    }
    if inputs.spread_percent > cfg.max_spread_percent {
        return Err(EntryRejection::Spread {
            percent: inputs.spread_percent,
            max: cfg.max_spread_percent,
        });
    }
    let atr_percent = inputs.atr_fraction * 100.0;
    if atr_percent < cfg.min_atr_percent || atr_percent > cfg.max_atr_percent {
        return Err(EntryRejection::Volatility {
            atr_percent,
            min: cfg.min_atr_percent,
            max: cfg.max_atr_percent,
        });
    }
    if inputs.position_open {
        return Err(EntryRejection::PositionOpen);
    }
    if !inputs.capital_available {
        return Err(EntryRejection::Capital);
    }

    let checks = validate_context(
        inputs.signal,
        inputs.rsi,
        inputs.ema_short,
        inputs.ema_long,
        inputs.price,
        inputs.macd,
        inputs.stochastic,
        inputs.williams_r,
        inputs.volume_ratio,
    );
    let passed = checks.passed();
    if passed < cfg.context_min_checks {
        return Err(EntryRejection::Context {
            passed,
            required: cfg.context_min_checks,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn good_long<'a>(macd: &'a Macd, stoch: &'a Stochastic) -> EntryInputs<'a> {
        EntryInputs {
            signal: Signal::Buy,
            quality: 85.0,
            volume_ratio: 2.8,
            spread_percent: 0.02,
            atr_fraction: 0.008,
            position_open: false,
            capital_available: true,
            rsi: 42.0,
            ema_short: 100.5,
            ema_long: 100.0,
            price: 101.0,
            macd,
            stochastic: stoch,
            williams_r: -25.0,
        }
    }

    fn macd_up() -> Macd {
        Macd {
            value: 0.5,
            signal: 0.2,
            histogram: 0.3,
        }
    }

    fn stoch_mid() -> Stochastic {
        Stochastic { k: 40.0, d: 45.0 }
    }

    #[test]
    fn clean_setup_passes() {
        let macd = macd_up();
        let stoch = stoch_mid();
        assert!(evaluate_entry(&good_long(&macd, &stoch), &EntryConfig::default()).is_ok());
    }

    #[test]
    fn low_quality_rejected_first() {
        let macd = macd_up();
        let stoch = stoch_mid();
        let mut i = good_long(&macd, &stoch);
        i.quality = 70.0;
        let err = evaluate_entry(&i, &EntryConfig::default()).unwrap_err();
        assert_eq!(err.key(), "quality");
    }

    #[test]
    fn atr_outside_band_rejected() {
        let macd = macd_up();
        let stoch = stoch_mid();
        let mut i = good_long(&macd, &stoch);
        i.atr_fraction = 0.02; // 2%, above the 1.2% cap
        let err = evaluate_entry(&i, &EntryConfig::default()).unwrap_err();
        assert_eq!(err.key(), "volatility");
    }

    #[test]
    fn open_position_blocks_entry() {
        let macd = macd_up();
        let stoch = stoch_mid();
        let mut i = good_long(&macd, &stoch);
        i.position_open = true;
        let err = evaluate_entry(&i, &EntryConfig::default()).unwrap_err();
        assert_eq!(err, EntryRejection::PositionOpen);
    }

    #[test]
    fn two_failed_context_checks_reject_at_default_quorum() {
        let macd = macd_up();
        let stoch = stoch_mid();
        let mut i = good_long(&macd, &stoch);
        i.rsi = 60.0; // rsi_ok fails
        i.williams_r = -40.0; // williams_ok fails
        let err = evaluate_entry(&i, &EntryConfig::default()).unwrap_err();
        assert_eq!(err, EntryRejection::Context { passed: 4, required: 5 });
    }

    #[test]
    fn relaxed_quorum_lets_the_same_setup_through() {
        let macd = macd_up();
        let stoch = stoch_mid();
        let mut i = good_long(&macd, &stoch);
        i.rsi = 60.0;
        i.williams_r = -40.0;
        let cfg = EntryConfig {
            context_min_checks: 4,
            ..EntryConfig::default()
        };
        assert!(evaluate_entry(&i, &cfg).is_ok());
    }

    #[test]
    fn sell_context_mirrors_buy() {
        let macd = Macd {
            value: -0.5,
            signal: -0.2,
            histogram: -0.3,
        };
        let stoch = Stochastic { k: 60.0, d: 55.0 };
        let checks = validate_context(
            Signal::Sell,
            58.0,
            99.5,
            100.0,
            99.0,
            &macd,
            &stoch,
            -75.0,
            2.5,
        );
        assert_eq!(checks.passed(), 6);
    }
}
