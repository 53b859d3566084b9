//! Signal generation.
//!
//! `SignalEngine::analyze` is the single entry point: it runs the whole
//! indicator battery over a candle window plus an optional order book and
//! produces an immutable `SignalAnalysis` snapshot. Sub-modules hold the
//! vote rules, the quality score, SL/TP geometry and the entry gate.

pub mod engine;
pub mod entry;
pub mod quality;
pub mod sl_tp;
pub mod votes;

pub use engine::{SignalEngine, MIN_CANDLES};
pub use entry::{evaluate_entry, validate_context, ContextChecks, EntryInputs, EntryRejection};
pub use quality::{signal_quality, QualityInputs};
pub use sl_tp::{compute_sl_tp, SlTp};
pub use votes::{cast_votes, VoteInputs, VoteTally};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::book::BookAnalysis;
use crate::indicators::{Bollinger, Macd, Momentum, Stochastic, VolatilityRegime, VolumeProfile};
use crate::levels::KeyLevels;
use crate::domain::{Confidence, Signal};

#[derive(Debug, Error)]
pub enum SignalError {
    /// Below the engine's minimum history; an explicit error rather than
    /// a degraded NEUTRAL so callers never mistake it for a real read.
    #[error("insufficient history: {have} candles, need {need}")]
    InsufficientData { have: usize, need: usize },
}

/// All scalar indicator readings that fed the vote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorReadings {
    pub rsi: f64,
    pub macd: Macd,
    pub ema_short: f64,
    pub ema_long: f64,
    pub bollinger: Bollinger,
    pub atr: f64,
    pub stochastic: Stochastic,
    pub williams_r: f64,
    pub cci: f64,
    pub vwap: f64,
    pub momentum: Momentum,
    pub volatility: VolatilityRegime,
    pub volume_profile: VolumeProfile,
}

/// One complete, immutable analysis of a market moment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalAnalysis {
    pub coin: String,
    pub time: i64,
    pub price: f64,
    pub signal: Signal,
    /// Winning vote count normalized to [0, 1].
    pub strength: f64,
    pub confidence: Confidence,
    /// Quality score in [0, 100].
    pub quality: f64,
    pub buy_votes: u32,
    pub sell_votes: u32,
    pub reasons: Vec<String>,
    pub indicators: IndicatorReadings,
    pub book: BookAnalysis,
    pub levels: KeyLevels,
    /// Present for actionable signals only.
    pub sl_tp: Option<SlTp>,
    pub volume_ratio: f64,
}
