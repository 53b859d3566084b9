//! The signal engine.

use tracing::debug;

use super::{
    cast_votes, compute_sl_tp, signal_quality, QualityInputs, SignalAnalysis, SignalError,
    IndicatorReadings, VoteInputs,
};
use crate::book::{analyze_book, BookAnalysis};
use crate::config::StrategyConfig;
use crate::domain::{Candle, OrderBookSnapshot};
use crate::fees::{EffectiveFees, FeeSchedule};
use crate::indicators as ind;
use crate::levels::identify_key_levels;

/// Minimum candle history for a full analysis.
pub const MIN_CANDLES: usize = 50;

/// Stateless analyzer over a strategy configuration. Cheap to clone and
/// share; one instance serves any number of coins.
#[derive(Debug, Clone)]
pub struct SignalEngine {
    cfg: StrategyConfig,
    fees: EffectiveFees,
}

impl SignalEngine {
    pub fn new(cfg: StrategyConfig) -> Self {
        let fees = FeeSchedule::hyperliquid().effective(0.0, false, None);
        Self { cfg, fees }
    }

    pub fn with_fees(cfg: StrategyConfig, fees: EffectiveFees) -> Self {
        Self { cfg, fees }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.cfg
    }

    pub fn fees(&self) -> &EffectiveFees {
        &self.fees
    }

    /// Analyze a market moment. `book` is optional: without one, book
    /// metrics read neutral and the analysis is candle-only. Fewer than
    /// [`MIN_CANDLES`] candles is an error, not a NEUTRAL.
    pub fn analyze(
        &self,
        coin: &str,
        candles: &[Candle],
        book: Option<&OrderBookSnapshot>,
        price: f64,
    ) -> Result<SignalAnalysis, SignalError> {
        if candles.len() < MIN_CANDLES {
            return Err(SignalError::InsufficientData {
                have: candles.len(),
                need: MIN_CANDLES,
            });
        }

        let icfg = &self.cfg.indicators;
        let closes = ind::closes(candles);

        let rsi = ind::rsi(&closes, icfg.rsi_period);
        let macd = ind::macd(&closes, icfg.macd_fast, icfg.macd_slow, icfg.macd_signal);
        let ema_short = ind::ema(&closes, icfg.ema_short);
        let ema_long = ind::ema(&closes, icfg.ema_long);
        let bollinger = ind::bollinger(&closes, icfg.bollinger_period, icfg.bollinger_std);
        let atr = ind::atr(candles, icfg.atr_period);
        let stochastic = ind::stochastic(candles, icfg.stochastic_period);
        let williams_r = ind::williams_r(candles, icfg.williams_period);
        let cci = ind::cci(candles, icfg.cci_period);
        let vwap = ind::vwap(candles);
        let momentum = ind::momentum(&closes, 10);
        let volume_profile = ind::volume_profile(candles);

        let th = &self.cfg.thresholds;
        let volatility = ind::volatility_regime(
            atr,
            price,
            candles,
            th.volatility_low,
            th.volatility_high,
            th.squeeze_ratio,
        );

        let book_analysis = match book {
            Some(b) => analyze_book(b, price, &self.cfg.book),
            None => BookAnalysis::neutral(),
        };

        let levels = identify_key_levels(candles, price, icfg.atr_period);
        let patterns = ind::candlestick_patterns(candles);
        let price_action = ind::price_action(candles, price);

        let rsi_history = ind::rsi_series(&closes, icfg.rsi_period);
        let valid_rsi: Vec<f64> = rsi_history.iter().copied().filter(|v| !v.is_nan()).collect();
        let divergence = if valid_rsi.len() >= 10 {
            ind::divergence(&closes[closes.len() - valid_rsi.len()..], &valid_rsi)
        } else {
            None
        };

        let tally = cast_votes(
            &VoteInputs {
                rsi,
                macd: &macd,
                ema_short,
                ema_long,
                price,
                bollinger_upper: bollinger.upper,
                bollinger_lower: bollinger.lower,
                order_flow: book_analysis.imbalance,
                book: &book_analysis,
                volatility: &volatility,
                levels: &levels,
                patterns: &patterns,
                divergence,
                momentum: &momentum,
                stochastic: &stochastic,
                williams_r,
                cci,
                price_action: &price_action,
            },
            th,
        );

        let signal = tally.signal();
        let volume_ratio = ind::volume_ratio(candles);
        let atr_fraction = if price > 0.0 { atr / price } else { 0.0 };

        let quality = signal_quality(
            &QualityInputs {
                buy_votes: tally.buy,
                sell_votes: tally.sell,
                macd_histogram: macd.histogram,
                ema_short,
                ema_long,
                price,
                volume_ratio,
                spread_percent: book_analysis.spread_percent,
                atr_fraction,
                book_imbalance: book_analysis.imbalance,
                supports: &levels.supports,
                resistances: &levels.resistances,
            },
            &self.cfg.quality,
        );

        let sl_tp = compute_sl_tp(signal, price, atr, &self.cfg.sl_tp, &self.fees);

        debug!(
            coin,
            %signal,
            buy = tally.buy,
            sell = tally.sell,
            quality,
            "analysis complete"
        );

        Ok(SignalAnalysis {
            coin: coin.to_string(),
            time: candles[candles.len() - 1].time,
            price,
            signal,
            strength: tally.strength(),
            confidence: tally.confidence(),
            quality,
            buy_votes: tally.buy,
            sell_votes: tally.sell,
            reasons: tally.reasons,
            indicators: IndicatorReadings {
                rsi,
                macd,
                ema_short,
                ema_long,
                bollinger,
                atr,
                stochastic,
                williams_r,
                cci,
                vwap,
                momentum,
                volatility,
                volume_profile,
            },
            book: book_analysis,
            levels,
            sl_tp,
            volume_ratio,
        })
    }
}
