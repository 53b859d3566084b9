//! Sequential bar-replay backtester.
//!
//! Walks the candle history once, analyzing the growing prefix at each
//! bar. An accepted signal opens a position at a slippage-adjusted fill
//! and a bounded forward scan plays out the exit: stop, take-profit
//! ladder, stop ratchets, time-stop, then a forced timeout close when the
//! scan window runs out. While a position is open new signals are
//! ignored; the outer loop resumes at the bar after the exit.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{BacktestCosts, StrategyConfig};
use crate::domain::{ClosedTrade, Candle, ExitReason, minutes_between, Position, Side, Signal};
use crate::risk::{apply_stop_ratchet, time_stop_hit, PositionManager};
use crate::signal::{evaluate_entry, EntryInputs, SignalEngine};

#[derive(Debug, Error)]
pub enum BacktestError {
    #[error("not enough candles: {have}, need {need}")]
    NotEnoughData { have: usize, need: usize },
}

/// One point of the equity curve, appended at every trade close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub time: i64,
    pub equity: f64,
    pub pnl: f64,
}

/// Why bars did not become trades, bucketed for analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RejectionStats {
    /// Bars with a complete analysis.
    pub analyzed: u64,
    pub neutral: u64,
    /// Filter rejections keyed by `EntryRejection::key()`.
    pub filtered: HashMap<String, u64>,
    pub entered: u64,
}

impl RejectionStats {
    fn reject(&mut self, key: &str) {
        *self.filtered.entry(key.to_string()).or_insert(0) += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    pub coin: String,
    pub initial_capital: f64,
    pub final_capital: f64,
    pub trades: Vec<ClosedTrade>,
    pub equity_curve: Vec<EquityPoint>,
    pub rejections: RejectionStats,
}

/// A single executed leg: the adjusted price plus its explicit costs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fill {
    pub price: f64,
    pub fee: f64,
    pub slippage: f64,
}

/// Entry leg: price slips against the trader, fee charged on notional.
pub fn entry_fill(price: f64, side: Side, notional: f64, costs: &BacktestCosts) -> Fill {
    let fee_rate = if costs.prefer_maker {
        costs.maker_fee
    } else {
        costs.taker_fee
    };
    Fill {
        price: price * (1.0 + side.direction() * costs.slippage),
        fee: notional * fee_rate,
        slippage: notional * costs.slippage,
    }
}

/// Exit leg: slippage works against the trader in the other direction.
pub fn exit_fill(price: f64, side: Side, notional: f64, costs: &BacktestCosts) -> Fill {
    let fee_rate = if costs.prefer_maker {
        costs.maker_fee
    } else {
        costs.taker_fee
    };
    Fill {
        price: price * (1.0 - side.direction() * costs.slippage),
        fee: notional * fee_rate,
        slippage: notional * costs.slippage,
    }
}

pub struct Backtester {
    engine: SignalEngine,
}

impl Backtester {
    pub fn new(cfg: StrategyConfig) -> Self {
        Self {
            engine: SignalEngine::new(cfg),
        }
    }

    pub fn config(&self) -> &StrategyConfig {
        self.engine.config()
    }

    pub fn run(&self, coin: &str, candles: &[Candle]) -> Result<RunOutput, BacktestError> {
        let cfg = self.engine.config().clone();
        let costs = cfg.backtest.clone();
        if candles.len() < costs.min_candles {
            return Err(BacktestError::NotEnoughData {
                have: candles.len(),
                need: costs.min_candles,
            });
        }

        let warmup = usize::max(
            crate::signal::MIN_CANDLES,
            (candles.len() as f64 * costs.warmup_fraction) as usize,
        );
        let fee_rate = if costs.prefer_maker {
            costs.maker_fee
        } else {
            costs.taker_fee
        };
        let mut manager = PositionManager::new(
            cfg.risk.clone(),
            cfg.stops.clone(),
            2.0 * fee_rate,
        );
        manager.set_daily_start_balance(costs.initial_capital);

        let mut capital = costs.initial_capital;
        let mut trades = Vec::new();
        let mut equity_curve = Vec::new();
        let mut rejections = RejectionStats::default();

        info!(coin, bars = candles.len(), warmup, "backtest start");

        let mut i = warmup;
        while i < candles.len() {
            let price = candles[i].close;
            let analysis = match self.engine.analyze(coin, &candles[..=i], None, price) {
                Ok(a) => a,
                Err(_) => {
                    i += 1;
                    continue;
                }
            };
            rejections.analyzed += 1;

            if !analysis.signal.is_actionable() {
                rejections.neutral += 1;
                i += 1;
                continue;
            }

            let sl_tp = match analysis.sl_tp {
                Some(s) => s,
                None => {
                    i += 1;
                    continue;
                }
            };
            let sl_fraction = sl_tp.stop_loss_percent / 100.0;
            let size = manager.size_for(analysis.quality, capital, sl_fraction);

            let entry = EntryInputs {
                signal: analysis.signal,
                quality: analysis.quality,
                volume_ratio: analysis.volume_ratio,
                spread_percent: analysis.book.spread_percent,
                atr_fraction: if price > 0.0 {
                    analysis.indicators.atr / price
                } else {
                    0.0
                },
                position_open: false,
                capital_available: size <= capital * 0.95,
                rsi: analysis.indicators.rsi,
                ema_short: analysis.indicators.ema_short,
                ema_long: analysis.indicators.ema_long,
                price,
                macd: &analysis.indicators.macd,
                stochastic: &analysis.indicators.stochastic,
                williams_r: analysis.indicators.williams_r,
            };
            if let Err(rejection) = evaluate_entry(&entry, &cfg.entry) {
                rejections.reject(rejection.key());
                i += 1;
                continue;
            }

            rejections.entered += 1;
            let side = match analysis.signal {
                Signal::Buy => Side::Long,
                _ => Side::Short,
            };
            let fill = entry_fill(price, side, size, &costs);
            let mut position = Position::new(
                coin,
                side,
                fill.price,
                size,
                sl_tp.stop_loss,
                [sl_tp.take_profit_1, sl_tp.take_profit_2, sl_tp.take_profit_3],
                candles[i].time,
                analysis.quality,
                fill.fee,
                fill.slippage,
            );
            debug!(
                coin,
                bar = i,
                ?side,
                entry = fill.price,
                size,
                stop = position.stop_loss,
                "entry"
            );

            let lookahead = usize::min(costs.lookahead_bars, candles.len() - i - 1);
            let mut exit_bar = i + lookahead;
            let mut flat = false;

            for j in (i + 1)..=(i + lookahead) {
                let bar = &candles[j];
                let bar_price = bar.close;

                if position.stop_hit(bar_price) {
                    let trade = close_slice(
                        &position,
                        position.size,
                        bar_price,
                        bar.time,
                        ExitReason::StopLoss,
                        &costs,
                    );
                    capital += trade.pnl_net;
                    push_close(&mut trades, &mut equity_curve, &mut manager, trade, capital, bar.time);
                    exit_bar = j;
                    flat = true;
                    break;
                }

                while let Some(level) = position.next_tp_hit(bar_price) {
                    position.take_profits[level].filled = true;
                    // Last rung flattens whatever remains; earlier rungs
                    // peel a fixed fraction of the original notional.
                    let notional = if level == 2 {
                        position.size
                    } else {
                        (position.initial_size * cfg.sl_tp.tp_fractions[level])
                            .min(position.size)
                    };
                    let trade = close_slice(
                        &position,
                        notional,
                        bar_price,
                        bar.time,
                        ExitReason::take_profit(level),
                        &costs,
                    );
                    position.size -= notional;
                    capital += trade.pnl_net;
                    push_close(&mut trades, &mut equity_curve, &mut manager, trade, capital, bar.time);
                    if level == 2 || position.size <= f64::EPSILON {
                        exit_bar = j;
                        flat = true;
                        break;
                    }
                }
                if flat {
                    break;
                }

                apply_stop_ratchet(&mut position, bar_price, &cfg.stops, 2.0 * fee_rate);

                if time_stop_hit(&position, bar.time, bar_price, &cfg.stops) {
                    let trade = close_slice(
                        &position,
                        position.size,
                        bar_price,
                        bar.time,
                        ExitReason::TimeStop,
                        &costs,
                    );
                    capital += trade.pnl_net;
                    push_close(&mut trades, &mut equity_curve, &mut manager, trade, capital, bar.time);
                    exit_bar = j;
                    flat = true;
                    break;
                }
            }

            if !flat {
                // Scan window exhausted: forced close at its last bar.
                let bar = &candles[exit_bar];
                let trade = close_slice(
                    &position,
                    position.size,
                    bar.close,
                    bar.time,
                    ExitReason::Timeout,
                    &costs,
                );
                capital += trade.pnl_net;
                push_close(&mut trades, &mut equity_curve, &mut manager, trade, capital, bar.time);
            }

            i = exit_bar + 1;
        }

        info!(
            coin,
            trades = trades.len(),
            final_capital = capital,
            "backtest done"
        );

        Ok(RunOutput {
            coin: coin.to_string(),
            initial_capital: costs.initial_capital,
            final_capital: capital,
            trades,
            equity_curve,
            rejections,
        })
    }
}

fn push_close(
    trades: &mut Vec<ClosedTrade>,
    equity_curve: &mut Vec<EquityPoint>,
    manager: &mut PositionManager,
    trade: ClosedTrade,
    capital: f64,
    now: i64,
) {
    equity_curve.push(EquityPoint {
        time: trade.exit_time,
        equity: capital,
        pnl: trade.pnl_net,
    });
    manager.close(&trade, now);
    trades.push(trade);
}

/// Close `notional` of the position at the raw exit price. Entry costs are
/// prorated by the closed fraction so that partial closes sum exactly to
/// the whole.
fn close_slice(
    position: &Position,
    notional: f64,
    raw_exit: f64,
    exit_time: i64,
    reason: ExitReason,
    costs: &BacktestCosts,
) -> ClosedTrade {
    let fill = exit_fill(raw_exit, position.side, notional, costs);
    let share = notional / position.initial_size;
    let pnl_gross = notional
        * position.side.direction()
        * (fill.price - position.entry_price)
        / position.entry_price;
    let fees = position.entry_fee * share + fill.fee;
    let slippage = position.entry_slippage * share + fill.slippage;
    let pnl_net = pnl_gross - fees - slippage;
    ClosedTrade {
        coin: position.coin.clone(),
        side: position.side,
        entry_price: position.entry_price,
        exit_price: fill.price,
        entry_time: position.entry_time,
        exit_time,
        size: notional,
        pnl_gross,
        fees,
        slippage,
        pnl_net,
        pnl_percent: if notional > 0.0 {
            pnl_net / notional * 100.0
        } else {
            0.0
        },
        exit_reason: reason,
        duration_minutes: minutes_between(position.entry_time, exit_time),
        signal_quality: position.signal_quality,
    }
}
