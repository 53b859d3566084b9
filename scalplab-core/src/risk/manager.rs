//! Per-coin position book with portfolio-level gates.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::sizing::{position_size, SizingInputs};
use super::stops::{apply_stop_ratchet, time_stop_hit, StopUpdate};
use crate::config::{RiskConfig, StopConfig};
use crate::domain::{ClosedTrade, Position};

/// Trailing window for the winrate multiplier.
const RECENT_WINDOW: usize = 20;
/// Closed trades needed before the winrate multiplier kicks in.
const RECENT_MIN: usize = 10;

/// A structured reason a new position was refused.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskVeto {
    #[error("daily drawdown {drawdown:.2}% at limit {max:.2}%")]
    DailyDrawdown { drawdown: f64, max: f64 },
    #[error("{open} positions open, limit {max}")]
    MaxPositions { open: usize, max: usize },
    #[error("position already open on {coin}")]
    AlreadyOpen { coin: String },
    #[error("portfolio heat {heat:.2}% would exceed {max:.2}%")]
    Heat { heat: f64, max: f64 },
    #[error("{coin} correlated to open {with} at {correlation:.2}")]
    Correlated {
        coin: String,
        with: String,
        correlation: f64,
    },
}

impl RiskVeto {
    pub fn key(&self) -> &'static str {
        match self {
            RiskVeto::DailyDrawdown { .. } => "daily_drawdown",
            RiskVeto::MaxPositions { .. } => "max_positions",
            RiskVeto::AlreadyOpen { .. } => "already_open",
            RiskVeto::Heat { .. } => "heat",
            RiskVeto::Correlated { .. } => "correlated",
        }
    }
}

/// Tracks open positions, enforces the portfolio gates and feeds the
/// sizing model with trailing performance. One instance per account.
#[derive(Debug, Clone)]
pub struct PositionManager {
    cfg: RiskConfig,
    stops: StopConfig,
    /// Summed entry+exit fee fraction, used for the break-even level.
    round_trip_fee: f64,
    positions: HashMap<String, Position>,
    recent: VecDeque<ClosedTrade>,
    consecutive_losses: u32,
    daily_pnl: f64,
    daily_start_balance: f64,
    last_reset_day: Option<NaiveDate>,
    correlations: HashMap<(String, String), f64>,
}

impl PositionManager {
    pub fn new(cfg: RiskConfig, stops: StopConfig, round_trip_fee: f64) -> Self {
        Self {
            cfg,
            stops,
            round_trip_fee,
            positions: HashMap::new(),
            recent: VecDeque::with_capacity(RECENT_WINDOW),
            consecutive_losses: 0,
            daily_pnl: 0.0,
            daily_start_balance: 0.0,
            last_reset_day: None,
            correlations: HashMap::new(),
        }
    }

    pub fn position(&self, coin: &str) -> Option<&Position> {
        self.positions.get(coin)
    }

    pub fn open_positions(&self) -> usize {
        self.positions.len()
    }

    pub fn consecutive_losses(&self) -> u32 {
        self.consecutive_losses
    }

    pub fn daily_pnl(&self) -> f64 {
        self.daily_pnl
    }

    /// Register a pairwise correlation used by the veto. Symmetric.
    pub fn set_correlation(&mut self, a: &str, b: &str, correlation: f64) {
        self.correlations
            .insert((a.to_string(), b.to_string()), correlation);
        self.correlations
            .insert((b.to_string(), a.to_string()), correlation);
    }

    pub fn set_daily_start_balance(&mut self, balance: f64) {
        self.daily_start_balance = balance;
    }

    /// Roll daily statistics when the local day changes.
    fn roll_daily(&mut self, now: i64) {
        let today = day_of(now);
        if self.last_reset_day != Some(today) {
            if self.last_reset_day.is_some() {
                debug!(pnl = self.daily_pnl, "daily stats reset");
            }
            self.daily_pnl = 0.0;
            self.last_reset_day = Some(today);
        }
    }

    /// All portfolio gates for a prospective entry, checked in order:
    /// drawdown circuit breaker, position count, per-coin uniqueness,
    /// heat, correlation.
    pub fn can_open(&mut self, coin: &str, now: i64) -> Result<(), RiskVeto> {
        self.roll_daily(now);

        if self.daily_pnl < 0.0 && self.daily_start_balance > 0.0 {
            let drawdown = -self.daily_pnl / self.daily_start_balance;
            if drawdown >= self.cfg.max_daily_drawdown {
                return Err(RiskVeto::DailyDrawdown {
                    drawdown: drawdown * 100.0,
                    max: self.cfg.max_daily_drawdown * 100.0,
                });
            }
        }

        if self.positions.len() >= self.cfg.max_positions {
            return Err(RiskVeto::MaxPositions {
                open: self.positions.len(),
                max: self.cfg.max_positions,
            });
        }

        if self.positions.contains_key(coin) {
            return Err(RiskVeto::AlreadyOpen {
                coin: coin.to_string(),
            });
        }

        let heat = (self.positions.len() + 1) as f64 * self.cfg.base_risk;
        if heat > self.cfg.max_position_heat {
            return Err(RiskVeto::Heat {
                heat: heat * 100.0,
                max: self.cfg.max_position_heat * 100.0,
            });
        }

        for open_coin in self.positions.keys() {
            let pair = (coin.to_string(), open_coin.clone());
            if let Some(&rho) = self.correlations.get(&pair) {
                if rho > self.cfg.correlation_veto {
                    return Err(RiskVeto::Correlated {
                        coin: coin.to_string(),
                        with: open_coin.clone(),
                        correlation: rho,
                    });
                }
            }
        }

        Ok(())
    }

    /// Notional for a new position given the current balance and the
    /// stop distance as a fraction of entry.
    pub fn size_for(&self, quality: f64, balance: f64, sl_fraction: f64) -> f64 {
        let recent_winrate = if self.recent.len() >= RECENT_MIN {
            let winners = self.recent.iter().filter(|t| t.is_winner()).count();
            Some(winners as f64 / self.recent.len() as f64)
        } else {
            None
        };
        position_size(
            &SizingInputs {
                quality,
                balance,
                sl_fraction,
                recent_winrate,
                consecutive_losses: self.consecutive_losses,
            },
            &self.cfg,
        )
    }

    pub fn open(&mut self, position: Position) {
        info!(
            coin = %position.coin,
            side = ?position.side,
            entry = position.entry_price,
            size = position.size,
            stop = position.stop_loss,
            "position opened"
        );
        self.positions.insert(position.coin.clone(), position);
    }

    /// Advance the stop ratchets for one price tick.
    pub fn update(&mut self, coin: &str, price: f64) -> Option<StopUpdate> {
        let stops = self.stops.clone();
        let fee = self.round_trip_fee;
        let position = self.positions.get_mut(coin)?;
        Some(apply_stop_ratchet(position, price, &stops, fee))
    }

    pub fn stop_hit(&self, coin: &str, price: f64) -> bool {
        self.positions
            .get(coin)
            .map(|p| p.stop_hit(price))
            .unwrap_or(false)
    }

    pub fn time_stop_hit(&self, coin: &str, now: i64, price: f64) -> bool {
        self.positions
            .get(coin)
            .map(|p| time_stop_hit(p, now, price, &self.stops))
            .unwrap_or(false)
    }

    /// Remove the position and fold the closed trade into the trailing
    /// statistics.
    pub fn close(&mut self, trade: &ClosedTrade, now: i64) {
        self.roll_daily(now);
        self.positions.remove(&trade.coin);
        self.daily_pnl += trade.pnl_net;
        if trade.pnl_net < 0.0 {
            self.consecutive_losses += 1;
            if self.consecutive_losses >= self.cfg.consecutive_losses_threshold {
                warn!(
                    losses = self.consecutive_losses,
                    "losing streak, sizing reduced"
                );
            }
        } else {
            self.consecutive_losses = 0;
        }
        if self.recent.len() == RECENT_WINDOW {
            self.recent.pop_front();
        }
        self.recent.push_back(trade.clone());
        info!(
            coin = %trade.coin,
            pnl = trade.pnl_net,
            reason = %trade.exit_reason,
            "position closed"
        );
    }
}

fn day_of(ts: i64) -> NaiveDate {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .unwrap_or_else(|| DateTime::<Utc>::UNIX_EPOCH)
        .date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExitReason, Side};

    const DAY: i64 = 86_400;

    fn manager() -> PositionManager {
        PositionManager::new(RiskConfig::default(), StopConfig::default(), 0.0007)
    }

    fn long(coin: &str) -> Position {
        Position::new(
            coin, Side::Long, 100.0, 500.0, 99.2, [101.0, 101.8, 102.5], 0, 85.0, 0.175, 0.1,
        )
    }

    fn losing_trade(coin: &str) -> ClosedTrade {
        ClosedTrade {
            coin: coin.to_string(),
            side: Side::Long,
            entry_price: 100.0,
            exit_price: 99.2,
            entry_time: 0,
            exit_time: 600,
            size: 500.0,
            pnl_gross: -4.0,
            fees: 0.35,
            slippage: 0.2,
            pnl_net: -4.55,
            pnl_percent: -0.91,
            exit_reason: ExitReason::StopLoss,
            duration_minutes: 10.0,
            signal_quality: 85.0,
        }
    }

    #[test]
    fn one_position_per_coin() {
        let mut m = manager();
        assert!(m.can_open("BTC", 0).is_ok());
        m.open(long("BTC"));
        let veto = m.can_open("BTC", 0).unwrap_err();
        assert_eq!(veto.key(), "already_open");
        assert!(m.can_open("ETH", 0).is_ok());
    }

    #[test]
    fn max_positions_cap() {
        let mut m = manager();
        m.open(long("BTC"));
        m.open(long("ETH"));
        m.open(long("SOL"));
        let veto = m.can_open("DOGE", 0).unwrap_err();
        assert_eq!(veto.key(), "max_positions");
    }

    #[test]
    fn drawdown_breaker_trips_and_resets_next_day() {
        let mut m = manager();
        m.set_daily_start_balance(10_000.0);
        m.open(long("BTC"));
        let mut t = losing_trade("BTC");
        t.pnl_net = -350.0;
        m.close(&t, 1_000);
        let veto = m.can_open("ETH", 2_000).unwrap_err();
        assert_eq!(veto.key(), "daily_drawdown");
        // Next local day the breaker resets.
        assert!(m.can_open("ETH", 2_000 + DAY).is_ok());
    }

    #[test]
    fn correlation_veto() {
        let mut m = manager();
        m.set_correlation("BTC", "ETH", 0.85);
        m.set_correlation("BTC", "SOL", 0.40);
        m.open(long("BTC"));
        let veto = m.can_open("ETH", 0).unwrap_err();
        assert_eq!(veto.key(), "correlated");
        assert!(m.can_open("SOL", 0).is_ok());
    }

    #[test]
    fn losing_streak_tracks_and_resets() {
        let mut m = manager();
        for i in 0..3 {
            m.open(long("BTC"));
            m.close(&losing_trade("BTC"), i * 60);
        }
        assert_eq!(m.consecutive_losses(), 3);
        let mut winner = losing_trade("BTC");
        winner.pnl_net = 5.0;
        m.open(long("BTC"));
        m.close(&winner, 240);
        assert_eq!(m.consecutive_losses(), 0);
    }

    #[test]
    fn update_ratchets_the_stop() {
        let mut m = manager();
        m.open(long("BTC"));
        let update = m.update("BTC", 101.2).unwrap();
        assert!(update.trailing_activated);
        assert!(m.position("BTC").unwrap().stop_loss > 99.2);
        assert!(m.update("ETH", 101.2).is_none());
    }

    #[test]
    fn sizing_uses_trailing_winrate() {
        let mut m = manager();
        let base = m.size_for(85.0, 10_000.0, 0.2);
        let mut winner = losing_trade("BTC");
        winner.pnl_net = 5.0;
        for _ in 0..10 {
            m.open(long("BTC"));
            m.close(&winner, 0);
        }
        assert!((m.size_for(85.0, 10_000.0, 0.2) - base * 1.2).abs() < 1e-9);
    }
}
