//! Stop-loss / take-profit geometry.

use serde::{Deserialize, Serialize};

use crate::config::SlTpConfig;
use crate::domain::Signal;
use crate::fees::EffectiveFees;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlTp {
    pub stop_loss: f64,
    /// Principal target, equal to the outer ladder level.
    pub take_profit: f64,
    pub take_profit_1: f64,
    pub take_profit_2: f64,
    pub take_profit_3: f64,
    pub stop_loss_percent: f64,
    pub take_profit_percent: f64,
    pub risk_reward: f64,
    /// Round-trip taker fees as a fraction of notional.
    pub total_fees: f64,
    /// Expected gain at the principal target net of fees, percent.
    pub net_gain_percent: f64,
    /// Expected loss at the stop including fees, percent.
    pub net_loss_percent: f64,
    /// Price at which the trade covers its fees.
    pub break_even: f64,
}

/// SL distance: clamp(ATR% * sl_atr_factor, min, max); with no usable
/// ATR, the midpoint of the configured band. TP ladder at the three fixed
/// percent offsets. Returns None for NEUTRAL.
pub fn compute_sl_tp(
    signal: Signal,
    price: f64,
    atr: f64,
    cfg: &SlTpConfig,
    fees: &EffectiveFees,
) -> Option<SlTp> {
    if !signal.is_actionable() || price <= 0.0 {
        return None;
    }

    let sl_percent = if atr > 0.0 {
        let atr_percent = atr / price * 100.0;
        (atr_percent * cfg.sl_atr_factor).clamp(cfg.min_sl_percent, cfg.max_sl_percent)
    } else {
        (cfg.min_sl_percent + cfg.max_sl_percent) / 2.0
    };

    let total_fees = fees.round_trip_taker();

    let dir = match signal {
        Signal::Buy => 1.0,
        Signal::Sell => -1.0,
        Signal::Neutral => unreachable!(),
    };

    let stop_loss = price * (1.0 - dir * sl_percent / 100.0);
    let take_profit_1 = price * (1.0 + dir * cfg.tp1_percent / 100.0);
    let take_profit_2 = price * (1.0 + dir * cfg.tp2_percent / 100.0);
    let take_profit_3 = price * (1.0 + dir * cfg.tp3_percent / 100.0);
    let take_profit = take_profit_3;

    let tp_percent = cfg.tp3_percent;
    let risk_reward = if sl_percent > 0.0 {
        tp_percent / sl_percent
    } else {
        0.0
    };

    let net_gain_percent = tp_percent - total_fees * 100.0;
    let net_loss_percent = sl_percent + total_fees * 100.0;
    let break_even = price * (1.0 + dir * total_fees);

    Some(SlTp {
        stop_loss,
        take_profit,
        take_profit_1,
        take_profit_2,
        take_profit_3,
        stop_loss_percent: sl_percent,
        take_profit_percent: tp_percent,
        risk_reward,
        total_fees,
        net_gain_percent,
        net_loss_percent,
        break_even,
    })
}

/// The single-TP risk/reward variant used by the simulator:
/// tp% = max(min_risk_reward * sl%, tp_floor_percent).
pub fn risk_reward_target(sl_percent: f64, cfg: &SlTpConfig) -> f64 {
    (cfg.min_risk_reward * sl_percent).max(cfg.tp_floor_percent)
}
