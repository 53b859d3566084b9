//! Performance metrics — pure functions over the trade ledger.
//!
//! Every metric is trades and/or equity curve in, scalar out; nothing
//! here touches the engine or the runner.

use serde::{Deserialize, Serialize};

use scalplab_core::domain::ClosedTrade;
use scalplab_core::sim::EquityPoint;

/// Aggregate statistics for one run.
///
/// `profit_factor` is `+inf` when there are winning trades and no losing
/// ones; serde_json renders that as `null`, which downstream consumers
/// read as "undefeated so far".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub trade_count: usize,
    pub wins: usize,
    pub losses: usize,
    pub winrate: f64,
    pub profit_factor: f64,
    pub sharpe: f64,
    pub max_drawdown: f64,
    pub total_pnl: f64,
    pub total_fees: f64,
    pub total_slippage: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
}

impl PerformanceMetrics {
    pub fn compute(trades: &[ClosedTrade], equity_curve: &[EquityPoint]) -> Self {
        let wins = trades.iter().filter(|t| t.is_winner()).count();
        let losses = trades.len() - wins;
        Self {
            trade_count: trades.len(),
            wins,
            losses,
            winrate: winrate(trades),
            profit_factor: profit_factor(trades),
            sharpe: sharpe(trades),
            max_drawdown: max_drawdown(equity_curve),
            total_pnl: trades.iter().map(|t| t.pnl_net).sum(),
            total_fees: trades.iter().map(|t| t.fees).sum(),
            total_slippage: trades.iter().map(|t| t.slippage).sum(),
            avg_win: avg_where(trades, true),
            avg_loss: avg_where(trades, false),
        }
    }
}

pub fn winrate(trades: &[ClosedTrade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().filter(|t| t.is_winner()).count() as f64 / trades.len() as f64
}

/// Gross wins over gross losses. No trades: 0. Wins but no losses: +inf.
pub fn profit_factor(trades: &[ClosedTrade]) -> f64 {
    let gross_wins: f64 = trades
        .iter()
        .filter(|t| t.pnl_net > 0.0)
        .map(|t| t.pnl_net)
        .sum();
    let gross_losses: f64 = trades
        .iter()
        .filter(|t| t.pnl_net < 0.0)
        .map(|t| -t.pnl_net)
        .sum();
    if gross_losses > 0.0 {
        gross_wins / gross_losses
    } else if gross_wins > 0.0 {
        f64::INFINITY
    } else {
        0.0
    }
}

/// Annualized Sharpe over per-trade returns.
///
/// mean(pnl%) / std(pnl%) * sqrt(252); 0 for fewer than 2 trades or
/// zero variance.
pub fn sharpe(trades: &[ClosedTrade]) -> f64 {
    if trades.len() < 2 {
        return 0.0;
    }
    let returns: Vec<f64> = trades.iter().map(|t| t.pnl_percent).collect();
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance =
        returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (returns.len() - 1) as f64;
    let std = variance.sqrt();
    if std < 1e-15 {
        return 0.0;
    }
    mean / std * 252.0_f64.sqrt()
}

/// Largest peak-to-trough fall of the equity curve, as a fraction of the
/// peak.
pub fn max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let mut peak = f64::MIN;
    let mut worst = 0.0_f64;
    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        }
        if peak > 0.0 {
            worst = worst.max((peak - point.equity) / peak);
        }
    }
    worst
}

fn avg_where(trades: &[ClosedTrade], winners: bool) -> f64 {
    let matched: Vec<f64> = trades
        .iter()
        .filter(|t| t.is_winner() == winners)
        .map(|t| t.pnl_net)
        .collect();
    if matched.is_empty() {
        return 0.0;
    }
    matched.iter().sum::<f64>() / matched.len() as f64
}
