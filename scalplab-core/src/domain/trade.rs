//! Immutable closed-trade ledger record.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::position::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    StopLoss,
    TakeProfit1,
    TakeProfit2,
    TakeProfit3,
    TimeStop,
    Timeout,
}

impl ExitReason {
    pub fn take_profit(level: usize) -> ExitReason {
        match level {
            0 => ExitReason::TakeProfit1,
            1 => ExitReason::TakeProfit2,
            _ => ExitReason::TakeProfit3,
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExitReason::StopLoss => "STOP_LOSS",
            ExitReason::TakeProfit1 => "TAKE_PROFIT_1",
            ExitReason::TakeProfit2 => "TAKE_PROFIT_2",
            ExitReason::TakeProfit3 => "TAKE_PROFIT_3",
            ExitReason::TimeStop => "TIME_STOP",
            ExitReason::Timeout => "TIMEOUT",
        };
        f.write_str(s)
    }
}

/// One closed trade (or partial close). The accounting identity
/// `pnl_net == pnl_gross - fees - slippage` holds exactly;
/// [`ClosedTrade::books_balance`] checks it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub coin: String,
    pub side: Side,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_time: i64,
    pub exit_time: i64,
    /// USD notional closed by this record.
    pub size: f64,
    pub pnl_gross: f64,
    pub fees: f64,
    pub slippage: f64,
    pub pnl_net: f64,
    /// Net PnL as a percent of the closed notional.
    pub pnl_percent: f64,
    pub exit_reason: ExitReason,
    pub duration_minutes: f64,
    pub signal_quality: f64,
}

impl ClosedTrade {
    pub fn is_winner(&self) -> bool {
        self.pnl_net > 0.0
    }

    pub fn books_balance(&self) -> bool {
        (self.pnl_net - (self.pnl_gross - self.fees - self.slippage)).abs() < 1e-9
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_reason_wire_names() {
        assert_eq!(
            serde_json::to_string(&ExitReason::TakeProfit2).unwrap(),
            "\"TAKE_PROFIT_2\""
        );
        assert_eq!(
            serde_json::to_string(&ExitReason::StopLoss).unwrap(),
            "\"STOP_LOSS\""
        );
    }

    #[test]
    fn ladder_index_maps_to_reason() {
        assert_eq!(ExitReason::take_profit(0), ExitReason::TakeProfit1);
        assert_eq!(ExitReason::take_profit(2), ExitReason::TakeProfit3);
    }
}
