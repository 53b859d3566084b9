//! Historical simulation.

pub mod backtest;

pub use backtest::{
    entry_fill, exit_fill, BacktestError, Backtester, EquityPoint, Fill, RejectionStats, RunOutput,
};
