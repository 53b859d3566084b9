//! ScalpLab Runner — run configuration, orchestration, metrics, sweeps,
//! and report artifacts on top of `scalplab-core`.

pub mod config;
pub mod metrics;
pub mod reporting;
pub mod runner;
pub mod sweep;

pub use config::{RunConfig, RunId};
pub use metrics::PerformanceMetrics;
pub use runner::{run, BacktestResult};
pub use sweep::{run_sweep, ParamGrid, SweepRow};
