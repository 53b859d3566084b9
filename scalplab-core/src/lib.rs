//! ScalpLab Core — indicators, signal engine, risk management, simulation.
//!
//! This crate contains the heart of the scalping toolkit:
//! - Domain types (candles, order books, positions, trades)
//! - An indicator battery with exact, warm-up-aware semantics
//! - Key price levels (swings, pivots, volume profile, psychology)
//! - Order-book analytics (walls, imbalance, liquidity, icebergs)
//! - The voting signal engine with quality scoring and entry gates
//! - Position sizing, stop ratchets and portfolio risk gates
//! - A sequential bar-replay backtester with an explicit cost model
//! - Order lifecycle tracking and the market-data boundary

pub mod book;
pub mod config;
pub mod data;
pub mod domain;
pub mod fees;
pub mod indicators;
pub mod levels;
pub mod orders;
pub mod risk;
pub mod signal;
pub mod sim;
pub mod snapshot;
