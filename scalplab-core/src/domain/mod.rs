//! Core domain types shared across the crate.

pub mod book;
pub mod candle;
pub mod position;
pub mod signal;
pub mod trade;

pub use book::{OrderBookSnapshot, PriceLevel};
pub use candle::{minutes_between, Candle};
pub use position::{Position, Side, TpLevel};
pub use signal::{Confidence, Signal};
pub use trade::{ClosedTrade, ExitReason};
