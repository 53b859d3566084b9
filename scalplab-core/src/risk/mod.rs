//! Position and risk management: sizing, stop ratchets, portfolio gates.

pub mod manager;
pub mod sizing;
pub mod stops;

pub use manager::{PositionManager, RiskVeto};
pub use sizing::{position_size, quality_multiplier, SizingInputs};
pub use stops::{apply_stop_ratchet, time_stop_hit, StopUpdate};
