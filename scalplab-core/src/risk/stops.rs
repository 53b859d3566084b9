//! Stop ratchets: trailing stop, break-even, time-stop.
//!
//! All movement goes through `Position::tighten_stop`, so a stop can only
//! move in the protective direction no matter how often these run.

use crate::config::StopConfig;
use crate::domain::{minutes_between, Position};

/// What a ratchet pass changed, mostly for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StopUpdate {
    pub trailing_activated: bool,
    pub break_even_activated: bool,
    pub stop_moved: bool,
}

/// Advance the trailing and break-even ratchets for one price tick.
///
/// `round_trip_fee` is the summed entry+exit fee fraction used for the
/// break-even level. Idempotent: replaying the same price is a no-op.
pub fn apply_stop_ratchet(
    position: &mut Position,
    price: f64,
    cfg: &StopConfig,
    round_trip_fee: f64,
) -> StopUpdate {
    let mut update = StopUpdate::default();
    let pnl_percent = position.unrealized_pnl(price) * 100.0;

    if pnl_percent > position.max_profit {
        position.max_profit = pnl_percent;
    }

    // Break-even arms first (lower threshold than trailing).
    if !position.break_even_active && pnl_percent >= cfg.break_even_activation {
        let candidate = position.entry_price
            * (1.0 + position.side.direction() * round_trip_fee);
        if position.tighten_stop(candidate) {
            position.break_even_active = true;
            update.break_even_activated = true;
            update.stop_moved = true;
        }
    }

    if !position.trailing_active && pnl_percent >= cfg.trailing_activation {
        position.trailing_active = true;
        update.trailing_activated = true;
    }

    if position.trailing_active && position.max_profit > cfg.trailing_activation {
        // Keep (100 - trailing_percent)% of the best profit seen.
        let keep = position.max_profit * (1.0 - cfg.trailing_percent / 100.0);
        let candidate =
            position.entry_price * (1.0 + position.side.direction() * keep / 100.0);
        if position.tighten_stop(candidate) {
            update.stop_moved = true;
        }
    }

    update
}

/// Time-stop: position held past the limit without reaching the profit floor.
pub fn time_stop_hit(position: &Position, now: i64, price: f64, cfg: &StopConfig) -> bool {
    let held = minutes_between(position.entry_time, now);
    held >= cfg.time_stop_minutes
        && position.unrealized_pnl(price) * 100.0 < cfg.time_stop_min_profit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Side;

    fn long_position() -> Position {
        Position::new(
            "BTC", Side::Long, 100.0, 1000.0, 99.2, [101.0, 101.8, 102.5], 0, 85.0, 0.35, 0.2,
        )
    }

    fn cfg() -> StopConfig {
        StopConfig::default()
    }

    #[test]
    fn break_even_moves_stop_to_entry_plus_fees() {
        let mut pos = long_position();
        let update = apply_stop_ratchet(&mut pos, 100.6, &cfg(), 0.0007);
        assert!(update.break_even_activated);
        assert!((pos.stop_loss - 100.0 * 1.0007).abs() < 1e-9);
    }

    #[test]
    fn trailing_ratchets_monotonically() {
        let mut pos = long_position();
        apply_stop_ratchet(&mut pos, 101.2, &cfg(), 0.0007);
        let after_run_up = pos.stop_loss;
        assert!(pos.trailing_active);
        assert!(after_run_up > 99.2);

        // A pullback must never loosen the stop.
        apply_stop_ratchet(&mut pos, 100.3, &cfg(), 0.0007);
        assert_eq!(pos.stop_loss, after_run_up);
    }

    #[test]
    fn ratchet_is_idempotent() {
        let mut pos = long_position();
        apply_stop_ratchet(&mut pos, 101.5, &cfg(), 0.0007);
        let stop = pos.stop_loss;
        let update = apply_stop_ratchet(&mut pos, 101.5, &cfg(), 0.0007);
        assert_eq!(pos.stop_loss, stop);
        assert!(!update.stop_moved);
    }

    #[test]
    fn short_trailing_moves_stop_down() {
        let mut pos = Position::new(
            "ETH", Side::Short, 100.0, 1000.0, 100.8, [99.0, 98.2, 97.5], 0, 85.0, 0.35, 0.2,
        );
        apply_stop_ratchet(&mut pos, 98.8, &cfg(), 0.0007);
        assert!(pos.trailing_active);
        assert!(pos.stop_loss < 100.8);
        assert!(pos.stop_loss < 100.0, "short stop should cross below entry");
    }

    #[test]
    fn time_stop_needs_both_time_and_flat_pnl() {
        let pos = long_position();
        let c = cfg();
        let late = (c.time_stop_minutes * 60.0) as i64 + 60;
        assert!(time_stop_hit(&pos, late, 100.0, &c));
        // In profit past the floor: no time-stop.
        assert!(!time_stop_hit(&pos, late, 101.0, &c));
        // Too early.
        assert!(!time_stop_hit(&pos, 60, 100.0, &c));
    }
}
