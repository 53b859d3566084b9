//! Position sizing.
//!
//! Risk-based: a fraction of the balance scaled by signal quality and
//! recent performance, converted to notional through the stop distance.

use crate::config::RiskConfig;

/// Quality scaling for the risk budget. Scores below 70 get a token 0.3,
/// everything above maps 70..100 onto 0.5..1.0.
pub fn quality_multiplier(quality: f64) -> f64 {
    if quality < 70.0 {
        0.3
    } else {
        ((quality - 70.0) / 30.0).clamp(0.5, 1.0)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SizingInputs {
    pub quality: f64,
    pub balance: f64,
    /// Stop distance as a fraction of entry price.
    pub sl_fraction: f64,
    /// Trailing winrate over the last 20 closed trades, when at least 10
    /// have closed.
    pub recent_winrate: Option<f64>,
    pub consecutive_losses: u32,
}

/// USD notional for a new position, capped at a fraction of capital and
/// floored at the exchange minimum.
pub fn position_size(inputs: &SizingInputs, cfg: &RiskConfig) -> f64 {
    let mut risk = inputs.balance * cfg.base_risk * quality_multiplier(inputs.quality);

    if let Some(winrate) = inputs.recent_winrate {
        if winrate > cfg.winrate_increase_threshold {
            risk *= 1.2;
        } else if winrate < cfg.winrate_decrease_threshold {
            risk *= 0.8;
        }
    }

    if inputs.consecutive_losses >= cfg.consecutive_losses_threshold {
        let excess = inputs.consecutive_losses - cfg.consecutive_losses_threshold + 1;
        risk *= 0.5_f64.powi(excess as i32);
    }

    let size = if inputs.sl_fraction > 0.0 {
        risk / inputs.sl_fraction
    } else {
        inputs.balance * 0.01
    };

    size.min(inputs.balance * cfg.max_position_percent)
        .max(cfg.min_notional)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(quality: f64) -> SizingInputs {
        SizingInputs {
            quality,
            balance: 10_000.0,
            sl_fraction: 0.005,
            recent_winrate: None,
            consecutive_losses: 0,
        }
    }

    #[test]
    fn quality_multiplier_shape() {
        assert_eq!(quality_multiplier(50.0), 0.3);
        assert_eq!(quality_multiplier(69.9), 0.3);
        assert_eq!(quality_multiplier(70.0), 0.5);
        assert_eq!(quality_multiplier(85.0), 0.5);
        assert!((quality_multiplier(94.0) - 0.8).abs() < 1e-12);
        assert_eq!(quality_multiplier(100.0), 1.0);
        assert_eq!(quality_multiplier(130.0), 1.0);
    }

    #[test]
    fn size_is_risk_over_stop_distance() {
        // 10_000 * 0.01 * 0.5 / 0.005 = 10_000, capped at 5% of capital.
        let size = position_size(&inputs(85.0), &RiskConfig::default());
        assert_eq!(size, 500.0);
    }

    #[test]
    fn wide_stop_shrinks_below_cap() {
        let mut i = inputs(85.0);
        i.sl_fraction = 0.2;
        let size = position_size(&i, &RiskConfig::default());
        assert_eq!(size, 250.0);
    }

    #[test]
    fn winrate_scales_risk() {
        let cfg = RiskConfig::default();
        let mut i = inputs(85.0);
        i.sl_fraction = 0.2;
        let base = position_size(&i, &cfg);
        i.recent_winrate = Some(0.65);
        assert!((position_size(&i, &cfg) - base * 1.2).abs() < 1e-9);
        i.recent_winrate = Some(0.40);
        assert!((position_size(&i, &cfg) - base * 0.8).abs() < 1e-9);
        i.recent_winrate = Some(0.55);
        assert_eq!(position_size(&i, &cfg), base);
    }

    #[test]
    fn losing_streak_halves_repeatedly() {
        let cfg = RiskConfig::default();
        let mut i = inputs(85.0);
        i.sl_fraction = 0.2;
        let base = position_size(&i, &cfg);
        i.consecutive_losses = cfg.consecutive_losses_threshold;
        assert!((position_size(&i, &cfg) - base * 0.5).abs() < 1e-9);
        i.consecutive_losses = cfg.consecutive_losses_threshold + 1;
        assert!((position_size(&i, &cfg) - base * 0.25).abs() < 1e-9);
    }

    #[test]
    fn minimum_notional_floor() {
        let mut i = inputs(50.0);
        i.balance = 100.0;
        i.sl_fraction = 0.2;
        // 100 * 0.01 * 0.3 / 0.2 = 1.5, floored at 10.
        assert_eq!(position_size(&i, &RiskConfig::default()), 10.0);
    }

    #[test]
    fn degenerate_stop_falls_back_to_one_percent() {
        let mut i = inputs(85.0);
        i.sl_fraction = 0.0;
        assert_eq!(position_size(&i, &RiskConfig::default()), 100.0);
    }
}
