//! Exchange fee schedule.
//!
//! Hyperliquid-style 14-day-volume tiers with referral and staking
//! discounts. The SL/TP math and the simulator's fill model both pull
//! their taker/maker rates from here so net-PnL estimates and realized
//! PnL agree.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeTier {
    pub level: u8,
    /// Upper bound (inclusive) on 14-day volume for this tier.
    pub max_volume: f64,
    pub taker: f64,
    pub maker: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StakingTier {
    Wood,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
}

impl StakingTier {
    pub fn discount(&self) -> f64 {
        match self {
            StakingTier::Wood => 0.05,
            StakingTier::Bronze => 0.10,
            StakingTier::Silver => 0.15,
            StakingTier::Gold => 0.20,
            StakingTier::Platinum => 0.30,
            StakingTier::Diamond => 0.40,
        }
    }
}

/// Effective per-leg rates after tier lookup and discounts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectiveFees {
    pub taker: f64,
    pub maker: f64,
    pub base_taker: f64,
    pub base_maker: f64,
    pub discount: f64,
}

impl EffectiveFees {
    /// Round-trip taker cost as a fraction of notional (both legs).
    pub fn round_trip_taker(&self) -> f64 {
        self.taker * 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub tiers: Vec<FeeTier>,
    pub referral_discount: f64,
    pub max_discount: f64,
}

impl FeeSchedule {
    pub fn hyperliquid() -> FeeSchedule {
        FeeSchedule {
            tiers: vec![
                tier(0, 5_000_000.0, 0.00035, 0.0001),
                tier(1, 25_000_000.0, 0.00030, 0.00005),
                tier(2, 100_000_000.0, 0.00025, 0.0),
                tier(3, 500_000_000.0, 0.00023, 0.0),
                tier(4, 2_000_000_000.0, 0.00021, 0.0),
                tier(5, f64::INFINITY, 0.00019, 0.0),
            ],
            referral_discount: 0.04,
            max_discount: 0.44,
        }
    }

    /// Effective rates for an account. Falls back to the last tier if the
    /// volume exceeds every bound (only possible with a custom table).
    pub fn effective(
        &self,
        volume_14d: f64,
        use_referral: bool,
        staking: Option<StakingTier>,
    ) -> EffectiveFees {
        let tier = self
            .tiers
            .iter()
            .find(|t| volume_14d <= t.max_volume)
            .or_else(|| self.tiers.last())
            .copied()
            .unwrap_or(FeeTier {
                level: 0,
                max_volume: f64::INFINITY,
                taker: 0.00035,
                maker: 0.0001,
            });

        let mut discount = 0.0;
        if use_referral {
            discount += self.referral_discount;
        }
        if let Some(s) = staking {
            discount += s.discount();
        }
        discount = discount.min(self.max_discount);

        EffectiveFees {
            taker: tier.taker * (1.0 - discount),
            maker: tier.maker * (1.0 - discount),
            base_taker: tier.taker,
            base_maker: tier.maker,
            discount,
        }
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        FeeSchedule::hyperliquid()
    }
}

fn tier(level: u8, max_volume: f64, taker: f64, maker: f64) -> FeeTier {
    FeeTier {
        level,
        max_volume,
        taker,
        maker,
    }
}
