//! Property tests for core invariants.
//!
//! Uses proptest to verify:
//! 1. Indicator bounds — RSI and stochastic stay in range on any series
//! 2. EMA convergence — on a rising series the EMA trails the last price
//! 3. Vote ties — equal buy and sell votes always read NEUTRAL
//! 4. Stop ratchet — stops only tighten, under any price path
//! 5. Quality score — bounded, and symmetric under a BUY/SELL mirror
//! 6. SL geometry — the stop distance respects the configured clamp
//! 7. Fill model — the trade ledger identity balances for any inputs

use proptest::prelude::*;

use scalplab_core::config::{QualityWeights, SlTpConfig, StopConfig};
use scalplab_core::domain::{Candle, Position, Side, Signal};
use scalplab_core::fees::FeeSchedule;
use scalplab_core::indicators::{ema, rsi, stochastic};
use scalplab_core::risk::apply_stop_ratchet;
use scalplab_core::signal::quality::{signal_quality, QualityInputs};
use scalplab_core::signal::votes::VoteTally;
use scalplab_core::signal::{compute_sl_tp, MIN_CANDLES};

// ── Strategies ───────────────────────────────────────────────────────

fn arb_prices(len: usize) -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(10.0..1_000.0_f64, len)
}

fn arb_candles(len: usize) -> impl Strategy<Value = Vec<Candle>> {
    proptest::collection::vec((50.0..500.0_f64, 0.0..5.0_f64), len).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (close, range))| Candle {
                time: i as i64 * 60,
                open: close,
                high: close + range,
                low: (close - range).max(1.0),
                close,
                volume: 1_000.0,
            })
            .collect()
    })
}

// ── 1 & 2. Indicators ────────────────────────────────────────────────

proptest! {
    #[test]
    fn rsi_stays_bounded(prices in arb_prices(MIN_CANDLES)) {
        let value = rsi(&prices, 14);
        prop_assert!((0.0..=100.0).contains(&value), "rsi out of range: {value}");
    }

    #[test]
    fn stochastic_stays_bounded(candles in arb_candles(MIN_CANDLES)) {
        let s = stochastic(&candles, 7);
        prop_assert!((0.0..=100.0).contains(&s.k));
        prop_assert!((0.0..=100.0).contains(&s.d));
    }

    #[test]
    fn ema_trails_a_rising_series(start in 10.0..100.0_f64, step in 0.01..2.0_f64) {
        let prices: Vec<f64> = (0..60).map(|i| start + step * i as f64).collect();
        let value = ema(&prices, 20);
        let last = prices[prices.len() - 1];
        prop_assert!(value < last, "ema {value} should trail last price {last}");
        prop_assert!(value > prices[0], "ema {value} should have left the start behind");
    }
}

// ── 3. Vote ties ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn equal_votes_read_neutral(votes in 0u32..30) {
        let tally = VoteTally { buy: votes, sell: votes, reasons: Vec::new() };
        prop_assert_eq!(tally.signal(), Signal::Neutral);
        prop_assert_eq!(tally.strength(), 0.5);
    }

    #[test]
    fn majority_always_wins(buy in 0u32..30, sell in 0u32..30) {
        prop_assume!(buy != sell);
        let tally = VoteTally { buy, sell, reasons: Vec::new() };
        let expected = if buy > sell { Signal::Buy } else { Signal::Sell };
        prop_assert_eq!(tally.signal(), expected);
    }
}

// ── 4. Stop ratchet ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn stops_never_loosen(
        path in proptest::collection::vec(95.0..110.0_f64, 1..50),
        long in proptest::bool::ANY,
    ) {
        let side = if long { Side::Long } else { Side::Short };
        let stop = if long { 99.2 } else { 100.8 };
        let tps = if long {
            [101.0, 101.8, 102.5]
        } else {
            [99.0, 98.2, 97.5]
        };
        let mut position = Position::new(
            "BTC", side, 100.0, 1_000.0, stop, tps, 0, 85.0, 0.35, 0.2,
        );
        let cfg = StopConfig::default();
        let mut previous = position.stop_loss;
        for price in path {
            apply_stop_ratchet(&mut position, price, &cfg, 0.0007);
            match side {
                Side::Long => prop_assert!(position.stop_loss >= previous),
                Side::Short => prop_assert!(position.stop_loss <= previous),
            }
            previous = position.stop_loss;
        }
    }
}

// ── 5. Quality score ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn quality_is_bounded_and_mirror_symmetric(
        buy in 0u32..15,
        sell in 0u32..15,
        macd_hist in -2.0..2.0_f64,
        ema_short_gap in -5.0..5.0_f64,
        ema_long_gap in -5.0..5.0_f64,
        volume_ratio in 0.0..4.0_f64,
        spread in 0.0..0.1_f64,
        atr_fraction in 0.0..0.02_f64,
        imbalance in -40.0..40.0_f64,
        support_gap in 0.0..2.0_f64,
        resistance_gap in 0.0..2.0_f64,
    ) {
        prop_assume!(buy != sell);
        let price = 100.0;
        let weights = QualityWeights::default();

        let long = QualityInputs {
            buy_votes: buy,
            sell_votes: sell,
            macd_histogram: macd_hist,
            ema_short: price - ema_short_gap,
            ema_long: price - ema_long_gap,
            price,
            volume_ratio,
            spread_percent: spread,
            atr_fraction,
            book_imbalance: imbalance,
            supports: &[price - support_gap],
            resistances: &[price + resistance_gap],
        };
        let long_score = signal_quality(&long, &weights);
        prop_assert!((0.0..=100.0).contains(&long_score));

        // Mirror everything around the price: swapped votes, negated
        // histogram and imbalance, reflected EMAs and levels.
        let short = QualityInputs {
            buy_votes: sell,
            sell_votes: buy,
            macd_histogram: -macd_hist,
            ema_short: price + ema_short_gap,
            ema_long: price + ema_long_gap,
            price,
            volume_ratio,
            spread_percent: spread,
            atr_fraction,
            book_imbalance: -imbalance,
            supports: &[price - resistance_gap],
            resistances: &[price + support_gap],
        };
        let short_score = signal_quality(&short, &weights);
        prop_assert!((long_score - short_score).abs() < 1e-9);
    }
}

// ── 6. SL geometry ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn stop_distance_respects_the_clamp(
        price in 10.0..10_000.0_f64,
        atr in 0.0..500.0_f64,
        buying in proptest::bool::ANY,
    ) {
        let cfg = SlTpConfig::default();
        let fees = FeeSchedule::hyperliquid().effective(0.0, false, None);
        let signal = if buying { Signal::Buy } else { Signal::Sell };
        let Some(sl_tp) = compute_sl_tp(signal, price, atr, &cfg, &fees) else {
            return Err(TestCaseError::fail("actionable signal must produce levels"));
        };
        prop_assert!(sl_tp.stop_loss_percent >= cfg.min_sl_percent - 1e-9);
        prop_assert!(sl_tp.stop_loss_percent <= cfg.max_sl_percent + 1e-9);
        // The stop sits on the losing side of the entry.
        if buying {
            prop_assert!(sl_tp.stop_loss < price);
            prop_assert!(sl_tp.take_profit_1 > price);
        } else {
            prop_assert!(sl_tp.stop_loss > price);
            prop_assert!(sl_tp.take_profit_1 < price);
        }
    }
}

// ── 7. Ledger identity ───────────────────────────────────────────────

proptest! {
    #[test]
    fn trade_ledger_identity_balances(
        entry in 50.0..500.0_f64,
        move_pct in -0.02..0.02_f64,
        notional in 100.0..5_000.0_f64,
        long in proptest::bool::ANY,
    ) {
        use scalplab_core::config::BacktestCosts;
        use scalplab_core::sim::{entry_fill, exit_fill};

        let side = if long { Side::Long } else { Side::Short };
        let costs = BacktestCosts::default();
        let open = entry_fill(entry, side, notional, &costs);
        let raw_exit = entry * (1.0 + move_pct);
        let close = exit_fill(raw_exit, side, notional, &costs);

        let pnl_gross = notional * side.direction() * (close.price - open.price) / open.price;
        let fees = open.fee + close.fee;
        let slippage = open.slippage + close.slippage;
        let pnl_net = pnl_gross - fees - slippage;

        // Identity: net is exactly gross minus explicit costs.
        prop_assert!((pnl_net - (pnl_gross - fees - slippage)).abs() < 1e-12);
        // Costs are strictly positive, so net is strictly below gross.
        prop_assert!(pnl_net < pnl_gross);
        // Both legs slip against the trader.
        match side {
            Side::Long => {
                prop_assert!(open.price > entry);
                prop_assert!(close.price < raw_exit);
            }
            Side::Short => {
                prop_assert!(open.price < entry);
                prop_assert!(close.price > raw_exit);
            }
        }
    }
}
