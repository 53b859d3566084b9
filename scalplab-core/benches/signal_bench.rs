//! Criterion benchmarks for the hot paths.
//!
//! Benchmarks:
//! 1. Full signal analysis on a 200-candle window (the per-tick cost of a
//!    live scanner)
//! 2. Indicator battery in isolation (RSI, MACD, EMA, Bollinger, ATR)
//! 3. Order book analysis on a 20-level snapshot
//! 4. A complete backtest over 500 one-minute candles

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use scalplab_core::book::analyze_book;
use scalplab_core::config::StrategyConfig;
use scalplab_core::data::{MarketDataFeed, SyntheticFeed};
use scalplab_core::indicators::{atr, bollinger, ema, macd, rsi};
use scalplab_core::signal::SignalEngine;
use scalplab_core::sim::Backtester;

fn bench_analyze(c: &mut Criterion) {
    let feed = SyntheticFeed::new(42);
    let candles = feed.fetch_candles("BTC", "1m", 200);
    let book = feed.fetch_order_book("BTC");
    let price = candles[candles.len() - 1].close;
    let engine = SignalEngine::new(StrategyConfig::default());

    c.bench_function("signal_analyze_200", |b| {
        b.iter(|| {
            engine
                .analyze(
                    black_box("BTC"),
                    black_box(&candles),
                    Some(black_box(&book)),
                    black_box(price),
                )
                .unwrap()
        })
    });
}

fn bench_indicators(c: &mut Criterion) {
    let feed = SyntheticFeed::new(42);
    let candles = feed.fetch_candles("BTC", "1m", 200);
    let closes: Vec<f64> = candles.iter().map(|candle| candle.close).collect();

    let mut group = c.benchmark_group("indicators");
    group.bench_function("rsi_14", |b| b.iter(|| rsi(black_box(&closes), 14)));
    group.bench_function("macd_12_26_9", |b| {
        b.iter(|| macd(black_box(&closes), 12, 26, 9))
    });
    group.bench_function("ema_21", |b| b.iter(|| ema(black_box(&closes), 21)));
    group.bench_function("bollinger_20", |b| {
        b.iter(|| bollinger(black_box(&closes), 20, 2.0))
    });
    group.bench_function("atr_14", |b| b.iter(|| atr(black_box(&candles), 14)));
    group.finish();
}

fn bench_book(c: &mut Criterion) {
    let feed = SyntheticFeed::new(42);
    let book = feed.fetch_order_book("BTC");
    let mid = book.mid().unwrap_or(100.0);
    let cfg = StrategyConfig::default();

    c.bench_function("analyze_book_20_levels", |b| {
        b.iter(|| analyze_book(black_box(&book), black_box(mid), black_box(&cfg.book)))
    });
}

fn bench_backtest(c: &mut Criterion) {
    let feed = SyntheticFeed::with_market(42, 100.0, 0.006);
    let mut group = c.benchmark_group("backtest");
    group.sample_size(20);
    for bars in [250usize, 500] {
        let candles = feed.fetch_candles("BTC", "1m", bars);
        group.bench_with_input(BenchmarkId::from_parameter(bars), &candles, |b, candles| {
            b.iter(|| {
                let backtester = Backtester::new(StrategyConfig::default());
                backtester.run(black_box("BTC"), black_box(candles)).unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_analyze,
    bench_indicators,
    bench_book,
    bench_backtest
);
criterion_main!(benches);
