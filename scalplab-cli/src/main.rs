//! ScalpLab CLI — analyze, backtest, and sweep commands.
//!
//! Commands:
//! - `analyze` — run the signal engine once over a candle file
//! - `backtest` — replay a candle file through the simulator
//! - `sweep` — grid-search entry/stop parameters over a candle file

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use scalplab_core::config::StrategyConfig;
use scalplab_core::data::{load_book, load_candles};
use scalplab_core::signal::SignalEngine;
use scalplab_runner::{reporting, run, run_sweep, ParamGrid, RunConfig};

#[derive(Parser)]
#[command(name = "scalplab", about = "ScalpLab CLI — perpetuals scalping toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signal engine once over a candle file.
    Analyze {
        /// JSON candle file (exchange or canonical shape).
        #[arg(long)]
        candles: PathBuf,

        /// Optional JSON order-book snapshot.
        #[arg(long)]
        book: Option<PathBuf>,

        /// Coin label for the report.
        #[arg(long, default_value = "BTC")]
        coin: String,

        /// Strategy config TOML. Defaults are used when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Replay a candle file through the backtest simulator.
    Backtest {
        #[arg(long)]
        candles: PathBuf,

        #[arg(long, default_value = "BTC")]
        coin: String,

        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the entry quality threshold.
        #[arg(long)]
        quality_threshold: Option<f64>,

        /// Start date (YYYY-MM-DD), inclusive.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD), inclusive.
        #[arg(long)]
        end: Option<String>,

        /// Where to write trades/equity/summary artifacts.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Grid-search quality thresholds and stop parameters.
    Sweep {
        #[arg(long)]
        candles: PathBuf,

        #[arg(long, default_value = "BTC")]
        coin: String,

        #[arg(long)]
        config: Option<PathBuf>,

        /// Rows to print, best total PnL first.
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze {
            candles,
            book,
            coin,
            config,
        } => cmd_analyze(candles, book, &coin, config),
        Commands::Backtest {
            candles,
            coin,
            config,
            quality_threshold,
            start,
            end,
            output_dir,
        } => cmd_backtest(candles, &coin, config, quality_threshold, start, end, output_dir),
        Commands::Sweep {
            candles,
            coin,
            config,
            top,
        } => cmd_sweep(candles, &coin, config, top),
    }
}

fn load_strategy(path: Option<PathBuf>) -> Result<StrategyConfig> {
    match path {
        Some(path) => {
            StrategyConfig::from_toml(&path).with_context(|| format!("loading {}", path.display()))
        }
        None => Ok(StrategyConfig::default()),
    }
}

fn parse_date(value: Option<String>) -> Result<Option<NaiveDate>> {
    value
        .as_deref()
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("dates must be YYYY-MM-DD")
}

fn cmd_analyze(
    candles_path: PathBuf,
    book_path: Option<PathBuf>,
    coin: &str,
    config: Option<PathBuf>,
) -> Result<()> {
    let candles = load_candles(&candles_path)
        .with_context(|| format!("loading {}", candles_path.display()))?;
    if candles.is_empty() {
        bail!("no candles in {}", candles_path.display());
    }
    let book = book_path
        .map(|p| load_book(&p).with_context(|| format!("loading {}", p.display())))
        .transpose()?;

    let engine = SignalEngine::new(load_strategy(config)?);
    let price = candles[candles.len() - 1].close;
    let analysis = engine.analyze(coin, &candles, book.as_ref(), price)?;

    println!(
        "{coin} @ {price:.4}: {} (strength {:.2}, {:?} confidence)",
        analysis.signal, analysis.strength, analysis.confidence
    );
    println!(
        "quality {:.1}/100 | votes {} buy / {} sell | volume ratio {:.2}",
        analysis.quality, analysis.buy_votes, analysis.sell_votes, analysis.volume_ratio
    );
    for reason in &analysis.reasons {
        println!("  - {reason}");
    }
    if let Some(sl_tp) = &analysis.sl_tp {
        println!(
            "SL {:.4} ({:.2}%) | TP {:.4}/{:.4}/{:.4} | R:R {:.2}",
            sl_tp.stop_loss,
            sl_tp.stop_loss_percent,
            sl_tp.take_profit_1,
            sl_tp.take_profit_2,
            sl_tp.take_profit_3,
            sl_tp.risk_reward
        );
    }
    Ok(())
}

fn cmd_backtest(
    candles_path: PathBuf,
    coin: &str,
    config: Option<PathBuf>,
    quality_threshold: Option<f64>,
    start: Option<String>,
    end: Option<String>,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let candles = load_candles(&candles_path)
        .with_context(|| format!("loading {}", candles_path.display()))?;

    let mut run_config = RunConfig::new(coin);
    run_config.strategy = load_strategy(config)?;
    run_config.quality_threshold = quality_threshold;
    run_config.start_date = parse_date(start)?;
    run_config.end_date = parse_date(end)?;

    let result = run(&run_config, &candles)?;
    let m = &result.metrics;

    println!("run {}", result.run_id);
    println!(
        "{} trades | winrate {:.1}% | profit factor {} | sharpe {:.2}",
        m.trade_count,
        m.winrate * 100.0,
        if m.profit_factor.is_finite() {
            format!("{:.2}", m.profit_factor)
        } else {
            "inf".to_string()
        },
        m.sharpe
    );
    println!(
        "capital {:.2} -> {:.2} | pnl {:+.2} | fees {:.2} | slippage {:.2} | max dd {:.2}%",
        result.output.initial_capital,
        result.output.final_capital,
        m.total_pnl,
        m.total_fees,
        m.total_slippage,
        m.max_drawdown * 100.0
    );
    for (key, count) in &result.output.rejections.filtered {
        println!("  rejected[{key}] = {count}");
    }

    if let Some(dir) = output_dir {
        reporting::write_artifacts(&dir, &result)?;
        println!("artifacts written to {}", dir.display());
    }
    Ok(())
}

fn cmd_sweep(candles_path: PathBuf, coin: &str, config: Option<PathBuf>, top: usize) -> Result<()> {
    let candles = load_candles(&candles_path)
        .with_context(|| format!("loading {}", candles_path.display()))?;

    let mut base = RunConfig::new(coin);
    base.strategy = load_strategy(config)?;
    let rows = run_sweep(&base, &ParamGrid::default(), &candles);

    println!(
        "{:<10} {:>8} {:>8} {:>7} {:>9} {:>8} {:>10}",
        "quality", "max_sl", "trail", "trades", "winrate", "sharpe", "pnl"
    );
    for row in rows.iter().take(top) {
        println!(
            "{:<10.1} {:>8.2} {:>8.2} {:>7} {:>8.1}% {:>8.2} {:>+10.2}",
            row.quality_threshold,
            row.max_sl_percent,
            row.trailing_activation,
            row.trades,
            row.winrate * 100.0,
            row.sharpe,
            row.total_pnl
        );
    }
    Ok(())
}
