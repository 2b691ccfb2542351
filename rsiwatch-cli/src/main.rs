//! RsiWatch CLI — analyze, backtest, watch, and bot commands.
//!
//! Commands:
//! - `analyze` — fetch candles and print the current RSI signal
//! - `backtest` — replay the strategy over recent history, optionally
//!   exporting the trade ledger as CSV
//! - `watch` — run the alert cycle once (or loop on the configured interval)
//! - `bot` — run the interactive command bot

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use rsiwatch_alerter::{run_bot, run_cycle, AlerterConfig, SignalStore, TelegramNotifier};
use rsiwatch_core::analysis::{analyze, AnalysisOptions};
use rsiwatch_core::backtest::run_backtest;
use rsiwatch_core::data::{ExchangeProvider, DEFAULT_CANDLE_LIMIT};
use rsiwatch_core::domain::{Signal, Thresholds, Timeframe};

#[derive(Parser)]
#[command(name = "rsiwatch", about = "RsiWatch CLI — RSI signal dashboard and alerter")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch candles and print the current RSI signal.
    Analyze {
        /// Trading pair, e.g. BTC/USDT.
        symbol: String,

        /// Candle interval: 15m, 30m, 1h, 4h, 1d.
        #[arg(long, default_value = "1h")]
        timeframe: String,

        /// RSI oversold cutoff (buy below this).
        #[arg(long, default_value_t = 30.0)]
        oversold: f64,

        /// RSI overbought cutoff (sell above this).
        #[arg(long, default_value_t = 70.0)]
        overbought: f64,

        /// Number of candles to fetch.
        #[arg(long, default_value_t = DEFAULT_CANDLE_LIMIT)]
        limit: usize,
    },
    /// Replay the strategy over recent history and print the ledger.
    Backtest {
        /// Trading pair, e.g. BTC/USDT.
        symbol: String,

        /// Candle interval: 15m, 30m, 1h, 4h, 1d.
        #[arg(long, default_value = "1h")]
        timeframe: String,

        /// Starting capital for the simulation.
        #[arg(long, default_value_t = 1000.0)]
        capital: f64,

        /// RSI oversold cutoff.
        #[arg(long, default_value_t = 30.0)]
        oversold: f64,

        /// RSI overbought cutoff.
        #[arg(long, default_value_t = 70.0)]
        overbought: f64,

        /// Number of candles to fetch.
        #[arg(long, default_value_t = DEFAULT_CANDLE_LIMIT)]
        limit: usize,

        /// Write the trade ledger to this CSV file.
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Run the alert cycle over the configured watch list.
    Watch {
        /// Path to the alerter TOML config.
        #[arg(long, default_value = "alerter.toml")]
        config: PathBuf,

        /// Keep running, one cycle per configured interval.
        #[arg(long, default_value_t = false)]
        r#loop: bool,
    },
    /// Run the interactive Telegram command bot (with periodic alerts).
    Bot {
        /// Path to the alerter TOML config.
        #[arg(long, default_value = "alerter.toml")]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            symbol,
            timeframe,
            oversold,
            overbought,
            limit,
        } => run_analyze(&symbol, &timeframe, oversold, overbought, limit),
        Commands::Backtest {
            symbol,
            timeframe,
            capital,
            oversold,
            overbought,
            limit,
            export,
        } => run_backtest_cmd(&symbol, &timeframe, capital, oversold, overbought, limit, export),
        Commands::Watch { config, r#loop } => run_watch(&config, r#loop),
        Commands::Bot { config } => run_bot_cmd(&config),
    }
}

fn parse_options(
    timeframe: &str,
    oversold: f64,
    overbought: f64,
    limit: usize,
) -> Result<(Timeframe, AnalysisOptions)> {
    let timeframe: Timeframe = timeframe.parse()?;
    if oversold >= overbought {
        bail!("oversold ({oversold}) must be below overbought ({overbought})");
    }
    let options = AnalysisOptions {
        thresholds: Thresholds {
            oversold,
            overbought,
        },
        candle_limit: limit,
        ..AnalysisOptions::default()
    };
    Ok((timeframe, options))
}

fn run_analyze(
    symbol: &str,
    timeframe: &str,
    oversold: f64,
    overbought: f64,
    limit: usize,
) -> Result<()> {
    let (timeframe, options) = parse_options(timeframe, oversold, overbought, limit)?;
    let provider = ExchangeProvider::new();
    let symbol = symbol.to_uppercase();

    let report = analyze(&provider, &symbol, timeframe, &options)
        .with_context(|| format!("could not load data for {symbol} ({timeframe})"))?;

    if report.reading.signal == Signal::Error {
        bail!("not enough history to compute RSI for {symbol} ({timeframe})");
    }

    println!("{}", report.summary_line(&options));
    println!(
        "  buy below {:.0}, sell above {:.0}, {} rows analyzed",
        options.thresholds.oversold,
        options.thresholds.overbought,
        report.rows.len()
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_backtest_cmd(
    symbol: &str,
    timeframe: &str,
    capital: f64,
    oversold: f64,
    overbought: f64,
    limit: usize,
    export: Option<PathBuf>,
) -> Result<()> {
    let (timeframe, options) = parse_options(timeframe, oversold, overbought, limit)?;
    let provider = ExchangeProvider::new();
    let symbol = symbol.to_uppercase();

    let report = analyze(&provider, &symbol, timeframe, &options)
        .with_context(|| format!("could not load data for {symbol} ({timeframe})"))?;
    let backtest = run_backtest(&report.rows, options.thresholds, capital);

    println!("{}", report.summary_line(&options));
    println!(
        "  capital ${capital:.2} -> final ${:.2} ({:+.2}%), {} trades over {:.1}h",
        backtest.final_value,
        backtest.profit_percent,
        backtest.trade_count,
        report.span_hours()
    );

    for trade in &backtest.trades {
        println!(
            "  {} {:<4} {:>12.2} x {:>12.6}  cash {:>12.2}",
            trade.timestamp.format("%Y-%m-%d %H:%M"),
            trade.side.to_string(),
            trade.price,
            trade.quantity,
            trade.balance_after
        );
    }

    if let Some(path) = export {
        export_ledger(&path, &backtest.trades)?;
        println!("ledger written to {}", path.display());
    }
    Ok(())
}

/// Write the trade ledger as CSV.
fn export_ledger(path: &PathBuf, trades: &[rsiwatch_core::domain::TradeRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    writer.write_record(["timestamp", "side", "price", "quantity", "balance_after"])?;
    for trade in trades {
        writer.write_record([
            trade.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            trade.side.to_string(),
            format!("{:.8}", trade.price),
            format!("{:.8}", trade.quantity),
            format!("{:.8}", trade.balance_after),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn run_watch(config_path: &PathBuf, keep_running: bool) -> Result<()> {
    let config = AlerterConfig::load(config_path)?;
    config.require_chat_id()?;

    let provider = ExchangeProvider::new();
    let notifier = TelegramNotifier::new(&config.telegram.token);
    let store = SignalStore::new(&config.watch.state_file);

    loop {
        let outcome = run_cycle(&provider, &notifier, &store, &config)?;
        println!(
            "cycle done: {} checked, {} alerted, {} re-armed, {} skipped (state: {})",
            outcome.checked,
            outcome.alerts_sent,
            outcome.rearmed,
            outcome.skipped,
            store.path().display()
        );

        if !keep_running {
            return Ok(());
        }
        std::thread::sleep(Duration::from_secs(config.watch.interval_secs));
    }
}

fn run_bot_cmd(config_path: &PathBuf) -> Result<()> {
    // A missing token aborts here, before any work begins.
    let config = AlerterConfig::load(config_path)?;
    let provider = ExchangeProvider::new();
    run_bot(&provider, &config)?;
    Ok(())
}
