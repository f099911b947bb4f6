//! Crypto candle resampling - main entry point
//!
//! This binary provides three subcommands:
//! - raw: dump the raw one-minute ticks behind a chart request
//! - candles: resample ticks into interval candles
//! - plot: emit chart-ready parallel arrays as JSON

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "crypto-candles")]
#[command(about = "Calendar-aligned OHLCV resampling for crypto candle charts", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "configs/candles.json")]
    config: String,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Dump raw one-minute ticks for a chart request
    Raw {
        /// Trading pair, e.g. btcusd
        #[arg(short, long)]
        symbol: String,

        /// Candle interval in minutes (1, 5, 15, 60, 240, ...)
        #[arg(short, long, default_value = "30")]
        interval: u32,

        /// Number of candles of history
        #[arg(short, long, default_value = "50")]
        depth: u32,

        /// Output CSV file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Resample ticks into interval candles
    Candles {
        /// Trading pair, e.g. btcusd
        #[arg(short, long)]
        symbol: String,

        /// Candle interval in minutes (1, 5, 15, 60, 240, ...)
        #[arg(short, long, default_value = "30")]
        interval: u32,

        /// Number of candles of history
        #[arg(short, long, default_value = "50")]
        depth: u32,

        /// Output CSV file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Emit chart-ready parallel arrays as JSON
    Plot {
        /// Trading pair, e.g. btcusd
        #[arg(short, long)]
        symbol: String,

        /// Candle interval in minutes (1, 5, 15, 60, 240, ...)
        #[arg(short, long, default_value = "30")]
        interval: u32,

        /// Number of candles of history
        #[arg(short, long, default_value = "50")]
        depth: u32,

        /// Output JSON file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn setup_logging(verbose: bool, command_name: &str) -> Result<()> {
    std::fs::create_dir_all("logs")?;

    // Log file naming pattern: {command}_{date}.log
    let log_filename = format!(
        "{}_{}.log",
        command_name,
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let log_path = PathBuf::from("logs").join(&log_filename);

    // Filter out noisy external crates
    let level = if verbose { "debug" } else { "info" };
    let filter_str = format!("{},hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn", level);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let file_appender = tracing_appender::rolling::never("logs", &log_filename);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(true);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_appender)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!("Logging initialized");
    info!("Log file: {}", log_path.display());

    Ok(())
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let command_name = match &cli.command {
        Commands::Raw { .. } => "raw",
        Commands::Candles { .. } => "candles",
        Commands::Plot { .. } => "plot",
    };
    setup_logging(cli.verbose, command_name)?;

    match cli.command {
        Commands::Raw {
            symbol,
            interval,
            depth,
            output,
        } => commands::raw::run(&cli.config, &symbol, interval, depth, output),
        Commands::Candles {
            symbol,
            interval,
            depth,
            output,
        } => commands::candles::run(&cli.config, &symbol, interval, depth, output),
        Commands::Plot {
            symbol,
            interval,
            depth,
            output,
        } => commands::plot::run(&cli.config, &symbol, interval, depth, output),
    }
}
