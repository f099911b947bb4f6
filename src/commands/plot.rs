//! Plot command implementation
//!
//! Emits the candle series as the parallel-array JSON shape a
//! candlestick chart widget consumes directly.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

pub fn run(
    config_path: &str,
    symbol: &str,
    interval: u32,
    depth: u32,
    output: Option<PathBuf>,
) -> Result<()> {
    let engine = super::build_engine(config_path)?;
    let (symbol, interval) = super::parse_request(symbol, interval)?;

    info!("Building plot data: {} {} depth={}", symbol, interval, depth);
    let plot = engine.plot_data(&symbol, interval, depth)?;

    let json = serde_json::to_string_pretty(&plot)?;
    match output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {} plot points to {}", plot.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
