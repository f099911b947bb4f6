//! Raw command implementation

use anyhow::{Context, Result};
use std::io::Write;
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

    info!("Fetching raw ticks: {} {} depth={}", symbol, interval, depth);
    let ticks = engine.raw_ticks(&symbol, interval, depth)?;

    let writer: Box<dyn Write> = match &output {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout()),
    };

    let mut csv_writer = csv::Writer::from_writer(writer);
    for tick in &ticks {
        csv_writer.serialize(tick)?;
    }
    csv_writer.flush()?;

    if let Some(path) = output {
        println!("Wrote {} ticks to {}", ticks.len(), path.display());
    }
    Ok(())
}
