//! CLI command implementations

pub mod candles;
pub mod plot;
pub mod raw;

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crypto_candles::{CandleEngine, Config, IntervalSpec, Symbol};

/// Load the config (falling back to defaults when the file is absent)
/// and wire the engine.
fn build_engine(config_path: &str) -> Result<CandleEngine> {
    let config = if Path::new(config_path).exists() {
        let config = Config::from_file(config_path)?;
        info!("Loaded configuration from: {}", config_path);
        config
    } else {
        info!("Config file '{}' not found, using defaults", config_path);
        Config::default()
    };

    CandleEngine::from_config(config).context("Failed to initialize engine")
}

/// Parse and validate the request pair shared by all subcommands.
/// Depth is validated by the engine's range calculation.
fn parse_request(symbol: &str, interval: u32) -> Result<(Symbol, IntervalSpec)> {
    let interval = IntervalSpec::new(interval)?;
    Ok((Symbol::new(symbol), interval))
}
