//! Configuration management
//!
//! Handles loading and parsing of JSON configuration files with
//! environment variable overrides for deployment-specific paths.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::types::Symbol;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub time_service: TimeServiceConfig,
    /// Lowercase pair symbol -> backing table name.
    #[serde(default = "default_pair_tables")]
    pub pair_tables: HashMap<String, String>,
    /// Chart-form interval choices: display label -> minutes.
    #[serde(default = "default_interval_labels")]
    pub interval_labels: HashMap<String, u32>,
    /// Depth choices offered by the presentation layer. The engine
    /// itself enforces no upper bound.
    #[serde(default = "default_depth_limits")]
    pub depth_limits: Vec<u32>,
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).context("Failed to read config file")?;
        let mut config: Config =
            serde_json::from_str(&contents).context("Failed to parse config JSON")?;
        config.apply_env();
        Ok(config)
    }

    /// Override deployment-specific settings from the environment.
    fn apply_env(&mut self) {
        if let Ok(path) = std::env::var("CANDLES_DB_PATH") {
            self.database.path = path;
        }
        if let Ok(url) = std::env::var("CANDLES_TIME_SERVICE_URL") {
            self.time_service.url = url;
        }
    }

    /// Backing table for a symbol, if one is configured.
    pub fn table_for(&self, symbol: &Symbol) -> Option<&str> {
        self.pair_tables.get(symbol.as_str()).map(String::as_str)
    }

    /// Configured trading pairs, for listings and form choices.
    pub fn symbols(&self) -> Vec<Symbol> {
        let mut symbols: Vec<Symbol> = self.pair_tables.keys().map(Symbol::new).collect();
        symbols.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        symbols
    }

    /// Interval choices for the chart form, finest first. Labels are
    /// display data only; the minutes still go through `IntervalSpec`
    /// validation when a request is made.
    pub fn interval_choices(&self) -> Vec<(String, u32)> {
        let mut choices: Vec<(String, u32)> = self
            .interval_labels
            .iter()
            .map(|(label, &minutes)| (label.clone(), minutes))
            .collect();
        choices.sort_by_key(|&(_, minutes)| minutes);
        choices
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database: DatabaseConfig::default(),
            time_service: TimeServiceConfig::default(),
            pair_tables: default_pair_tables(),
            interval_labels: default_interval_labels(),
            depth_limits: default_depth_limits(),
        }
    }
}

/// Tick store location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            path: "data/ticks.db".to_string(),
        }
    }
}

/// External time-sync service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeServiceConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for TimeServiceConfig {
    fn default() -> Self {
        TimeServiceConfig {
            url: "https://yandex.com/time/sync.json".to_string(),
            timeout_secs: 10,
        }
    }
}

fn default_pair_tables() -> HashMap<String, String> {
    [
        ("btcusd", "data_btc"),
        ("ethusd", "data_eth"),
        ("ltcusd", "data_ltc"),
        ("xrpusd", "data_xrp"),
    ]
    .into_iter()
    .map(|(pair, table)| (pair.to_string(), table.to_string()))
    .collect()
}

fn default_interval_labels() -> HashMap<String, u32> {
    [
        ("1 min", 1),
        ("5 min", 5),
        ("15 min", 15),
        ("30 min", 30),
        ("1 hour", 60),
        ("2 hour", 120),
        ("4 hour", 240),
        ("6 hour", 360),
        ("12 hour", 720),
    ]
    .into_iter()
    .map(|(label, minutes)| (label.to_string(), minutes))
    .collect()
}

fn default_depth_limits() -> Vec<u32> {
    vec![300, 200, 100, 80, 60, 50, 40, 30, 20, 10, 5]
}
