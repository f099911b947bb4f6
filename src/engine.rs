//! Request pipeline: clock -> alignment -> range -> fetch -> resample
//!
//! `CandleEngine` owns the tick store handle and the time-sync client;
//! both are injected at construction, so there is no process-wide
//! implicit state and each request is independent of the others.

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::clock::{resolve_reference_time, TimeSyncClient};
use crate::config::Config;
use crate::error::{EngineError, EngineResult};
use crate::interval::{align, fetch_range, IntervalSpec};
use crate::resample::{resample, to_plot_data};
use crate::store::TickStore;
use crate::types::{Candle, PlotData, Symbol, Tick};

pub struct CandleEngine {
    store: TickStore,
    time_sync: TimeSyncClient,
    config: Config,
}

impl CandleEngine {
    /// Wire the engine from explicit parts.
    pub fn new(store: TickStore, time_sync: TimeSyncClient, config: Config) -> Self {
        CandleEngine {
            store,
            time_sync,
            config,
        }
    }

    /// Open the store and build the time-sync client from `config`.
    pub fn from_config(config: Config) -> EngineResult<Self> {
        let store = TickStore::open(&config.database.path)?;
        let time_sync = TimeSyncClient::new(
            config.time_service.url.clone(),
            Duration::from_secs(config.time_service.timeout_secs),
        )?;
        Ok(CandleEngine::new(store, time_sync, config))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Raw one-minute ticks backing a `depth`-candle chart at
    /// `interval`, ordered ascending.
    pub fn raw_ticks(
        &self,
        symbol: &Symbol,
        interval: IntervalSpec,
        depth: u32,
    ) -> EngineResult<Vec<Tick>> {
        let table = self.table_for(symbol)?;

        let reference_ts = resolve_reference_time(&self.store, table, &self.time_sync)?;
        let boundary = align(reference_ts, interval);
        let range = fetch_range(boundary, interval, depth)?;
        debug!(
            "Request {} {} depth={}: boundary [{}, {}], fetch from {}",
            symbol, interval, depth, boundary.begin, boundary.end, range.begin
        );

        let ticks = self.store.ticks_since(table, range.begin)?;
        if ticks.is_empty() {
            warn!("No ticks in table '{}' at or after {}", table, range.begin);
            return Err(EngineError::InsufficientData);
        }

        info!("Fetched {} raw ticks for {} {}", ticks.len(), symbol, interval);
        Ok(ticks)
    }

    /// Resampled candles at `interval`, freshest bucket last.
    pub fn candles(
        &self,
        symbol: &Symbol,
        interval: IntervalSpec,
        depth: u32,
    ) -> EngineResult<Vec<Candle>> {
        let ticks = self.raw_ticks(symbol, interval, depth)?;
        let candles = resample(&ticks, interval)?;
        info!(
            "Resampled {} ticks into {} candles for {} {}",
            ticks.len(),
            candles.len(),
            symbol,
            interval
        );
        Ok(candles)
    }

    /// Candle series as parallel arrays, ready for the chart widget.
    pub fn plot_data(
        &self,
        symbol: &Symbol,
        interval: IntervalSpec,
        depth: u32,
    ) -> EngineResult<PlotData> {
        let candles = self.candles(symbol, interval, depth)?;
        Ok(to_plot_data(&candles))
    }

    fn table_for(&self, symbol: &Symbol) -> EngineResult<&str> {
        self.config
            .table_for(symbol)
            .ok_or_else(|| EngineError::InvalidSymbol(symbol.to_string()))
    }
}
