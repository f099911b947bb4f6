//! Crypto candle resampling engine
//!
//! Resamples a stream of one-minute OHLCV ticks into coarser,
//! calendar-aligned candles of a configured interval (5, 15, 60, 240
//! minutes, ...), suitable for charting. The pipeline for a request is
//! clock resolution, interval alignment, range calculation, tick fetch,
//! then a single resampling fold.

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod interval;
pub mod resample;
pub mod store;
pub mod types;

pub use config::Config;
pub use engine::CandleEngine;
pub use error::{EngineError, EngineResult};
pub use interval::{align, fetch_range, Boundary, FetchRange, IntervalSpec, SUPPORTED_INTERVALS};
pub use resample::{resample, to_plot_data};
pub use store::TickStore;
pub use types::{Candle, PlotData, Symbol, Tick};
