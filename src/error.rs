//! Error taxonomy for the resampling engine
//!
//! Every failure path surfaces as a distinct variant; nothing is
//! swallowed into a default value. The presentation layer renders these
//! as user-visible messages instead of a partial or empty chart.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Both time sources failed: the tick store had no usable latest
    /// tick and the time-sync service was unreachable or malformed.
    #[error("reference time unavailable: {0}")]
    TimeUnavailable(String),

    /// Interval is not a minute-divisor of an hour or an hour-divisor
    /// of a day.
    #[error("unsupported interval: {0} minutes")]
    UnsupportedInterval(u32),

    /// Tick-store connection or query failure.
    #[error("tick store unreachable: {0}")]
    StoreUnreachable(#[from] rusqlite::Error),

    /// Empty or too-short tick range for the requested window.
    #[error("insufficient tick data for the requested range")]
    InsufficientData,

    /// No table mapping exists for the requested instrument.
    #[error("no table mapping for symbol '{0}'")]
    InvalidSymbol(String),

    /// Requested candle depth must be a positive integer.
    #[error("invalid depth: {0} (must be positive)")]
    InvalidDepth(u32),
}

pub type EngineResult<T> = Result<T, EngineError>;
