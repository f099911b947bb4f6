//! Core data types used across the resampling engine

use serde::{Deserialize, Serialize};

/// One minute-resolution OHLCV sample as stored in the tick store.
///
/// `timestamp` is Unix seconds and is expected to be an exact multiple
/// of 60. Ticks are read-only inputs; sequences fetched from the store
/// are strictly increasing by timestamp, with gaps tolerated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// One resampled OHLCV record at the target interval.
///
/// `timestamp` is the candle's own bucket-start time. Invariants:
/// `high` is the max of constituent highs, `low` the min of constituent
/// lows, `open` the first constituent's open, `close` the last
/// constituent's close, `volume` the sum of constituent volumes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// A candle covering a single tick: same values, same volume.
    pub fn from_tick(tick: &Tick) -> Self {
        Candle {
            timestamp: tick.timestamp,
            open: tick.open,
            high: tick.high,
            low: tick.low,
            close: tick.close,
            volume: tick.volume,
        }
    }
}

/// Candle series split into parallel arrays for a charting widget.
///
/// `datetime` entries are formatted `"%d-%m %H:%M"` in UTC, matching
/// what the chart's x-axis expects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlotData {
    pub datetime: Vec<String>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub volume: Vec<f64>,
}

impl PlotData {
    pub fn len(&self) -> usize {
        self.datetime.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datetime.is_empty()
    }
}

/// Trading pair symbol using Arc<str> for cheap cloning.
///
/// Symbols are lowercased on construction; the tick store's table
/// mapping is keyed by the lowercase form (e.g. "btcusd").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(#[serde(with = "arc_str_serde")] std::sync::Arc<str>);

/// Custom serde for Arc<str>
mod arc_str_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::sync::Arc;

    pub fn serialize<S>(value: &Arc<str>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Arc<str>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Arc::from(s.to_lowercase().as_str()))
    }
}

impl Symbol {
    pub fn new(s: impl AsRef<str>) -> Self {
        Symbol(std::sync::Arc::from(s.as_ref().to_lowercase().as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
