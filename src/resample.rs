//! Folding one-minute ticks into interval candles
//!
//! A single left-to-right pass over the fetched tick range. Each tick
//! lands in exactly one bucket, so total volume is conserved between
//! input and output. Buckets are never synthesized for gaps: after a
//! hole in the data the next observed tick seeds the next bucket at its
//! own timestamp.

use chrono::{DateTime, Utc};

use crate::error::{EngineError, EngineResult};
use crate::interval::IntervalSpec;
use crate::types::{Candle, PlotData, Tick};

/// Running aggregate for the bucket currently being filled.
struct BucketAcc {
    start: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl BucketAcc {
    fn seed(tick: &Tick) -> Self {
        BucketAcc {
            start: tick.timestamp,
            open: tick.open,
            high: tick.high,
            low: tick.low,
            close: tick.close,
            volume: tick.volume,
        }
    }

    fn absorb(&mut self, tick: &Tick) {
        self.high = self.high.max(tick.high);
        self.low = self.low.min(tick.low);
        self.close = tick.close;
        self.volume += tick.volume;
    }

    fn finish(&self) -> Candle {
        Candle {
            timestamp: self.start,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        }
    }
}

/// Fold an ordered sequence of one-minute ticks into candles of the
/// requested interval.
///
/// `ticks` must be strictly increasing by timestamp; violating that is
/// a caller error, not silently corrected here. An empty input reports
/// `InsufficientData`. The fold carries no state between calls, so the
/// same input always produces the same output.
pub fn resample(ticks: &[Tick], interval: IntervalSpec) -> EngineResult<Vec<Candle>> {
    let (first, rest) = ticks.split_first().ok_or(EngineError::InsufficientData)?;

    let mut candles = Vec::with_capacity(rest.len() / interval.minutes() as usize + 1);
    let mut bucket = BucketAcc::seed(first);

    for tick in rest {
        if tick.timestamp < bucket.start + interval.seconds() {
            bucket.absorb(tick);
        } else {
            candles.push(bucket.finish());
            bucket = BucketAcc::seed(tick);
        }
    }
    candles.push(bucket.finish());

    Ok(candles)
}

/// Split a candle series into the parallel arrays the charting widget
/// consumes directly.
pub fn to_plot_data(candles: &[Candle]) -> PlotData {
    let mut plot = PlotData {
        datetime: Vec::with_capacity(candles.len()),
        open: Vec::with_capacity(candles.len()),
        high: Vec::with_capacity(candles.len()),
        low: Vec::with_capacity(candles.len()),
        close: Vec::with_capacity(candles.len()),
        volume: Vec::with_capacity(candles.len()),
    };

    for candle in candles {
        plot.datetime.push(format_timestamp(candle.timestamp));
        plot.open.push(candle.open);
        plot.high.push(candle.high);
        plot.low.push(candle.low);
        plot.close.push(candle.close);
        plot.volume.push(candle.volume);
    }

    plot
}

/// Chart axis label: day-month hour:minute, UTC.
fn format_timestamp(timestamp: i64) -> String {
    match DateTime::<Utc>::from_timestamp(timestamp, 0) {
        Some(dt) => dt.format("%d-%m %H:%M").to_string(),
        None => timestamp.to_string(),
    }
}
