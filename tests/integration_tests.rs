//! Integration tests for the candle resampling pipeline
//!
//! These tests run the full request path (clock resolution, alignment,
//! range calculation, fetch, resampling) against an in-memory tick
//! store; the time-sync fallback points at an unroutable endpoint so a
//! network hiccup can never make them flaky.

use std::time::Duration;

use approx::assert_relative_eq;
use chrono::{TimeZone, Timelike, Utc};

use crypto_candles::clock::TimeSyncClient;
use crypto_candles::{
    resample, CandleEngine, Config, EngineError, IntervalSpec, Symbol, Tick, TickStore,
};

// =============================================================================
// Test Utilities
// =============================================================================

/// Generate one-minute ticks walking a deterministic pseudo-random
/// price path, ending at `end_ts` inclusive.
fn generate_mock_ticks(count: usize, end_ts: i64, base_price: f64, volatility: f64) -> Vec<Tick> {
    let start_ts = end_ts - (count as i64 - 1) * 60;
    let mut price = base_price;
    let mut ticks = Vec::with_capacity(count);

    for i in 0..count {
        let change = match i % 3 {
            0 => volatility,
            1 => -volatility * 0.5,
            _ => volatility * 0.3,
        };
        price += change;

        let open = price - change * 0.3;
        let close = price;
        let high = open.max(close) + volatility * 0.5;
        let low = open.min(close) - volatility * 0.5;

        ticks.push(Tick {
            timestamp: start_ts + i as i64 * 60,
            open,
            high,
            low,
            close,
            volume: 10.0 + (i % 13) as f64,
        });
    }

    ticks
}

/// Engine over an in-memory store seeded with `ticks` in `data_btc`,
/// and a time-sync client that always fails.
fn engine_with_ticks(ticks: &[Tick]) -> CandleEngine {
    let store = TickStore::open_in_memory().unwrap();
    store.ensure_table("data_btc").unwrap();
    for tick in ticks {
        store.append("data_btc", tick).unwrap();
    }
    let time_sync =
        TimeSyncClient::new("http://127.0.0.1:9/time", Duration::from_millis(50)).unwrap();
    CandleEngine::new(store, time_sync, Config::default())
}

fn btc() -> Symbol {
    Symbol::new("btcusd")
}

// =============================================================================
// Pipeline Tests
// =============================================================================

#[test]
fn test_freshest_candle_starts_on_calendar_grid() {
    // Six hours of continuous minute data ending 14:49; a 15-minute
    // chart's freshest bucket must start at 14:45.
    let end_ts = Utc
        .with_ymd_and_hms(2024, 3, 7, 14, 49, 0)
        .unwrap()
        .timestamp();
    let ticks = generate_mock_ticks(360, end_ts, 42_000.0, 15.0);
    let engine = engine_with_ticks(&ticks);

    let candles = engine
        .candles(&btc(), IntervalSpec::new(15).unwrap(), 8)
        .unwrap();

    let last = candles.last().unwrap();
    let last_start = Utc.timestamp_opt(last.timestamp, 0).unwrap();
    assert_eq!((last_start.hour(), last_start.minute()), (14, 45));

    // Every bucket of a continuous series sits on the 15-minute grid.
    for candle in &candles {
        let start = Utc.timestamp_opt(candle.timestamp, 0).unwrap();
        assert_eq!(start.minute() % 15, 0, "off-grid candle at {}", candle.timestamp);
    }
}

#[test]
fn test_depth_controls_history_window() {
    let end_ts = Utc
        .with_ymd_and_hms(2024, 3, 7, 12, 0, 0)
        .unwrap()
        .timestamp();
    let ticks = generate_mock_ticks(600, end_ts, 42_000.0, 15.0);
    let engine = engine_with_ticks(&ticks);

    // depth candles of history plus the in-progress bucket
    let candles = engine
        .candles(&btc(), IntervalSpec::new(30).unwrap(), 5)
        .unwrap();
    assert_eq!(candles.len(), 6);
}

#[test]
fn test_candles_match_direct_resample_of_raw_ticks() {
    let end_ts = Utc
        .with_ymd_and_hms(2024, 3, 7, 9, 17, 0)
        .unwrap()
        .timestamp();
    let ticks = generate_mock_ticks(480, end_ts, 2_300.0, 4.0);
    let engine = engine_with_ticks(&ticks);

    let interval = IntervalSpec::new(60).unwrap();
    let raw = engine.raw_ticks(&btc(), interval, 4).unwrap();
    let via_engine = engine.candles(&btc(), interval, 4).unwrap();
    let direct = resample(&raw, interval).unwrap();
    assert_eq!(via_engine, direct);

    // Conservation survives the whole pipeline.
    let tick_volume: f64 = raw.iter().map(|t| t.volume).sum();
    let candle_volume: f64 = via_engine.iter().map(|c| c.volume).sum();
    assert_eq!(tick_volume, candle_volume);
}

#[test]
fn test_candle_invariants_over_mock_data() {
    let end_ts = Utc
        .with_ymd_and_hms(2024, 3, 7, 23, 59, 0)
        .unwrap()
        .timestamp();
    let ticks = generate_mock_ticks(720, end_ts, 150.0, 0.8);
    let engine = engine_with_ticks(&ticks);

    for minutes in [5, 15, 60, 240] {
        let candles = engine
            .candles(&btc(), IntervalSpec::new(minutes).unwrap(), 3)
            .unwrap();
        assert!(!candles.is_empty());
        for candle in &candles {
            assert!(candle.high >= candle.open.max(candle.close));
            assert!(candle.low <= candle.open.min(candle.close));
            assert!(candle.volume >= 0.0);
        }
        assert!(candles.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }
}

#[test]
fn test_plot_data_mirrors_candles() {
    let end_ts = Utc
        .with_ymd_and_hms(2024, 3, 7, 16, 30, 0)
        .unwrap()
        .timestamp();
    let ticks = generate_mock_ticks(300, end_ts, 42_000.0, 15.0);
    let engine = engine_with_ticks(&ticks);

    let interval = IntervalSpec::new(10).unwrap();
    let candles = engine.candles(&btc(), interval, 10).unwrap();
    let plot = engine.plot_data(&btc(), interval, 10).unwrap();

    assert_eq!(plot.len(), candles.len());
    for (i, candle) in candles.iter().enumerate() {
        assert_relative_eq!(plot.open[i], candle.open);
        assert_relative_eq!(plot.high[i], candle.high);
        assert_relative_eq!(plot.low[i], candle.low);
        assert_relative_eq!(plot.close[i], candle.close);
        assert_relative_eq!(plot.volume[i], candle.volume);
    }

    // 16:30 on the 10-minute grid formats as the axis label directly.
    assert_eq!(plot.datetime.last().unwrap(), "07-03 16:30");
}

// =============================================================================
// Failure Paths
// =============================================================================

#[test]
fn test_unsupported_interval_has_no_partial_result() {
    let err = IntervalSpec::new(7).unwrap_err();
    assert!(matches!(err, EngineError::UnsupportedInterval(7)));
}

#[test]
fn test_unknown_symbol() {
    let engine = engine_with_ticks(&generate_mock_ticks(10, 600 * 60, 100.0, 1.0));
    let err = engine
        .candles(&Symbol::new("shibusd"), IntervalSpec::new(5).unwrap(), 5)
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidSymbol(_)));
}

#[test]
fn test_empty_store_and_dead_time_service() {
    let engine = engine_with_ticks(&[]);
    let err = engine
        .candles(&btc(), IntervalSpec::new(5).unwrap(), 5)
        .unwrap_err();
    assert!(matches!(err, EngineError::TimeUnavailable(_)));
}
