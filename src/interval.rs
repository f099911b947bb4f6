//! Interval validation, calendar alignment, and fetch-range math
//!
//! A chart request never starts from an arbitrary place: a 15-minute
//! candle always begins at :00, :15, :30 or :45 past the hour, and a
//! 4-hour candle at an hour that is a multiple of 4 from midnight.
//! These are pure functions of their inputs; no I/O happens here.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Candle widths the engine supports, in minutes: the minute-divisors
/// of an hour and the hour-divisors of a day.
pub const SUPPORTED_INTERVALS: &[u32] = &[1, 2, 3, 5, 10, 15, 20, 30, 60, 120, 180, 240, 360, 720];

/// A validated candle interval.
///
/// Construction is the only place interval values are checked; once an
/// `IntervalSpec` exists, alignment and range math cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct IntervalSpec(u32);

impl IntervalSpec {
    /// Validate `minutes` against the supported set.
    ///
    /// Any other value is a configuration error, not a silent default.
    pub fn new(minutes: u32) -> EngineResult<Self> {
        if SUPPORTED_INTERVALS.contains(&minutes) {
            Ok(IntervalSpec(minutes))
        } else {
            Err(EngineError::UnsupportedInterval(minutes))
        }
    }

    pub fn minutes(&self) -> u32 {
        self.0
    }

    /// Interval width in seconds.
    pub fn seconds(&self) -> i64 {
        i64::from(self.0) * 60
    }
}

impl TryFrom<u32> for IntervalSpec {
    type Error = EngineError;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        IntervalSpec::new(minutes)
    }
}

impl From<IntervalSpec> for u32 {
    fn from(interval: IntervalSpec) -> u32 {
        interval.0
    }
}

impl std::fmt::Display for IntervalSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}m", self.0)
    }
}

/// Start and reference-end of the most recent, possibly in-progress,
/// aggregation bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boundary {
    pub begin: i64,
    pub end: i64,
}

/// Absolute timestamp window of raw ticks to fetch from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRange {
    pub begin: i64,
    pub end: i64,
}

/// Compute the calendar-aligned boundary of the most recent bucket at
/// `interval`, relative to `reference_ts` (Unix seconds, UTC).
///
/// `end` marks the still-accumulating or just-closed bucket's reference
/// point, not necessarily its true close time.
pub fn align(reference_ts: i64, interval: IntervalSpec) -> Boundary {
    let reference =
        DateTime::<Utc>::from_timestamp(reference_ts, 0).unwrap_or(DateTime::UNIX_EPOCH);
    let minute = i64::from(reference.minute());
    let hour = i64::from(reference.hour());

    let offset = match interval.minutes() {
        1 => 0,
        m @ (2 | 3 | 5 | 10 | 15 | 20 | 30) => (minute % i64::from(m)) * 60,
        m => {
            let hours = i64::from(m / 60);
            ((hour % hours) * 60 + minute) * 60
        }
    };

    Boundary {
        begin: reference_ts - offset,
        end: reference_ts,
    }
}

/// Compute the raw-tick fetch window: `depth` whole intervals of
/// history before the aligned boundary, up to the freshest tick.
pub fn fetch_range(boundary: Boundary, interval: IntervalSpec, depth: u32) -> EngineResult<FetchRange> {
    if depth == 0 {
        return Err(EngineError::InvalidDepth(depth));
    }
    Ok(FetchRange {
        begin: boundary.begin - interval.seconds() * i64::from(depth),
        end: boundary.end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike, Utc};

    fn ts(hour: u32, minute: u32) -> i64 {
        Utc.with_ymd_and_hms(2024, 3, 7, hour, minute, 0)
            .unwrap()
            .timestamp()
    }

    #[test]
    fn test_interval_spec_accepts_supported_set() {
        for &minutes in SUPPORTED_INTERVALS {
            assert!(IntervalSpec::new(minutes).is_ok(), "interval {minutes}");
        }
    }

    #[test]
    fn test_interval_spec_rejects_others() {
        for minutes in [0, 4, 7, 45, 90, 480, 1440] {
            let err = IntervalSpec::new(minutes).unwrap_err();
            assert!(
                matches!(err, EngineError::UnsupportedInterval(m) if m == minutes),
                "interval {minutes} should be rejected"
            );
        }
    }

    #[test]
    fn test_align_one_minute_is_identity() {
        let reference = ts(14, 49);
        let boundary = align(reference, IntervalSpec::new(1).unwrap());
        assert_eq!(boundary.begin, reference);
        assert_eq!(boundary.end, reference);
    }

    #[test]
    fn test_align_15_minutes_at_14_49() {
        // The documented example: a 15-minute chart requested at 14:49
        // starts its last bucket at 14:45.
        let boundary = align(ts(14, 49), IntervalSpec::new(15).unwrap());
        assert_eq!(boundary.begin, ts(14, 45));
        assert_eq!(boundary.end, ts(14, 49));
    }

    #[test]
    fn test_align_30_and_60_minutes_at_14_49() {
        let boundary = align(ts(14, 49), IntervalSpec::new(30).unwrap());
        assert_eq!(boundary.begin, ts(14, 30));

        let boundary = align(ts(14, 49), IntervalSpec::new(60).unwrap());
        assert_eq!(boundary.begin, ts(14, 0));
    }

    #[test]
    fn test_align_multi_hour_snaps_from_midnight() {
        // 4-hour buckets start at 00, 04, 08, 12, 16, 20.
        let boundary = align(ts(14, 49), IntervalSpec::new(240).unwrap());
        assert_eq!(boundary.begin, ts(12, 0));

        // 12-hour buckets start at 00 and 12.
        let boundary = align(ts(14, 49), IntervalSpec::new(720).unwrap());
        assert_eq!(boundary.begin, ts(12, 0));

        let boundary = align(ts(3, 17), IntervalSpec::new(720).unwrap());
        assert_eq!(boundary.begin, ts(0, 0));
    }

    #[test]
    fn test_align_begin_sits_on_calendar_grid() {
        let reference = ts(14, 49);
        for &minutes in SUPPORTED_INTERVALS {
            let interval = IntervalSpec::new(minutes).unwrap();
            let boundary = align(reference, interval);
            let begin = DateTime::<Utc>::from_timestamp(boundary.begin, 0).unwrap();
            if minutes < 60 {
                assert_eq!(
                    begin.minute() % minutes,
                    0,
                    "begin minute not aligned for {minutes}m"
                );
            } else {
                assert_eq!(begin.minute(), 0, "begin minute not zero for {minutes}m");
                assert_eq!(
                    begin.hour() % (minutes / 60),
                    0,
                    "begin hour not aligned for {minutes}m"
                );
            }
        }
    }

    #[test]
    fn test_align_exactly_on_boundary() {
        // A reference already on the grid aligns to itself.
        let boundary = align(ts(14, 45), IntervalSpec::new(15).unwrap());
        assert_eq!(boundary.begin, ts(14, 45));
    }

    #[test]
    fn test_fetch_range_spans_depth_intervals() {
        let interval = IntervalSpec::new(15).unwrap();
        let boundary = align(ts(14, 49), interval);
        let range = fetch_range(boundary, interval, 50).unwrap();
        assert_eq!(range.begin, boundary.begin - 50 * 15 * 60);
        assert_eq!(range.end, boundary.end);
    }

    #[test]
    fn test_fetch_range_rejects_zero_depth() {
        let interval = IntervalSpec::new(5).unwrap();
        let boundary = align(ts(14, 49), interval);
        assert!(matches!(
            fetch_range(boundary, interval, 0),
            Err(EngineError::InvalidDepth(0))
        ));
    }
}
