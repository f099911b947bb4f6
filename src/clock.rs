//! Reference-time resolution
//!
//! "Now" for a chart request is the end of the latest fully-elapsed
//! minute. The latest stored tick is the preferred source; an external
//! HTTP time-sync service is the fallback when the store is empty or
//! unreachable. Both failing means the request cannot proceed.

use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::store::TickStore;

/// Payload of the time-sync endpoint: current time in epoch millis.
#[derive(Debug, Deserialize)]
struct TimeSyncResponse {
    time: i64,
}

/// Blocking client for an HTTP time-sync endpoint.
#[derive(Debug)]
pub struct TimeSyncClient {
    client: reqwest::blocking::Client,
    url: String,
}

impl TimeSyncClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> EngineResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::TimeUnavailable(e.to_string()))?;

        Ok(TimeSyncClient {
            client,
            url: url.into(),
        })
    }

    /// Timestamp of the start of the previous whole minute, per the
    /// remote clock.
    ///
    /// The just-started current minute is not yet a complete bar, so
    /// the service time is floored to the minute and pushed back 60
    /// seconds. Network errors, non-2xx statuses, and malformed bodies
    /// all surface as `TimeUnavailable`.
    pub fn previous_minute(&self) -> EngineResult<i64> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| EngineError::TimeUnavailable(e.to_string()))?;

        let payload: TimeSyncResponse = response
            .json()
            .map_err(|e| EngineError::TimeUnavailable(e.to_string()))?;

        let ts = previous_minute_from_millis(payload.time);
        debug!("Time service reference: {}", ts);
        Ok(ts)
    }
}

/// Floor epoch millis to the minute and step back one whole minute.
fn previous_minute_from_millis(millis: i64) -> i64 {
    let seconds = millis / 1000;
    seconds - seconds.rem_euclid(60) - 60
}

/// Resolve the reference timestamp for `table`.
///
/// Prefers the store's freshest tick; falls back to the time service.
/// Store errors are logged and treated like an empty store, since the
/// fallback can still answer.
pub fn resolve_reference_time(
    store: &TickStore,
    table: &str,
    time_sync: &TimeSyncClient,
) -> EngineResult<i64> {
    match store.latest_timestamp(table) {
        Ok(Some(ts)) => {
            debug!("Reference time from store ({}): {}", table, ts);
            return Ok(ts);
        }
        Ok(None) => debug!("No ticks in table '{}', falling back to time service", table),
        Err(e) => warn!("Store lookup failed for '{}': {}, falling back to time service", table, e),
    }

    time_sync.previous_minute()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_previous_minute_truncates_and_steps_back() {
        // 14:49:23.512 -> 14:48:00
        let millis = (14 * 3600 + 49 * 60 + 23) * 1000 + 512;
        assert_eq!(
            previous_minute_from_millis(millis),
            14 * 3600 + 48 * 60
        );
    }

    #[test]
    fn test_previous_minute_on_exact_minute() {
        // 14:49:00.000 -> 14:48:00: the just-started minute is not a
        // complete bar yet.
        let millis = (14 * 3600 + 49 * 60) * 1000;
        assert_eq!(
            previous_minute_from_millis(millis),
            14 * 3600 + 48 * 60
        );
    }

    #[test]
    fn test_time_sync_payload_shape() {
        let payload: TimeSyncResponse =
            serde_json::from_str(r#"{"time":1700000123456,"clocks":{}}"#).unwrap();
        assert_eq!(payload.time, 1_700_000_123_456);
    }

    #[test]
    fn test_malformed_payload_rejected() {
        assert!(serde_json::from_str::<TimeSyncResponse>(r#"{"clock":"soon"}"#).is_err());
    }
}
