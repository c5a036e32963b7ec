//! Canonical in-memory representation of a time-series bar (OHLCV).
//!
//! Providers hand back [`RawBar`]s (epoch-millisecond timestamps, provider
//! order, possibly duplicated); the normalizer turns them into zoned [`Bar`]s
//! collected in a [`BarTable`](crate::models::bar_table::BarTable).

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// A single time-series bar (OHLCV) for a given timestamp.
///
/// The OHLC relationship (`low <= open, close <= high`) is expected of
/// upstream data but never enforced.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    /// The timestamp for this bar, in the exchange's local time zone.
    pub timestamp: DateTime<Tz>,

    /// Opening price.
    pub open: f64,

    /// Highest price during the bar interval.
    pub high: f64,

    /// Lowest price during the bar interval.
    pub low: f64,

    /// Closing price.
    pub close: f64,

    /// Volume traded during the bar interval.
    pub volume: f64,
}

/// A bar record as decoded from a provider, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBar {
    /// Bar start as milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl RawBar {
    /// The record's timestamp as a UTC instant, or `None` when it is out of
    /// chrono's representable range.
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp_ms).single()
    }
}

impl From<&Bar> for RawBar {
    fn from(bar: &Bar) -> Self {
        RawBar {
            timestamp_ms: bar.timestamp.timestamp_millis(),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }
}
