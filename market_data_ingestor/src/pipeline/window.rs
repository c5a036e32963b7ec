//! Trailing time windows and the filter that applies them.

use std::num::NonZeroU32;

use chrono::{DateTime, Duration, Utc};

use crate::models::bar_table::BarTable;

/// `[start, end)` in UTC, where `end` is the wall-clock time the window was
/// computed at. Only `start` is used to filter; `end` bounds the fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// The `minutes`-long window ending at `now`.
    pub fn trailing(minutes: NonZeroU32, now: DateTime<Utc>) -> Self {
        Self {
            start: now - Duration::minutes(minutes.get() as i64),
            end: now,
        }
    }

    /// The `minutes`-long window ending at the current wall-clock time.
    pub fn ending_now(minutes: NonZeroU32) -> Self {
        Self::trailing(minutes, Utc::now())
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Keep the rows with `timestamp >= window.start`, comparing in the table's
/// own time zone. An empty table has no zone and comes back empty.
pub fn select_window(table: &BarTable, window: &TimeWindow) -> BarTable {
    let Some(tz) = table.tz() else {
        return BarTable::empty();
    };
    let start_local = window.start.with_timezone(&tz);

    // Rows are ascending, so everything from the first match on is kept.
    let from = table.bars().partition_point(|b| b.timestamp < start_local);
    BarTable::from_sorted_unchecked(table.bars()[from..].to_vec())
}
