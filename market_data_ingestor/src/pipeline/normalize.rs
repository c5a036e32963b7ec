//! Raw provider records -> canonical [`BarTable`].
//!
//! Steps: convert epoch milliseconds into the target zone, stable-sort by
//! timestamp, then drop duplicate timestamps keeping the first record of each
//! run. Because the sort is stable, "first" means first in provider order,
//! which for paginated fetches is the earlier page.

use chrono_tz::Tz;
use tracing::debug;

use crate::models::{
    bar::{Bar, RawBar},
    bar_table::BarTable,
};

/// Normalize provider records into a table in `tz`.
///
/// Records whose timestamp cannot be represented are dropped; empty input
/// yields an empty table.
pub fn normalize(records: Vec<RawBar>, tz: Tz) -> BarTable {
    let total = records.len();
    let mut bars: Vec<Bar> = records
        .into_iter()
        .filter_map(|r| {
            let timestamp = r.timestamp_utc()?.with_timezone(&tz);
            Some(Bar {
                timestamp,
                open: r.open,
                high: r.high,
                low: r.low,
                close: r.close,
                volume: r.volume,
            })
        })
        .collect();
    let representable = bars.len();

    bars.sort_by_key(|b| b.timestamp);
    bars.dedup_by_key(|b| b.timestamp);

    if bars.len() != total {
        debug!(
            total,
            dropped_unrepresentable = total - representable,
            dropped_duplicates = representable - bars.len(),
            "normalized bar records"
        );
    }
    BarTable::from_sorted_unchecked(bars)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    use super::*;

    const T0: i64 = 1_729_171_860_000; // 2024-10-17T13:31:00Z

    fn raw(ts: i64, close: f64) -> RawBar {
        RawBar {
            timestamp_ms: ts,
            open: close,
            high: close,
            low: close,
            close,
            volume: 10.0,
        }
    }

    #[test]
    fn converts_to_target_zone() {
        let table = normalize(vec![raw(T0, 1.0)], New_York);
        let want = New_York.with_ymd_and_hms(2024, 10, 17, 9, 31, 0).unwrap();
        assert_eq!(table.bars()[0].timestamp, want);
        assert_eq!(table.tz(), Some(New_York));
        assert_eq!(
            table.bars()[0].timestamp.to_rfc3339(),
            "2024-10-17T09:31:00-04:00"
        );
    }

    #[test]
    fn sorts_unordered_input() {
        let table = normalize(
            vec![raw(T0 + 120_000, 3.0), raw(T0, 1.0), raw(T0 + 60_000, 2.0)],
            New_York,
        );
        let closes: Vec<f64> = table.bars().iter().map(|b| b.close).collect();
        assert_eq!(closes, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn duplicate_timestamps_keep_first_occurrence() {
        let table = normalize(
            vec![raw(T0 + 60_000, 2.0), raw(T0, 1.0), raw(T0 + 60_000, 9.0)],
            New_York,
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.bars()[1].close, 2.0);
    }

    #[test]
    fn empty_input_is_empty_table() {
        let table = normalize(Vec::new(), New_York);
        assert!(table.is_empty());
        assert_eq!(table.tz(), None);
    }

    #[test]
    fn unrepresentable_timestamps_are_dropped() {
        let table = normalize(vec![raw(i64::MAX, 1.0), raw(T0, 2.0)], New_York);
        assert_eq!(table.len(), 1);
        assert_eq!(table.bars()[0].close, 2.0);
    }
}
