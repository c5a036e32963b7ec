//! Aggregate a fine-grained [`BarTable`] into coarser buckets.
//!
//! Each non-empty bucket becomes one bar labelled with the bucket's right
//! edge (see [`bucket`](crate::pipeline::bucket)):
//!
//! | column | reducer                          |
//! |--------|----------------------------------|
//! | open   | first bar's open                 |
//! | high   | max                              |
//! | low    | min                              |
//! | close  | last bar's close                 |
//! | volume | sum                              |
//!
//! Buckets without input rows are not emitted; gaps in trading stay gaps.

use std::collections::BTreeMap;

use chrono::DateTime;
use chrono_tz::Tz;

use crate::{
    models::{
        bar::Bar,
        bar_series::BarSeries,
        bar_table::BarTable,
        timeframe::{Timeframe, TimeframeSpec},
    },
    pipeline::{bucket::BucketGrid, tz::TzError},
};

/// Resample `table` into `tf`-wide buckets.
///
/// The bucket grid is anchored at local midnight of the first bar's day.
/// Bars are folded in timestamp order, so `open`/`close` are the first/last
/// contributions of each bucket.
pub fn resample(table: &BarTable, tf: Timeframe) -> Result<BarTable, TzError> {
    let Some(first) = table.first_timestamp() else {
        return Ok(BarTable::empty());
    };
    let grid = BucketGrid::new(&first, tf)?;
    let mut buckets: BTreeMap<DateTime<Tz>, Bar> = BTreeMap::new();

    for bar in table {
        let label = grid.end(&bar.timestamp)?;
        buckets
            .entry(label)
            .and_modify(|agg| {
                agg.high = agg.high.max(bar.high);
                agg.low = agg.low.min(bar.low);
                agg.close = bar.close;
                agg.volume += bar.volume;
            })
            .or_insert_with(|| Bar {
                timestamp: label,
                ..bar.clone()
            });
    }

    Ok(BarTable::from_sorted_unchecked(buckets.into_values().collect()))
}

/// Resample `base` once per configured timeframe, keeping their order.
pub fn resample_all(
    symbol: &str,
    base: &BarTable,
    specs: &[TimeframeSpec],
) -> Result<Vec<BarSeries>, TzError> {
    specs
        .iter()
        .map(|spec| {
            resample(base, spec.timeframe).map(|table| BarSeries::new(symbol, &spec.label, table))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use chrono_tz::America::New_York;

    use super::*;
    use crate::{
        models::{bar::RawBar, timeframe::default_timeframes},
        pipeline::normalize::normalize,
    };

    fn minute_bars(start: DateTime<Utc>, rows: &[(i64, f64, f64, f64, f64, f64)]) -> BarTable {
        let records = rows
            .iter()
            .map(|&(offset, open, high, low, close, volume)| RawBar {
                timestamp_ms: (start + Duration::minutes(offset)).timestamp_millis(),
                open,
                high,
                low,
                close,
                volume,
            })
            .collect();
        normalize(records, New_York)
    }

    // 09:31..09:35 New York
    fn five_bars() -> BarTable {
        let start = Utc.with_ymd_and_hms(2024, 10, 17, 13, 31, 0).unwrap();
        minute_bars(
            start,
            &[
                (0, 10.0, 10.5, 9.8, 10.2, 100.0),
                (1, 11.0, 11.5, 10.8, 10.8, 200.0),
                (2, 9.0, 9.5, 8.8, 9.2, 150.0),
                (3, 12.0, 12.5, 11.8, 12.3, 300.0),
                (4, 13.0, 13.5, 12.8, 13.1, 250.0),
            ],
        )
    }

    #[test]
    fn five_minutes_into_one_bucket() {
        let out = resample(&five_bars(), "5m".parse().unwrap()).unwrap();
        assert_eq!(out.len(), 1);
        let bar = &out.bars()[0];
        assert_eq!(
            bar.timestamp,
            New_York.with_ymd_and_hms(2024, 10, 17, 9, 35, 0).unwrap()
        );
        assert_eq!(bar.open, 10.0);
        assert_eq!(bar.high, 13.5);
        assert_eq!(bar.low, 8.8);
        assert_eq!(bar.close, 13.1);
        assert_eq!(bar.volume, 1000.0);
    }

    #[test]
    fn gaps_do_not_produce_rows() {
        // 09:31, 09:32, then nothing until 09:46: buckets 09:35 and 09:50 only.
        let start = Utc.with_ymd_and_hms(2024, 10, 17, 13, 31, 0).unwrap();
        let table = minute_bars(
            start,
            &[
                (0, 1.0, 2.0, 0.5, 1.5, 10.0),
                (1, 1.5, 2.5, 1.0, 2.0, 20.0),
                (15, 3.0, 3.5, 2.5, 3.2, 30.0),
            ],
        );
        let out = resample(&table, "5m".parse().unwrap()).unwrap();
        let labels: Vec<String> = out
            .bars()
            .iter()
            .map(|b| b.timestamp.format("%H:%M").to_string())
            .collect();
        assert_eq!(labels, ["09:35", "09:50"]);
        assert_eq!(out.bars()[0].volume, 30.0);
        assert_eq!(out.bars()[1].open, 3.0);
    }

    #[test]
    fn edge_bar_closes_its_bucket() {
        // 09:35 belongs to (09:30, 09:35]; 09:36 opens the next bucket.
        let start = Utc.with_ymd_and_hms(2024, 10, 17, 13, 35, 0).unwrap();
        let table = minute_bars(
            start,
            &[(0, 1.0, 1.0, 1.0, 1.0, 1.0), (1, 2.0, 2.0, 2.0, 2.0, 2.0)],
        );
        let out = resample(&table, "5m".parse().unwrap()).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.bars()[0].close, 1.0);
        assert_eq!(out.bars()[1].open, 2.0);
    }

    #[test]
    fn fall_back_day_keeps_four_hour_buckets() {
        // 2024-11-03 New York, bars at 05:30Z, 07:30Z and 08:30Z.
        let table = normalize(
            [5 * 60 + 30, 7 * 60 + 30, 8 * 60 + 30]
                .into_iter()
                .map(|minute_of_day: i64| RawBar {
                    timestamp_ms: (Utc.with_ymd_and_hms(2024, 11, 3, 0, 0, 0).unwrap()
                        + Duration::minutes(minute_of_day))
                    .timestamp_millis(),
                    open: 1.0,
                    high: 1.0,
                    low: 1.0,
                    close: 1.0,
                    volume: 1.0,
                })
                .collect(),
            New_York,
        );

        let four_hours = resample(&table, "4h".parse().unwrap()).unwrap();
        let rows: Vec<(String, f64)> = four_hours
            .bars()
            .iter()
            .map(|b| (b.timestamp.with_timezone(&Utc).format("%H:%M").to_string(), b.volume))
            .collect();
        assert_eq!(rows, [("08:00".to_string(), 2.0), ("12:00".to_string(), 1.0)]);

        let forty_five = resample(&table, "45m".parse().unwrap()).unwrap();
        let labels: Vec<String> = forty_five
            .bars()
            .iter()
            .map(|b| b.timestamp.with_timezone(&Utc).format("%H:%M").to_string())
            .collect();
        assert_eq!(labels, ["05:30", "07:45", "08:30"]);
    }

    #[test]
    fn empty_in_empty_out() {
        let out = resample(&BarTable::empty(), "1h".parse().unwrap()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn resample_all_keeps_configured_order() {
        let series = resample_all("SPY", &five_bars(), &default_timeframes()).unwrap();
        let labels: Vec<&str> = series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["3m", "5m", "15m", "30m", "45m", "1h", "4h", "1d"]);
        assert!(series.iter().all(|s| s.symbol == "SPY"));
        // 09:31..09:35 with 3m edges at 09:33 and 09:36
        assert_eq!(series[0].table.len(), 2);
        for s in &series {
            assert_eq!(s.table.total_volume(), 1000.0, "{}", s.label);
        }
    }
}
