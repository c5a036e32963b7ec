//! Right-closed, right-labelled bucket edges.
//!
//! A bar at `t` belongs to the bucket `(edge - width, edge]`, labelled with
//! `edge`. A bar exactly on an edge closes that bucket.
//!
//! - Minute and hour widths form a fixed-width grid in absolute time,
//!   anchored at local midnight of the day of the table's first bar. Every
//!   bucket spans exactly `width`, including across DST transitions, so after
//!   a clock change the edges may no longer sit on round local times.
//! - Day buckets follow the local calendar: the label is the next local
//!   midnight (or the bar itself when it is exactly midnight), so a DST day
//!   bucket spans 23 or 25 hours.
//! - A day edge on a repeated wall time takes the first of its instants that
//!   is not before the bar; an edge in a skipped hour shifts forward.

use chrono::{DateTime, Duration, LocalResult, NaiveTime, TimeZone, Timelike};
use chrono_tz::Tz;

use crate::{
    models::timeframe::{Timeframe, TimeframeUnit},
    pipeline::tz::{TzError, resolve_local},
};

/// Bucket edges of one timeframe for one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketGrid {
    tf: Timeframe,
    origin: DateTime<Tz>,
}

impl BucketGrid {
    /// Grid anchored at local midnight of `first`'s calendar day.
    pub fn new(first: &DateTime<Tz>, tf: Timeframe) -> Result<Self, TzError> {
        let midnight = first.naive_local().date().and_time(NaiveTime::MIN);
        let origin = resolve_local(midnight, first.timezone())?;
        Ok(Self { tf, origin })
    }

    pub fn origin(&self) -> DateTime<Tz> {
        self.origin
    }

    /// Label (right edge) of the bucket containing `ts`.
    pub fn end(&self, ts: &DateTime<Tz>) -> Result<DateTime<Tz>, TzError> {
        match self.tf.unit() {
            TimeframeUnit::Day => local_day_end(ts),
            TimeframeUnit::Minute | TimeframeUnit::Hour => Ok(self.fixed_end(ts)),
        }
    }

    /// Smallest `origin + k * width` at or after `ts`, at millisecond precision.
    fn fixed_end(&self, ts: &DateTime<Tz>) -> DateTime<Tz> {
        let width_ms = self.tf.secs() * 1000;
        let offset_ms = (*ts - self.origin).num_milliseconds();
        let mut k = offset_ms.div_euclid(width_ms);
        if offset_ms.rem_euclid(width_ms) != 0 {
            k += 1;
        }
        self.origin + Duration::milliseconds(k * width_ms)
    }
}

/// Next local midnight, or `ts` itself when it is exactly local midnight.
fn local_day_end(ts: &DateTime<Tz>) -> Result<DateTime<Tz>, TzError> {
    let local = ts.naive_local();
    let date = local.date();
    let edge = if local.time() == NaiveTime::MIN && local.nanosecond() == 0 {
        date.and_time(NaiveTime::MIN)
    } else {
        (date + Duration::days(1)).and_time(NaiveTime::MIN)
    };

    let tz = ts.timezone();
    match tz.from_local_datetime(&edge) {
        LocalResult::Ambiguous(earliest, _) if earliest >= *ts => Ok(earliest),
        LocalResult::Ambiguous(_, latest) => Ok(latest),
        _ => resolve_local(edge, tz),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use chrono_tz::America::New_York;

    use super::*;

    fn ny(d: u32, h: u32, m: u32) -> DateTime<Tz> {
        New_York.with_ymd_and_hms(2024, 10, d, h, m, 0).unwrap()
    }

    fn utc_ny(d: u32, h: u32, m: u32) -> DateTime<Tz> {
        Utc.with_ymd_and_hms(2024, 11, d, h, m, 0)
            .unwrap()
            .with_timezone(&New_York)
    }

    fn end(first: &DateTime<Tz>, tf: &str, ts: &DateTime<Tz>) -> DateTime<Tz> {
        BucketGrid::new(first, tf.parse().unwrap())
            .unwrap()
            .end(ts)
            .unwrap()
    }

    #[test]
    fn inside_a_bucket_rounds_up() {
        let first = ny(17, 9, 31);
        assert_eq!(end(&first, "5m", &ny(17, 9, 31)), ny(17, 9, 35));
        assert_eq!(end(&first, "5m", &ny(17, 9, 34)), ny(17, 9, 35));
    }

    #[test]
    fn on_the_edge_closes_the_bucket() {
        let first = ny(17, 0, 0);
        assert_eq!(end(&first, "5m", &ny(17, 9, 35)), ny(17, 9, 35));
        assert_eq!(end(&first, "5m", &ny(17, 0, 0)), ny(17, 0, 0));
    }

    #[test]
    fn sub_second_remainder_moves_to_next_edge() {
        let ts = ny(17, 9, 35) + Duration::milliseconds(1);
        assert_eq!(end(&ts, "1m", &ts), ny(17, 9, 36));
    }

    #[test]
    fn forty_five_minutes_from_midnight() {
        // edges: ..., 09:00, 09:45, 10:30, ...
        let first = ny(17, 9, 1);
        assert_eq!(end(&first, "45m", &ny(17, 9, 1)), ny(17, 9, 45));
        assert_eq!(end(&first, "45m", &ny(17, 9, 46)), ny(17, 10, 30));
    }

    #[test]
    fn grid_continues_across_days() {
        // 45m does not tile 24h into whole local hours, but 24h is 32 widths.
        let first = ny(17, 23, 50);
        assert_eq!(end(&first, "45m", &ny(18, 0, 10)), ny(18, 0, 45));
    }

    #[test]
    fn day_buckets_label_next_midnight() {
        let first = ny(17, 9, 30);
        assert_eq!(end(&first, "1d", &ny(17, 9, 30)), ny(18, 0, 0));
        assert_eq!(end(&first, "1d", &ny(17, 23, 59)), ny(18, 0, 0));
        assert_eq!(end(&first, "1d", &ny(18, 0, 0)), ny(18, 0, 0));
    }

    #[test]
    fn four_hour_edges() {
        let first = ny(17, 9, 30);
        assert_eq!(end(&first, "4h", &ny(17, 9, 30)), ny(17, 12, 0));
        assert_eq!(end(&first, "4h", &ny(17, 21, 0)), ny(18, 0, 0));
    }

    #[test]
    fn four_hour_buckets_stay_four_hours_across_fall_back() {
        // 2024-11-03 New York: origin is 00:00 EDT = 04:00Z.
        let first = utc_ny(3, 5, 30);
        let grid = BucketGrid::new(&first, "4h".parse().unwrap()).unwrap();
        assert_eq!(grid.origin(), utc_ny(3, 4, 0));

        assert_eq!(grid.end(&utc_ny(3, 5, 30)).unwrap(), utc_ny(3, 8, 0));
        assert_eq!(grid.end(&utc_ny(3, 7, 30)).unwrap(), utc_ny(3, 8, 0));
        assert_eq!(grid.end(&utc_ny(3, 8, 30)).unwrap(), utc_ny(3, 12, 0));
    }

    #[test]
    fn forty_five_minute_buckets_across_fall_back() {
        let first = utc_ny(3, 5, 30);
        let grid = BucketGrid::new(&first, "45m".parse().unwrap()).unwrap();

        assert_eq!(grid.end(&utc_ny(3, 5, 30)).unwrap(), utc_ny(3, 5, 30));
        assert_eq!(grid.end(&utc_ny(3, 7, 30)).unwrap(), utc_ny(3, 7, 45));
        assert_eq!(grid.end(&utc_ny(3, 8, 30)).unwrap(), utc_ny(3, 8, 30));
    }

    #[test]
    fn repeated_hour_keeps_both_passes_apart() {
        // 01:00..02:00 happens in EDT (05:xxZ) and again in EST (06:xxZ).
        let first = utc_ny(3, 5, 32);
        assert_eq!(end(&first, "5m", &utc_ny(3, 5, 32)), utc_ny(3, 5, 35));
        assert_eq!(end(&first, "5m", &utc_ny(3, 6, 32)), utc_ny(3, 6, 35));
    }

    #[test]
    fn day_bucket_on_fall_back_day_is_25_hours() {
        let first = utc_ny(3, 4, 30);
        let label = end(&first, "1d", &first);
        assert_eq!(label, utc_ny(4, 5, 0));
        assert_eq!(label - utc_ny(3, 4, 0), Duration::hours(25));
    }

    #[test]
    fn spring_forward_keeps_fixed_width() {
        // 2024-03-10: origin 00:00 EST = 05:00Z; 1h edges stay one real hour apart.
        let first = New_York.with_ymd_and_hms(2024, 3, 10, 1, 59, 0).unwrap();
        let label = end(&first, "1h", &first);
        assert_eq!(label.format("%H:%M %Z").to_string(), "03:00 EDT");
        assert_eq!(label - first, Duration::minutes(1));
    }
}
