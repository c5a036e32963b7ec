//! Time zone parsing and local wall-clock resolution.
//!
//! Resampling works on the local wall clock of the data (buckets start at
//! local midnight), so bucket edges are computed as naive local times and then
//! mapped back to real instants with [`resolve_local`]:
//!
//! - Ambiguous local times ("fall back", a wall time occurs twice) resolve to
//!   the earlier instant.
//! - Nonexistent local times ("spring forward", a wall time is skipped) shift
//!   forward minute by minute to the first valid instant, capped at 2 hours.
//!
//! Examples (America/New_York):
//! - 2024-03-10 02:30 does not exist -> 03:00 EDT (07:00Z)
//! - 2024-11-03 01:30 occurs twice -> 01:30 EDT (05:30Z)

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TzError {
    #[error("unknown time zone: {0}")]
    UnknownZone(String),

    #[error("local time {0} does not exist in {1}")]
    Nonexistent(NaiveDateTime, Tz),
}

/// Parse an IANA time zone name (e.g. `"America/New_York"`).
pub fn parse_tz(name: &str) -> Result<Tz, TzError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| TzError::UnknownZone(name.to_string()))
}

/// Map a naive local timestamp to an instant in `tz`.
///
/// See the module docs for the DST rules.
pub fn resolve_local(naive: NaiveDateTime, tz: Tz) -> Result<DateTime<Tz>, TzError> {
    use chrono::offset::LocalResult::*;
    match tz.from_local_datetime(&naive) {
        Single(dt) => Ok(dt),
        Ambiguous(earliest, _) => Ok(earliest),
        None => {
            let mut t = naive;
            for _ in 0..120 {
                t += Duration::minutes(1);
                match tz.from_local_datetime(&t) {
                    Single(dt) | Ambiguous(dt, _) => return Ok(dt),
                    None => {}
                }
            }
            Err(TzError::Nonexistent(naive, tz))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use chrono_tz::America::New_York;

    use super::*;

    fn naive(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn parses_iana_names() {
        assert_eq!(parse_tz("America/New_York").unwrap(), New_York);
        assert_eq!(parse_tz(" UTC ").unwrap(), Tz::UTC);
        assert!(matches!(parse_tz("Mars/Olympus"), Err(TzError::UnknownZone(_))));
    }

    #[test]
    fn ny_valid_conversion_est() {
        // A normal EST time (winter): 2024-01-15 09:30 local -> 14:30Z
        let got = resolve_local(naive(2024, 1, 15, 9, 30), New_York).unwrap();
        let want = Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 0).unwrap();
        assert_eq!(got, want);
    }

    #[test]
    fn ny_spring_forward_gap_shifts_to_3am() {
        // 02:30 local does not exist; it lands at 03:00 local,
        // which is 07:00Z once DST (-04:00) begins.
        let got = resolve_local(naive(2024, 3, 10, 2, 30), New_York).unwrap();
        let want = Utc.with_ymd_and_hms(2024, 3, 10, 7, 0, 0).unwrap();
        assert_eq!(got, want);
    }

    #[test]
    fn ny_fall_back_prefers_earliest() {
        // 2024-11-03 01:30 occurs twice:
        // - 01:30 EDT (UTC-4)  -> 05:30Z  (earlier instant)
        // - 01:30 EST (UTC-5)  -> 06:30Z
        let got = resolve_local(naive(2024, 11, 3, 1, 30), New_York).unwrap();
        let want = Utc.with_ymd_and_hms(2024, 11, 3, 5, 30, 0).unwrap();
        assert_eq!(got, want);
    }
}
