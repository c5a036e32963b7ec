//! Bar intervals and the named resampling targets built from them.
//!
//! A [`Timeframe`] pairs a non-zero amount with a [`TimeframeUnit`]. Widths are
//! always fixed-length (minutes, hours, whole days) so bucket edges can be
//! computed with plain arithmetic from local midnight.
//!
//! ```
//! use market_data_ingestor::models::timeframe::{Timeframe, TimeframeUnit};
//!
//! let tf: Timeframe = "45m".parse().unwrap();
//! assert_eq!(tf.amount().get(), 45);
//! assert_eq!(tf.unit(), TimeframeUnit::Minute);
//! assert_eq!(tf.to_string(), "45m");
//! ```

use std::{fmt, num::NonZeroU32, str::FromStr};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SECS_PER_MINUTE: i64 = 60;
const SECS_PER_HOUR: i64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: i64 = 24 * SECS_PER_HOUR;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeframeError {
    #[error("Invalid amount for {unit:?}: {message}")]
    InvalidAmount {
        unit: TimeframeUnit,
        message: String,
    },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

/// Timeframe granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeframeUnit {
    Minute,
    Hour,
    Day,
}

impl TimeframeUnit {
    /// Path segment used by aggregate-bar REST APIs (`minute`, `hour`, `day`).
    pub fn as_api_str(&self) -> &'static str {
        match self {
            TimeframeUnit::Minute => "minute",
            TimeframeUnit::Hour => "hour",
            TimeframeUnit::Day => "day",
        }
    }

    const fn secs(&self) -> i64 {
        match self {
            TimeframeUnit::Minute => SECS_PER_MINUTE,
            TimeframeUnit::Hour => SECS_PER_HOUR,
            TimeframeUnit::Day => SECS_PER_DAY,
        }
    }
}

/// A timeframe = amount × unit (e.g., 5-Minute, 4-Hour, 1-Day).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timeframe {
    amount: NonZeroU32,
    unit: TimeframeUnit,
}

impl Timeframe {
    pub const ONE_MINUTE: Timeframe = Timeframe::new(NonZeroU32::MIN, TimeframeUnit::Minute);

    pub const fn new(amount: NonZeroU32, unit: TimeframeUnit) -> Self {
        Self { amount, unit }
    }

    /// Build a timeframe that can be used as a resampling bucket.
    ///
    /// Buckets are anchored at local midnight, so the width has to tile a day
    /// exactly: minute and hour widths must divide 24h, and day widths are
    /// limited to a single day.
    pub fn bucket(amount: u32, unit: TimeframeUnit) -> Result<Self, TimeframeError> {
        let amount = NonZeroU32::new(amount).ok_or_else(|| TimeframeError::InvalidAmount {
            unit,
            message: "amount must be > 0".into(),
        })?;
        let tf = Self::new(amount, unit);
        match unit {
            TimeframeUnit::Day if amount.get() != 1 => Err(TimeframeError::InvalidAmount {
                unit,
                message: "Day units can only be used with amount 1".into(),
            }),
            TimeframeUnit::Minute | TimeframeUnit::Hour if SECS_PER_DAY % tf.secs() != 0 => {
                Err(TimeframeError::InvalidAmount {
                    unit,
                    message: format!("{tf} does not divide a day evenly"),
                })
            }
            _ => Ok(tf),
        }
    }

    pub const fn amount(&self) -> NonZeroU32 {
        self.amount
    }

    pub const fn unit(&self) -> TimeframeUnit {
        self.unit
    }

    /// Width of the timeframe in seconds.
    pub const fn secs(&self) -> i64 {
        self.amount.get() as i64 * self.unit.secs()
    }

    pub fn duration(&self) -> Duration {
        Duration::seconds(self.secs())
    }
}

/// Display/parse for config and CLI ergonomics (`"5m"`, `"4h"`, `"1d"`).
impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let u = match self.unit {
            TimeframeUnit::Minute => "m",
            TimeframeUnit::Hour => "h",
            TimeframeUnit::Day => "d",
        };
        write!(f, "{}{u}", self.amount)
    }
}

impl FromStr for Timeframe {
    type Err = TimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || TimeframeError::InvalidInput {
            message: format!("expected <amount><m|h|d>, got {s:?}"),
        };
        if s.len() < 2 || !s.is_ascii() {
            return Err(invalid());
        }
        let (digits, unit) = s.split_at(s.len() - 1);
        let amount: u32 = digits.parse().map_err(|_| invalid())?;
        let unit = match unit {
            "m" => TimeframeUnit::Minute,
            "h" => TimeframeUnit::Hour,
            "d" | "D" => TimeframeUnit::Day,
            _ => return Err(invalid()),
        };
        Timeframe::bucket(amount, unit)
    }
}

impl TryFrom<String> for Timeframe {
    type Error = TimeframeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timeframe> for String {
    fn from(tf: Timeframe) -> Self {
        tf.to_string()
    }
}

/// A named resampling target: the label ends up in the output file name
/// (`SPY_4h.csv`), the timeframe drives the bucketing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeframeSpec {
    pub label: String,
    pub timeframe: Timeframe,
}

impl TimeframeSpec {
    pub fn new(label: impl Into<String>, timeframe: Timeframe) -> Self {
        Self {
            label: label.into(),
            timeframe,
        }
    }
}

/// The eight derived resolutions written next to the 1-minute base file.
pub fn default_timeframes() -> Vec<TimeframeSpec> {
    [
        ("3m", 3, TimeframeUnit::Minute),
        ("5m", 5, TimeframeUnit::Minute),
        ("15m", 15, TimeframeUnit::Minute),
        ("30m", 30, TimeframeUnit::Minute),
        ("45m", 45, TimeframeUnit::Minute),
        ("1h", 60, TimeframeUnit::Minute),
        ("4h", 240, TimeframeUnit::Minute),
        ("1d", 1, TimeframeUnit::Day),
    ]
    .into_iter()
    .filter_map(|(label, amount, unit)| {
        Timeframe::bucket(amount, unit)
            .ok()
            .map(|tf| TimeframeSpec::new(label, tf))
    })
    .collect()
}
