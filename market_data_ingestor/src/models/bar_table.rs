//! An ordered, timestamp-keyed sequence of bars.

use chrono::DateTime;
use chrono_tz::Tz;
use thiserror::Error;

use crate::models::bar::Bar;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    /// Bars must be strictly ascending by timestamp (which also makes them unique).
    #[error("bar {index} at {timestamp} is not after its predecessor")]
    OutOfOrder { index: usize, timestamp: String },

    /// All bars in a table share one time zone.
    #[error("bar {index} uses time zone {found}, expected {expected}")]
    MixedTimeZones {
        index: usize,
        expected: String,
        found: String,
    },
}

/// Bars keyed by `timestamp`, strictly ascending, all in one time zone.
///
/// A table is never mutated once built: each pipeline stage produces a new
/// one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BarTable {
    bars: Vec<Bar>,
}

impl BarTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from bars that are already sorted and unique.
    pub fn try_from_bars(bars: Vec<Bar>) -> Result<Self, TableError> {
        if let Some(first) = bars.first() {
            let tz = first.timestamp.timezone();
            for (index, pair) in bars.windows(2).enumerate() {
                let (prev, next) = (&pair[0], &pair[1]);
                if next.timestamp.timezone() != tz {
                    return Err(TableError::MixedTimeZones {
                        index: index + 1,
                        expected: tz.name().to_string(),
                        found: next.timestamp.timezone().name().to_string(),
                    });
                }
                if next.timestamp <= prev.timestamp {
                    return Err(TableError::OutOfOrder {
                        index: index + 1,
                        timestamp: next.timestamp.to_rfc3339(),
                    });
                }
            }
        }
        Ok(Self { bars })
    }

    /// Callers guarantee ascending, unique timestamps in a single zone.
    pub(crate) fn from_sorted_unchecked(bars: Vec<Bar>) -> Self {
        debug_assert!(bars.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        Self { bars }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Time zone of the table's timestamps; `None` for an empty table.
    pub fn tz(&self) -> Option<Tz> {
        self.bars.first().map(|b| b.timestamp.timezone())
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Tz>> {
        self.bars.first().map(|b| b.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Tz>> {
        self.bars.last().map(|b| b.timestamp)
    }

    /// The most recent `n` bars, oldest first.
    pub fn tail(&self, n: usize) -> &[Bar] {
        &self.bars[self.bars.len().saturating_sub(n)..]
    }

    pub fn total_volume(&self) -> f64 {
        self.bars.iter().map(|b| b.volume).sum()
    }
}

impl<'a> IntoIterator for &'a BarTable {
    type Item = &'a Bar;
    type IntoIter = std::slice::Iter<'a, Bar>;

    fn into_iter(self) -> Self::IntoIter {
        self.bars.iter()
    }
}
