use chrono::{DateTime, NaiveDate, Utc};

use crate::models::timeframe::Timeframe;

/// Parameters for requesting bars of a single symbol from a market data provider.
///
/// The range is expressed as instants; providers that only accept calendar
/// dates use the UTC dates of `start` and `end`, so the response may cover
/// more than the requested instants and callers trim afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct BarsRequestParams {
    /// Ticker to request (e.g., `"SPY"`).
    pub symbol: String,

    /// The time interval for each bar. Validation of allowed values is performed
    /// by each data provider implementation.
    pub timeframe: Timeframe,

    /// Start of the requested time range (inclusive, UTC).
    pub start: DateTime<Utc>,

    /// End of the requested time range (UTC).
    pub end: DateTime<Utc>,
}

impl BarsRequestParams {
    pub fn start_date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end.date_naive()
    }
}
