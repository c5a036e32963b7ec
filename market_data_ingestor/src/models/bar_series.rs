//! A bar table tagged with the symbol and timeframe label it belongs to.

use crate::models::bar_table::BarTable;

/// Represents a complete set of time-series data for a single symbol at one
/// resolution.
///
/// The `label` is the configured timeframe name (e.g. `"1m"`, `"4h"`) and is
/// what sinks use to name their output.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    /// The symbol this data represents (e.g., "SPY", "QQQ").
    pub symbol: String,
    /// Timeframe label of the table.
    pub label: String,
    /// The collection of OHLCV bars.
    pub table: BarTable,
}

impl BarSeries {
    pub fn new(symbol: impl Into<String>, label: impl Into<String>, table: BarTable) -> Self {
        Self {
            symbol: symbol.into(),
            label: label.into(),
            table,
        }
    }
}
