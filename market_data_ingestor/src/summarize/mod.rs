//! Optional natural-language commentary on the latest bars.
//!
//! A summarizer never fails the run: every problem is folded into
//! [`SummaryOutcome::Failed`] so callers can log it and move on, and tests
//! can assert on it.

pub mod openai;

use async_trait::async_trait;

use crate::{io::csv_sink::format_float, models::bar::Bar};

/// Result of one summarization attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    Summary(String),
    Failed(String),
}

impl SummaryOutcome {
    pub fn is_summary(&self) -> bool {
        matches!(self, SummaryOutcome::Summary(_))
    }
}

#[async_trait]
pub trait Summarizer {
    /// Summarize `bars` (oldest first) for `symbol`.
    async fn summarize(&self, symbol: &str, bars: &[Bar]) -> SummaryOutcome;
}

/// The analyst prompt: instructions followed by one line per bar.
pub fn build_prompt(symbol: &str, bars: &[Bar]) -> String {
    let mut prompt = format!(
        "You are a market analyst. Using only the OHLCV data provided below, \
         summarize the recent price action for {symbol} in one or two sentences. \
         Do not request additional data.\n"
    );
    for bar in bars {
        prompt.push_str(&format!(
            "{} open={} high={} low={} close={} volume={}\n",
            bar.timestamp.format("%Y-%m-%d %H:%M:%S%:z"),
            format_float(bar.open),
            format_float(bar.high),
            format_float(bar.low),
            format_float(bar.close),
            format_float(bar.volume),
        ));
    }
    prompt
}
