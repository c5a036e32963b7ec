//! One ingestion run: fetch -> normalize -> window -> resample -> write, per
//! symbol, strictly in sequence.
//!
//! Collaborators (provider, sink, summarizer) are built once by the caller and
//! passed in by reference; nothing here reaches for globals or the
//! environment.
//!
//! Failure policy:
//! - a provider or sink error fails only the symbol it happened on;
//! - an empty fetch or an empty window is a skip, not a failure;
//! - summarization runs after the symbol's files are written and can only
//!   produce a [`SummaryOutcome`], never an error.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use crate::{
    config::IngestConfig,
    errors::IngestError,
    io::{csv_sink::CsvSink, sink::DataSink},
    models::{
        bar_series::BarSeries,
        bar_table::BarTable,
        request_params::BarsRequestParams,
        spot::CryptoAsset,
        timeframe::Timeframe,
    },
    pipeline::{TimeWindow, normalize, resample_all, select_window, tz::TzError},
    providers::{DataProvider, SpotPriceProvider},
    summarize::{SummaryOutcome, Summarizer},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The provider returned zero rows for the requested range.
    NoData,
    /// Rows came back but none fall inside the trailing window.
    EmptyWindow,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolOutcome {
    Written {
        /// Base file first, then one file per configured timeframe.
        files: Vec<PathBuf>,
        /// Rows in the windowed base table.
        rows: usize,
    },
    Skipped(SkipReason),
}

#[derive(Debug)]
pub struct SymbolReport {
    pub symbol: String,
    pub result: Result<SymbolOutcome, IngestError>,
    /// `None` when summarization is disabled or nothing was written.
    pub summary: Option<SummaryOutcome>,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub symbols: Vec<SymbolReport>,
}

impl RunReport {
    pub fn written(&self) -> usize {
        self.count(|r| matches!(r, Ok(SymbolOutcome::Written { .. })))
    }

    pub fn skipped(&self) -> usize {
        self.count(|r| matches!(r, Ok(SymbolOutcome::Skipped(_))))
    }

    pub fn failed(&self) -> usize {
        self.count(|r| r.is_err())
    }

    fn count(&self, pred: impl Fn(&Result<SymbolOutcome, IngestError>) -> bool) -> usize {
        self.symbols.iter().filter(|s| pred(&s.result)).count()
    }
}

pub struct Ingestor<'a, S> {
    provider: &'a (dyn DataProvider + Send + Sync),
    sink: &'a S,
    summarizer: Option<&'a (dyn Summarizer + Send + Sync)>,
    config: &'a IngestConfig,
}

impl<'a, S> Ingestor<'a, S>
where
    S: DataSink<Output = Vec<PathBuf>> + Sync,
{
    pub fn new(
        provider: &'a (dyn DataProvider + Send + Sync),
        sink: &'a S,
        config: &'a IngestConfig,
    ) -> Self {
        Self {
            provider,
            sink,
            summarizer: None,
            config,
        }
    }

    pub fn with_summarizer(mut self, summarizer: &'a (dyn Summarizer + Send + Sync)) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// The configured trailing window ending at `now`.
    pub fn window(&self, now: DateTime<Utc>) -> TimeWindow {
        TimeWindow::trailing(self.config.window_minutes, now)
    }

    /// Process every configured symbol.
    pub async fn run_bars(&self, window: &TimeWindow) -> RunReport {
        self.run_symbols(&self.config.symbols, window).await
    }

    /// Process `symbols` in order; one symbol's failure never stops the next.
    pub async fn run_symbols(&self, symbols: &[String], window: &TimeWindow) -> RunReport {
        let mut report = RunReport::default();
        for symbol in symbols {
            report.symbols.push(self.process_symbol(symbol, window).await);
        }
        info!(
            written = report.written(),
            skipped = report.skipped(),
            failed = report.failed(),
            "bar run finished"
        );
        report
    }

    #[instrument(skip(self, window))]
    pub async fn process_symbol(&self, symbol: &str, window: &TimeWindow) -> SymbolReport {
        let (result, written) = match self.ingest(symbol, window).await {
            Ok((outcome, table)) => (Ok(outcome), table),
            Err(e) => {
                warn!(error = %e, "symbol failed");
                (Err(e), None)
            }
        };

        let summary = match (self.summarizer, written) {
            (Some(summarizer), Some(table)) => {
                let outcome = summarizer
                    .summarize(symbol, table.tail(self.config.summary.bars))
                    .await;
                match &outcome {
                    SummaryOutcome::Summary(text) => info!(summary = %text, "analysis"),
                    SummaryOutcome::Failed(reason) => warn!(%reason, "analysis failed"),
                }
                Some(outcome)
            }
            _ => None,
        };

        SymbolReport {
            symbol: symbol.to_string(),
            result,
            summary,
        }
    }

    /// Fetch, trim, resample and write one symbol. On success with files
    /// written, also hands back the windowed base table for summarization.
    async fn ingest(
        &self,
        symbol: &str,
        window: &TimeWindow,
    ) -> Result<(SymbolOutcome, Option<BarTable>), IngestError> {
        let params = BarsRequestParams {
            symbol: symbol.to_string(),
            timeframe: Timeframe::ONE_MINUTE,
            start: window.start,
            end: window.end,
        };
        let records = self.provider.fetch_bars(params).await?;
        if records.is_empty() {
            warn!("no data returned; skipping");
            return Ok((SymbolOutcome::Skipped(SkipReason::NoData), None));
        }

        let table = normalize(records, self.config.timezone);
        let windowed = select_window(&table, window);
        if windowed.is_empty() {
            warn!(fetched = table.len(), "no rows remain after window trim; skipping");
            return Ok((SymbolOutcome::Skipped(SkipReason::EmptyWindow), None));
        }

        let rows = windowed.len();
        let series = self.build_series(symbol, windowed)?;
        let files = self.sink.write(&series).await?;
        info!(rows, files = files.len(), "symbol written");

        let base = series.into_iter().next().map(|s| s.table);
        Ok((SymbolOutcome::Written { files, rows }, base))
    }

    /// The base table followed by one resampled series per configured timeframe.
    pub fn build_series(&self, symbol: &str, base: BarTable) -> Result<Vec<BarSeries>, TzError> {
        let derived = resample_all(symbol, &base, &self.config.timeframes)?;
        let mut series = Vec::with_capacity(derived.len() + 1);
        series.push(BarSeries::new(symbol, &self.config.base_label, base));
        series.extend(derived);
        Ok(series)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CryptoOutcome {
    Written { path: PathBuf, quotes: usize },
    /// Nothing configured, or the provider knew none of the assets.
    Skipped,
}

/// Fetch the spot prices of `assets` as one batch and write `CRYPTO_PRICES.csv`.
///
/// A failed request fails the whole batch.
#[instrument(skip_all, fields(assets = assets.len()))]
pub async fn run_crypto(
    provider: &(dyn SpotPriceProvider + Send + Sync),
    sink: &CsvSink,
    assets: &[CryptoAsset],
) -> Result<CryptoOutcome, IngestError> {
    if assets.is_empty() {
        info!("no crypto assets configured; skipping");
        return Ok(CryptoOutcome::Skipped);
    }

    let quotes = provider.fetch_quotes(assets).await?;
    if quotes.is_empty() {
        warn!("no spot quotes returned; skipping");
        return Ok(CryptoOutcome::Skipped);
    }

    let count = quotes.len();
    let path = sink.write_spot_quotes_async(quotes).await?;
    Ok(CryptoOutcome::Written {
        path,
        quotes: count,
    })
}
