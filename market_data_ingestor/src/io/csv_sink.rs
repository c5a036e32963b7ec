//! CSV files on the local filesystem, one per `(symbol, timeframe)`.
//!
//! Layout: `{dir}/{SYMBOL}_{label}.csv`, header
//! `Datetime,Open,High,Low,Close,Volume`, no index column. Spot quotes go to
//! `{dir}/CRYPTO_PRICES.csv`.
//!
//! Every file is written to a temporary file in the destination directory and
//! renamed over the target once complete, so readers see either the previous
//! file or the new one, never a partial write.

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use snafu::ResultExt;
use tempfile::NamedTempFile;
use tracing::{Span, info};

use crate::{
    io::sink::{DataSink, EncodeSnafu, IoSnafu, JoinSnafu, PersistSnafu, SinkError},
    models::{bar_series::BarSeries, bar_table::BarTable, spot::SpotQuote},
};

pub const BAR_HEADER: [&str; 6] = ["Datetime", "Open", "High", "Low", "Close", "Volume"];
pub const SPOT_HEADER: [&str; 3] = ["Symbol", "PriceUSD", "Change24hPct"];
pub const SPOT_FILE_NAME: &str = "CRYPTO_PRICES.csv";

/// `2024-10-17 09:31:00-04:00`
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, symbol: &str, label: &str) -> PathBuf {
        self.dir.join(format!("{symbol}_{label}.csv"))
    }

    /// Write one table, replacing any existing file for `(symbol, label)`.
    pub fn write_table(
        &self,
        symbol: &str,
        label: &str,
        table: &BarTable,
    ) -> Result<PathBuf, SinkError> {
        let path = self.path_for(symbol, label);
        write_atomic(&path, |w| {
            w.write_record(BAR_HEADER)?;
            for bar in table {
                w.write_record([
                    bar.timestamp.format(DATETIME_FORMAT).to_string(),
                    format_float(bar.open),
                    format_float(bar.high),
                    format_float(bar.low),
                    format_float(bar.close),
                    format_float(bar.volume),
                ])?;
            }
            Ok(())
        })?;
        info!(symbol, label, rows = table.len(), path = %path.display(), "wrote bars");
        Ok(path)
    }

    /// Write the spot-price summary file.
    pub fn write_spot_quotes(&self, quotes: &[SpotQuote]) -> Result<PathBuf, SinkError> {
        let path = self.dir.join(SPOT_FILE_NAME);
        write_atomic(&path, |w| {
            w.write_record(SPOT_HEADER)?;
            for q in quotes {
                w.write_record([
                    q.symbol.clone(),
                    format_float(q.price_usd),
                    q.change_24h_pct.map(format_float).unwrap_or_default(),
                ])?;
            }
            Ok(())
        })?;
        info!(rows = quotes.len(), path = %path.display(), "wrote spot quotes");
        Ok(path)
    }

    /// [`CsvSink::write_spot_quotes`] on tokio's blocking pool.
    pub async fn write_spot_quotes_async(
        &self,
        quotes: Vec<SpotQuote>,
    ) -> Result<PathBuf, SinkError> {
        let sink = self.clone();
        let span = Span::current();
        tokio::task::spawn_blocking(move || span.in_scope(|| sink.write_spot_quotes(&quotes)))
            .await
            .context(JoinSnafu)?
    }
}

#[async_trait]
impl DataSink for CsvSink {
    type Output = Vec<PathBuf>;

    /// File I/O (including `fsync`) runs on tokio's blocking pool.
    async fn write(&self, data: &[BarSeries]) -> Result<Self::Output, SinkError> {
        let sink = self.clone();
        let data = data.to_vec();
        let span = Span::current();
        tokio::task::spawn_blocking(move || {
            span.in_scope(|| {
                data.iter()
                    .map(|s| sink.write_table(&s.symbol, &s.label, &s.table))
                    .collect::<Result<Vec<_>, _>>()
            })
        })
        .await
        .context(JoinSnafu)?
    }
}


/// Shortest round-trip representation, with `.0` on integral values so that
/// prices and volumes always read back as floats.
pub fn format_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

fn write_atomic<F>(path: &Path, fill: F) -> Result<(), SinkError>
where
    F: FnOnce(&mut csv::Writer<&mut File>) -> Result<(), csv::Error>,
{
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).context(IoSnafu { path: dir })?;

    let mut tmp = NamedTempFile::new_in(dir).context(IoSnafu { path: dir })?;
    {
        let mut writer = csv::Writer::from_writer(tmp.as_file_mut());
        fill(&mut writer).context(EncodeSnafu { path })?;
        writer.flush().context(IoSnafu { path })?;
    }
    tmp.as_file().sync_all().context(IoSnafu { path })?;
    tmp.persist(path).context(PersistSnafu { path })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_keep_a_decimal_point() {
        assert_eq!(format_float(10.0), "10.0");
        assert_eq!(format_float(1000.0), "1000.0");
        assert_eq!(format_float(10.25), "10.25");
        assert_eq!(format_float(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_float(-3.0), "-3.0");
    }

    #[test]
    fn file_names_are_symbol_qualified() {
        let sink = CsvSink::new("/data/out");
        assert_eq!(
            sink.path_for("SPY", "4h"),
            PathBuf::from("/data/out/SPY_4h.csv")
        );
    }
}
