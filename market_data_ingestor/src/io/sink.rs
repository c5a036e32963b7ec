use std::path::PathBuf;

use async_trait::async_trait;
use snafu::{Backtrace, Snafu};

use crate::models::bar_series::BarSeries;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SinkError {
    /// The destination could not be created or written.
    #[snafu(display("I/O error on {}: {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// A record could not be encoded in the destination format.
    #[snafu(display("Failed to encode {}: {source}", path.display()))]
    Encode {
        path: PathBuf,
        source: csv::Error,
        backtrace: Backtrace,
    },

    /// The blocking write task panicked or was cancelled.
    #[snafu(display("Write task failed: {source}"))]
    Join {
        source: tokio::task::JoinError,
        backtrace: Backtrace,
    },

    /// The fully written temporary file could not replace the target.
    #[snafu(display("Failed to move finished file into {}: {source}", path.display()))]
    Persist {
        path: PathBuf,
        source: tempfile::PersistError,
        backtrace: Backtrace,
    },
}

#[async_trait]
pub trait DataSink {
    /// The type of output returned after a successful write operation.
    ///
    /// This makes the trait flexible. For example:
    /// - A file sink might return `Vec<PathBuf>`, the paths to the created files.
    /// - A database sink might return `usize`, the number of rows inserted.
    type Output;

    /// Writes a slice of `BarSeries` to the destination.
    ///
    /// # Arguments
    /// * `data` - A slice of `BarSeries` to be written.
    async fn write(&self, data: &[BarSeries]) -> Result<Self::Output, SinkError>;
}
